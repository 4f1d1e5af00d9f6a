//! # Redirect Handler

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    api::extractors::{ClientIp, Referer, UserAgent},
    error::{AppError, Result},
    models::ClickContext,
    services::{AppState, Resolution},
};

// =====================================
// Redirect
// =====================================
/// Redirect به URL اصلی
///
/// # مفاهیم:
/// - `302 Found` (نه 301) تا مرورگر redirect رو کش نکنه و هر بازدید شمرده بشه
/// - ثبت کلیک در پس‌زمینه؛ handler منتظرش نمیمونه
///
/// # Endpoint
/// `GET /:code`
///
/// # Responses
/// - `302` با header `Location`
/// - `410` لینک منقضی
/// - `404` کد ناشناخته
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ClientIp(ip): ClientIp,
    UserAgent(user_agent): UserAgent,
    Referer(referer): Referer,
) -> Result<Response> {
    let context = ClickContext {
        ip,
        user_agent,
        referer,
    };

    match state.redirects.resolve(&code, context).await? {
        // JoinHandle رو drop میکنیم؛ task به کارش ادامه میده
        Resolution::Active { original_url, .. } => Ok((
            StatusCode::FOUND,
            [
                (header::LOCATION, original_url),
                (header::CACHE_CONTROL, "no-store".to_string()),
            ],
        )
            .into_response()),
        Resolution::Expired => Err(AppError::Expired(code)),
        Resolution::NotFound => Err(AppError::link_not_found(&code)),
    }
}
