//! # Middleware
//!
//! Middleware‌های سفارشی برای پردازش request/response
//!
//! ## مفاهیم:
//! - **Middleware**: کد که قبل/بعد از handler اجرا میشه
//! - **Tower**: کتابخانه middleware در اکوسیستم Rust
//! - **`from_fn`**: تبدیل یک async fn به Layer

use axum::{
    extract::Request,
    http::header::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

/// نام header شناسه درخواست
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

// =====================================
// Request ID Middleware
// =====================================
/// اضافه کردن Request ID به هر request
///
/// # مفاهیم:
/// - ID موجود کلاینت حفظ میشه، وگرنه یکی با nanoid ساخته میشه
/// - ID در span لاگ‌ها و header پاسخ قرار میگیره
///
/// # استفاده:
/// ```rust,ignore
/// let app = Router::new()
///     .layer(axum::middleware::from_fn(request_id));
/// ```
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let header_value = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .filter(|v| !v.is_empty() && v.len() <= 64)
        .cloned()
        .or_else(|| HeaderValue::from_str(&nanoid::nanoid!(12)).ok());

    let Some(header_value) = header_value else {
        return next.run(request).await;
    };

    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), header_value.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %header_value.to_str().unwrap_or("-"),
    );

    let mut response = next.run(request).instrument(span).await;
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), header_value);

    response
}
