//! # Link Handlers
//!
//! ساخت لینک و خواندن اطلاعات، رویدادها و نمودار روزانه

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    api::extractors::{ValidatedJson, ValidatedQuery},
    error::Result,
    models::{
        ClickEventResponse, CreateLinkRequest, CreatedLinkResponse, DailyClicksResponse,
        DailyQuery, EventsQuery, EventsResponse, LinkResponse,
    },
    services::AppState,
};

// =====================================
// Create Link
// =====================================
/// ساخت لینک کوتاه جدید
///
/// # Endpoint
/// `POST /api/links`
///
/// # Request Body
/// ```json
/// { "url": "https://example.com/long-url", "expiresAt": "2026-12-01T00:00:00Z" }
/// ```
///
/// # Response (`201 Created`)
/// ```json
/// {
///   "code": "aZ3kP9q",
///   "shortUrl": "http://localhost:3000/aZ3kP9q",
///   "originalUrl": "https://example.com/long-url",
///   "expiresAt": "2026-12-01T00:00:00Z"
/// }
/// ```
pub async fn create_link(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateLinkRequest>,
) -> Result<impl IntoResponse> {
    let link = state.links.create(request).await?;
    let short_url = state.config.short_url(&link.code);

    Ok((
        StatusCode::CREATED,
        Json(CreatedLinkResponse::from_link(&link, short_url)),
    ))
}

// =====================================
// Link Info
// =====================================
/// اطلاعات کامل لینک (شامل لینک‌های منقضی)
///
/// # Endpoint
/// `GET /api/links/:code`
pub async fn get_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>> {
    let link = state.links.get(&code).await?;
    let short_url = state.config.short_url(&link.code);

    Ok(Json(LinkResponse::from_link(
        &link,
        short_url,
        state.links.now(),
    )))
}

// =====================================
// Click Events
// =====================================
/// رویدادهای کلیک یک لینک
///
/// # Endpoint
/// `GET /api/links/:code/events?limit=100&since=...&until=...`
pub async fn get_link_events(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ValidatedQuery(query): ValidatedQuery<EventsQuery>,
) -> Result<Json<EventsResponse>> {
    let events = state.links.events(&code, &query).await?;

    Ok(Json(EventsResponse {
        code,
        events: events.into_iter().map(ClickEventResponse::from).collect(),
    }))
}

// =====================================
// Daily Clicks
// =====================================
/// نمودار کلیک روزانه یک لینک
///
/// # Endpoint
/// `GET /api/links/:code/daily?days=7`
pub async fn get_link_daily(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ValidatedQuery(query): ValidatedQuery<DailyQuery>,
) -> Result<Json<DailyClicksResponse>> {
    let days = state.analytics.daily_clicks(&code, query.window()).await?;

    Ok(Json(DailyClicksResponse { code, days }))
}
