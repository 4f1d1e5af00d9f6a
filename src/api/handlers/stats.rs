//! # Stats Handler
//!
//! آمار داشبورد

use axum::{extract::State, Json};

use crate::{error::Result, models::StatsResponse, services::AppState};

// =====================================
// Get Stats
// =====================================
/// گرفتن آمار کلی داشبورد
///
/// # Endpoint
/// `GET /api/stats`
///
/// # Response
/// ```json
/// {
///   "totalUrls": 12,
///   "totalClicks": 340,
///   "topUrls": [{ "id": "aZ3kP9q", "short": "snp.it/aZ3kP9q", "shortUrl": "https://snp.it/aZ3kP9q", "original": "...", "clicks": 120 }],
///   "clicksPerDay": [{ "date": "2026-10-16", "day": "Fri", "clicks": 18 }]
/// }
/// ```
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.analytics.dashboard().await?;

    Ok(Json(stats))
}
