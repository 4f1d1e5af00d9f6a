//! # لایه API
//!
//! این ماژول HTTP handlers و routing رو مدیریت میکنه.
//!
//! ## مفاهیم Rust + Axum:
//! - **Router**: تعریف مسیرها
//! - **Handler Functions**: پردازش request‌ها
//! - **Extractors**: استخراج داده از request
//! - **State**: اشتراک state بین handlers
//! - **Tower**: زیرساخت middleware
//!
//! ## ساختار URL‌ها:
//! - `POST /api/links` - ساخت لینک کوتاه
//! - `GET /api/links/:code` - اطلاعات لینک
//! - `GET /api/links/:code/events` - رویدادهای کلیک
//! - `GET /api/links/:code/daily` - نمودار روزانه
//! - `GET /api/stats` - آمار داشبورد
//! - `GET /:code` - Redirect به URL اصلی
//! - `GET /health` - Health check

mod extractors;
pub mod handlers;
mod middleware;

pub use extractors::*;
pub use middleware::*;

use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::services::AppState;

/// حداکثر زمان پردازش یک request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =====================================
// Router Builder
// =====================================
/// ساخت Router اصلی برنامه
///
/// # مفاهیم:
/// - `.route()`: اضافه کردن route
/// - `.nest()`: گروه‌بندی route‌ها
/// - `.layer()`: اضافه کردن middleware
/// - `.with_state()`: تزریق state
///
/// route‌های ثابت (`/health`, `/api/...`) بر `/:code` اولویت دارن
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Route اصلی redirect
        .route("/:code", get(handlers::redirect::redirect_handler))
        // API routes
        .nest("/api", api_routes())
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Middleware‌های عمومی
        .layer(
            ServiceBuilder::new()
                // Request ID - قبل از trace تا در span‌ها دیده بشه
                .layer(axum_middleware::from_fn(request_id))
                // Tracing - لاگ کردن request‌ها
                .layer(TraceLayer::new_for_http())
                // Timeout - حداکثر زمان پردازش
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                // Compression - فشرده‌سازی response
                .layer(CompressionLayer::new())
                // CORS - فرانت‌اند روی origin دیگه اجرا میشه
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        // تزریق state به همه handlers
        .with_state(state)
}

/// Route‌های API
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/links", link_routes())
        .route("/stats", get(handlers::stats::get_stats))
}

/// Route‌های لینک
fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::links::create_link))
        .route("/:code", get(handlers::links::get_link))
        .route("/:code/events", get(handlers::links::get_link_events))
        .route("/:code/daily", get(handlers::links::get_link_daily))
}
