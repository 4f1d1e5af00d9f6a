//! # Snip Links - نقطه ورود برنامه
//!
//! ## مفاهیم Rust در این فایل:
//! - `async fn main()`: تابع اصلی غیرهمزمان با tokio
//! - `?` operator: انتشار خطا به بالا
//! - Graceful shutdown: منتظر موندن برای Ctrl-C / SIGTERM

use std::{net::SocketAddr, time::Duration};

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use snip_links::{
    api::create_router,
    config::Config,
    database::Database,
    error::{AppError, Result},
    services::AppState,
};

/// حداکثر صبر برای ثبت کلیک‌های در جریان هنگام shutdown
const RECORDING_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// نقطه ورود اصلی برنامه
///
/// # Errors
/// خطا برمیگردونه اگه:
/// - تنظیمات لود نشن
/// - دیتابیس متصل نشه
/// - سرور استارت نشه
#[tokio::main]
async fn main() -> Result<()> {
    // لود کردن .env (نبودنش اوکیه)
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config);

    info!(
        environment = config.environment.as_str(),
        "🚀 Starting Snip Links service..."
    );

    // اتصال به دیتابیس و اجرای migration‌ها
    let database = Database::connect(&config.database_url).await?;
    database.migrate().await?;
    info!("✅ Database ready");

    let addr = config.server_addr();
    let state = AppState::new(database.clone(), config);
    let redirects = state.redirects.clone();
    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("🌐 Server listening on http://{}", addr);

    // ConnectInfo برای اینکه ClientIp بدون proxy هم آدرس کلاینت رو داشته باشه
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::Server(e.to_string()))?;

    // کلیک‌هایی که 302 شون رفته باید قبل از بستن pool ثبت بشن
    if tokio::time::timeout(RECORDING_DRAIN_TIMEOUT, redirects.wait_for_recordings())
        .await
        .is_err()
    {
        warn!("Timed out waiting for pending click recordings");
    }

    database.close().await;
    info!("👋 Server stopped");

    Ok(())
}

/// راه‌اندازی سیستم tracing برای لاگینگ
///
/// # مفاهیم:
/// - EnvFilter: فیلتر کردن لاگ‌ها بر اساس `RUST_LOG`
/// - در production خروجی JSON برای جمع‌آوری لاگ، در development فرمت خوانا
fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("snip_links=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.environment.is_production() {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .init();
    }
}

/// منتظر Ctrl-C یا SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
