//! # Snip Links Library
//!
//! سرویس کوتاه‌کننده لینک با redirect و آمار کلیک.
//!
//! ## ساختار پروژه
//!
//! ```text
//! src/
//! ├── lib.rs          # نقطه ورود کتابخانه - اینجا!
//! ├── main.rs         # نقطه ورود باینری
//! ├── clock.rs        # منبع زمان (قابل جایگزینی در تست‌ها)
//! ├── config/         # مدیریت تنظیمات
//! ├── error/          # تعریف خطاها
//! ├── database/       # SQLite و repository‌ها
//! ├── models/         # مدل‌های داده
//! ├── services/       # تولید کد، redirect، آمار
//! ├── api/            # لایه API
//! └── utils/          # توابع کمکی
//! ```
//!
//! ## مثال استفاده
//!
//! ```rust,no_run
//! use snip_links::{api::create_router, config::Config, database::Database, services::AppState};
//!
//! #[tokio::main]
//! async fn main() -> snip_links::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Database::connect(&config.database_url).await?;
//!     db.migrate().await?;
//!     let _app = create_router(AppState::new(db, config));
//!     Ok(())
//! }
//! ```

// =====================================
// Module Declarations
// =====================================

/// ماژول API و HTTP Handlers
pub mod api;

/// منبع زمان جاری
pub mod clock;

/// ماژول مدیریت تنظیمات برنامه
pub mod config;

/// ماژول ارتباط با دیتابیس
pub mod database;

/// ماژول تعریف و مدیریت خطاها
pub mod error;

/// ماژول مدل‌های داده (Domain Models)
pub mod models;

/// ماژول سرویس‌ها (Business Logic)
pub mod services;

/// ماژول توابع کمکی
pub mod utils;

// =====================================
// Re-exports
// =====================================

/// نتیجه عملیات با خطای سفارشی ما
pub use error::Result;

/// خطای اصلی برنامه
pub use error::AppError;

// =====================================
// Prelude Module
// =====================================
/// ماژول prelude برای import راحت‌تر آیتم‌های پرکاربرد
///
/// ```rust
/// use snip_links::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::Config;
    pub use crate::database::{ClickEventLog, Database, LinkStore};
    pub use crate::error::{AppError, Result};
    pub use crate::models::*;
    pub use crate::services::*;
}
