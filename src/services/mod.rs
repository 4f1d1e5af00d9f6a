//! # ماژول سرویس‌ها (Business Logic Layer)
//!
//! این ماژول منطق کسب‌وکار برنامه رو پیاده‌سازی میکنه.
//!
//! ## لایه‌بندی معماری
//!
//! ```text
//! ┌─────────────────┐
//! │    API Layer    │  <-- HTTP handlers (axum)
//! ├─────────────────┤
//! │  Service Layer  │  <-- Business logic (اینجا!)
//! ├─────────────────┤
//! │ Repository Layer│  <-- LinkStore / ClickEventLog
//! ├─────────────────┤
//! │    Database     │  <-- SQLite
//! └─────────────────┘
//! ```
//!
//! ## مفاهیم Rust:
//! - **Dependency Injection**: repository‌ها و ساعت از بیرون تزریق میشن
//! - **Arc<T>**: اشتراک امن بین threads

mod analytics;
mod code_generator;
mod link_service;
mod redirect;

pub use analytics::*;
pub use code_generator::*;
pub use link_service::*;
pub use redirect::*;

use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    config::Config,
    database::{ClickEventLog, ClickRepository, Database, LinkRepository, LinkStore},
};

// =====================================
// Application State
// =====================================
/// وضعیت برنامه که بین همه handlers اشتراک‌گذاری میشه
///
/// # مفاهیم:
/// - `Clone`: فقط Arc‌ها clone میشن، نه داده
/// - این state با `Router::with_state` به handlers میرسه
#[derive(Clone)]
pub struct AppState {
    /// تنظیمات برنامه
    pub config: Arc<Config>,

    /// برای health check
    pub database: Database,

    /// ساخت و خواندن لینک‌ها
    pub links: LinkService,

    /// resolve کردن کدها
    pub redirects: RedirectResolver,

    /// آمار
    pub analytics: AnalyticsService,
}

impl AppState {
    /// ساخت AppState با ساعت سیستم
    #[must_use]
    pub fn new(db: Database, config: Config) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    /// ساخت AppState با ساعت دلخواه (برای تست‌ها)
    ///
    /// # مفاهیم:
    /// - Factory method: ساخت object پیچیده
    /// - همه سرویس‌ها یک ساعت و یک جفت repository مشترک دارن
    #[must_use]
    pub fn with_clock(db: Database, config: Config, clock: Arc<dyn Clock>) -> Self {
        let config = Arc::new(config);

        // ساخت repositories
        let store: Arc<dyn LinkStore> = Arc::new(LinkRepository::new(db.clone()));
        let events: Arc<dyn ClickEventLog> = Arc::new(ClickRepository::new(db.clone()));

        // ساخت services
        let links = LinkService::new(
            Arc::clone(&store),
            Arc::clone(&events),
            CodeGenerator::from_config(&config),
            Arc::clone(&clock),
        );

        let redirects = RedirectResolver::new(
            Arc::clone(&store),
            Arc::clone(&events),
            Arc::clone(&clock),
            config.ip_hash_salt.as_str(),
        );

        let analytics = AnalyticsService::new(store, events, links.clone(), clock, Arc::clone(&config));

        Self {
            config,
            database: db,
            links,
            redirects,
            analytics,
        }
    }
}
