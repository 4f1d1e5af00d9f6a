//! # سرویس لینک
//!
//! ساخت لینک کوتاه، خواندن اطلاعات لینک و رویدادهای کلیک
//!
//! ## مفاهیم Rust:
//! - Business Logic: قوانین برنامه اینجا پیاده‌سازی میشن
//! - Trait Objects: سرویس به `dyn LinkStore` وابسته‌ست، نه به SQLite

use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use crate::{
    clock::Clock,
    database::{ClickEventLog, LinkStore},
    error::{AppError, OptionExt, Result},
    models::{ClickEvent, CreateLinkRequest, EventsQuery, Link, NewLink},
    utils,
};

use super::CodeGenerator;

// =====================================
// Link Service
// =====================================
/// سرویس مدیریت لینک‌ها
///
/// # مسئولیت‌ها:
/// - اعتبارسنجی URL و تاریخ انقضا
/// - گرفتن کد یکتا از `CodeGenerator`
/// - خواندن لینک و رویدادها
#[derive(Clone)]
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    events: Arc<dyn ClickEventLog>,
    generator: CodeGenerator,
    clock: Arc<dyn Clock>,
}

impl LinkService {
    #[must_use]
    pub fn new(
        store: Arc<dyn LinkStore>,
        events: Arc<dyn ClickEventLog>,
        generator: CodeGenerator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            events,
            generator,
            clock,
        }
    }

    /// ساخت لینک کوتاه جدید
    ///
    /// # Errors
    /// - `InvalidUrl`: آدرس مطلق http(s) نیست
    /// - `BadRequest`: `expiresAt` در گذشته‌ست
    /// - `ExhaustedRetries`: کد یکتا پیدا نشد
    /// - `StorageUnavailable`: خطای دیتابیس
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn create(&self, request: CreateLinkRequest) -> Result<Link> {
        // Step 1: اعتبارسنجی قبل از هر دسترسی به دیتابیس
        let original_url = utils::validate_target_url(&request.url)?;
        let now = self.clock.now();

        if let Some(expires_at) = request.expires_at {
            if expires_at <= now {
                return Err(AppError::BadRequest(
                    "expiresAt must be in the future".to_string(),
                ));
            }
        }

        // Step 2: درج شرطی با کد تصادفی؛ برخورد => کد جدید
        let link = self
            .generator
            .generate_with(|code| {
                let store = Arc::clone(&self.store);
                let new_link = NewLink {
                    code,
                    original_url: original_url.clone(),
                    created_at: now,
                    expires_at: request.expires_at,
                };
                async move { store.insert(&new_link).await }
            })
            .await?;

        info!(code = %link.code, "Created short link");
        Ok(link)
    }

    /// گرفتن لینک با کد (حتی اگه منقضی شده باشه)
    #[instrument(skip(self))]
    pub async fn get(&self, code: &str) -> Result<Link> {
        if !utils::is_valid_code(code) {
            return Err(AppError::link_not_found(code));
        }

        self.store
            .find_by_code(code)
            .await?
            .ok_or_not_found(format!("Link with code '{}' not found", code))
    }

    /// رویدادهای کلیک یک لینک
    ///
    /// # Errors
    /// `NotFound` اگه لینک وجود نداشته باشه (لیست خالی فقط برای لینک بدون کلیک)
    #[instrument(skip(self, query))]
    pub async fn events(&self, code: &str, query: &EventsQuery) -> Result<Vec<ClickEvent>> {
        query.validate()?;

        if let (Some(since), Some(until)) = (query.since, query.until) {
            if since > until {
                return Err(AppError::BadRequest(
                    "since must not be after until".to_string(),
                ));
            }
        }

        let link = self.get(code).await?;
        self.events.list_by_code(&link.code, query).await
    }

    /// زمان جاری از دید سرویس
    #[must_use]
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}
