//! # مدل رویداد کلیک
//!
//! هر redirect موفق دقیقا یک `ClickEvent` میسازه. رویدادها فقط append میشن.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils;

/// حداکثر تعداد رویداد در یک صفحه
pub const MAX_EVENTS_PAGE: u32 = 1000;

/// تعداد پیش‌فرض رویداد در یک صفحه
pub const DEFAULT_EVENTS_PAGE: u32 = 100;

// =====================================
// ClickEvent Entity
// =====================================
/// Entity رویداد کلیک
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClickEvent {
    pub id: String,
    pub link_code: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    /// هش salt‌دار IP؛ IP خام ذخیره نمیشه
    pub ip_hash: String,
}

// =====================================
// Request Metadata
// =====================================
/// اطلاعات درخواست redirect که در رویداد ثبت میشه
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

// =====================================
// New Event (داخلی)
// =====================================
/// داده برای append یک رویداد جدید
#[derive(Debug, Clone)]
pub struct NewClickEvent {
    pub id: String,
    pub link_code: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip_hash: String,
}

impl NewClickEvent {
    /// ساخت رویداد از context درخواست
    ///
    /// IP همینجا هش میشه و بعد از این نقطه دیگه وجود نداره
    #[must_use]
    pub fn from_context(
        link_code: &str,
        clicked_at: DateTime<Utc>,
        context: ClickContext,
        salt: &str,
    ) -> Self {
        Self {
            id: nanoid::nanoid!(21),
            link_code: link_code.to_string(),
            clicked_at,
            user_agent: context.user_agent,
            referer: context.referer,
            ip_hash: utils::hash_ip(salt, context.ip.as_deref()),
        }
    }
}

// =====================================
// Query
// =====================================
/// پارامترهای صفحه‌بندی رویدادها بر اساس پنجره زمانی
///
/// `since` شامل و `until` غیرشامل هست
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EventsQuery {
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: Option<u32>,

    pub since: Option<DateTime<Utc>>,

    pub until: Option<DateTime<Utc>>,
}

impl EventsQuery {
    /// limit نهایی با مقدار پیش‌فرض
    #[must_use]
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_EVENTS_PAGE)
            .clamp(1, MAX_EVENTS_PAGE)
    }
}

// =====================================
// API Response DTOs
// =====================================
/// یک رویداد در پاسخ API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEventResponse {
    pub id: String,
    /// کد لینک مالک
    pub link_id: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip_hash: String,
}

impl From<ClickEvent> for ClickEventResponse {
    fn from(event: ClickEvent) -> Self {
        Self {
            id: event.id,
            link_id: event.link_code,
            clicked_at: event.clicked_at,
            user_agent: event.user_agent,
            referer: event.referer,
            ip_hash: event.ip_hash,
        }
    }
}

/// پاسخ `GET /api/links/{code}/events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub code: String,
    pub events: Vec<ClickEventResponse>,
}
