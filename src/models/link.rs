//! # مدل لینک
//!
//! Entity و DTO‌های مربوط به لینک کوتاه

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// =====================================
// Link Entity
// =====================================
/// Entity اصلی لینک
///
/// # مفاهیم:
/// - `#[derive(FromRow)]`: تبدیل خودکار از ردیف دیتابیس
/// - `code` و `original_url` بعد از ساخت تغییر نمیکنن؛
///   تنها تغییر مجاز افزایش `click_count` هست
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Link {
    /// کد کوتاه یکتا (مثلا "aZ3kP9q")
    pub code: String,

    /// آدرس اصلی
    pub original_url: String,

    /// تاریخ ایجاد
    pub created_at: DateTime<Utc>,

    /// تاریخ انقضا (اختیاری)
    pub expires_at: Option<DateTime<Utc>>,

    /// تعداد کلیک (برابر تعداد رویدادهای ثبت‌شده)
    pub click_count: i64,
}

/// وضعیت لینک در یک لحظه مشخص
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// فعال؛ redirect انجام میشه
    Active,
    /// منقضی؛ redirect انجام نمیشه
    Expired,
}

impl Link {
    /// آیا لینک در زمان `now` منقضی شده؟
    ///
    /// لحظه `expires_at` خودش جزو بازه منقضی حساب میشه
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |exp| now >= exp)
    }

    /// وضعیت لینک در زمان `now`
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>) -> LinkState {
        if self.is_expired_at(now) {
            LinkState::Expired
        } else {
            LinkState::Active
        }
    }
}

// =====================================
// New Link (داخلی)
// =====================================
/// داده برای درج لینک جدید در Link Store
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

// =====================================
// API Request DTOs
// =====================================
/// درخواست ساخت لینک کوتاه
///
/// ```json
/// { "url": "https://example.com/x", "expiresAt": "2026-12-01T00:00:00Z" }
/// ```
///
/// بررسی شکل URL در سرویس انجام میشه تا خطای `InvalidUrl` برگرده
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    /// آدرس مقصد؛ نبودنش با خطای `InvalidUrl` جواب داده میشه
    #[serde(default)]
    pub url: String,

    /// تاریخ انقضا (اختیاری، باید در آینده باشه)
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateLinkRequest {
    /// ساخت درخواست ساده بدون انقضا
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            expires_at: None,
        }
    }

    /// اضافه کردن تاریخ انقضا
    #[must_use]
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

// =====================================
// API Response DTOs
// =====================================
/// پاسخ ساخت لینک (`201 Created`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLinkResponse {
    pub code: String,
    pub short_url: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreatedLinkResponse {
    /// تبدیل از Link entity
    #[must_use]
    pub fn from_link(link: &Link, short_url: String) -> Self {
        Self {
            code: link.code.clone(),
            short_url,
            original_url: link.original_url.clone(),
            expires_at: link.expires_at,
        }
    }
}

/// پاسخ اطلاعات لینک
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub expired: bool,
}

impl LinkResponse {
    /// تبدیل از Link entity در زمان `now`
    #[must_use]
    pub fn from_link(link: &Link, short_url: String, now: DateTime<Utc>) -> Self {
        Self {
            code: link.code.clone(),
            short_url,
            original_url: link.original_url.clone(),
            created_at: link.created_at,
            expires_at: link.expires_at,
            click_count: link.click_count,
            expired: link.is_expired_at(now),
        }
    }
}
