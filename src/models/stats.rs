//! # مدل‌های آمار
//!
//! خروجی‌های Analytics Aggregator و پاسخ داشبورد

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// پنجره پیش‌فرض نمودار روزانه یک لینک
pub const DEFAULT_DAILY_WINDOW: u32 = 7;

/// بزرگترین پنجره روزانه قابل درخواست
pub const MAX_DAILY_WINDOW: u32 = 90;

// =====================================
// Daily Buckets
// =====================================
/// تعداد کلیک یک روز تقویمی (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyClicks {
    /// تاریخ به فرمت `YYYY-MM-DD`
    pub date: NaiveDate,
    /// برچسب روز هفته (مثلا "Mon") برای محور نمودار
    pub day: String,
    pub clicks: i64,
}

impl DailyClicks {
    #[must_use]
    pub fn new(date: NaiveDate, clicks: i64) -> Self {
        Self {
            date,
            day: date.weekday().to_string(),
            clicks,
        }
    }
}

/// شمارش خام یک روز از دیتابیس (روزهای بدون کلیک اینجا نیستن)
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DayCount {
    pub day: String,
    pub clicks: i64,
}

// =====================================
// Ranking & Totals
// =====================================
/// یک ردیف از رتبه‌بندی لینک‌ها
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TopLink {
    pub code: String,
    pub original_url: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
}

/// آمار کلی
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GlobalTotals {
    pub total_links: i64,
    pub total_clicks: i64,
}

// =====================================
// API DTOs
// =====================================
/// پارامتر `GET /api/links/{code}/daily?days=N`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DailyQuery {
    #[validate(range(min = 1, max = 90, message = "days must be between 1 and 90"))]
    pub days: Option<u32>,
}

impl DailyQuery {
    #[must_use]
    pub fn window(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_DAILY_WINDOW)
    }
}

/// پاسخ نمودار روزانه یک لینک
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyClicksResponse {
    pub code: String,
    pub days: Vec<DailyClicks>,
}

/// یک لینک برتر در داشبورد
///
/// کلیدها همونایی هستن که کارت "Top Performers" داشبورد میخونه
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLinkResponse {
    /// کد لینک (کلید لیست در UI)
    pub id: String,
    /// شکل نمایشی `<host>/<code>`
    pub short: String,
    /// لینک کوتاه کامل و قابل کلیک
    pub short_url: String,
    pub original: String,
    pub clicks: i64,
}

/// پاسخ `GET /api/stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_urls: i64,
    pub total_clicks: i64,
    pub top_urls: Vec<TopLinkResponse>,
    pub clicks_per_day: Vec<DailyClicks>,
}
