//! # Repository Pattern
//!
//! Trait‌های ذخیره‌سازی و پیاده‌سازی SQLite برای لینک‌ها.
//!
//! ## مفاهیم Rust:
//! - **Traits**: تعریف interface (`LinkStore`, `ClickEventLog`)
//! - **async_trait**: امکان async در traits
//! - **Trait Objects**: سرویس‌ها با `Arc<dyn LinkStore>` کار میکنن،
//!   پس تست‌ها میتونن پیاده‌سازی جایگزین بدن

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::Database;
use crate::{
    error::Result,
    models::{
        ClickEvent, DayCount, EventsQuery, GlobalTotals, Link, NewClickEvent, NewLink, TopLink,
    },
};

// =====================================
// Store Traits
// =====================================
/// ذخیره‌سازی لینک‌ها
///
/// هر عملیات به تنهایی atomic هست؛ تراکنش بین چند لینک لازم نیست.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// درج شرطی لینک
    ///
    /// اگه کد قبلا گرفته شده باشه `Ok(None)` برمیگردونه و هیچ چیزی رو overwrite نمیکنه
    async fn insert(&self, link: &NewLink) -> Result<Option<Link>>;

    /// پیدا کردن با کد (لینک منقضی هم برگردونده میشه)
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>>;

    /// افزایش atomic شمارنده کلیک؛ `false` یعنی کد وجود نداره
    async fn increment_clicks(&self, code: &str) -> Result<bool>;

    /// لینک‌های پرکلیک؛ تساوی با `created_at` قدیمی‌تر شکسته میشه
    async fn top_links(&self, limit: u32) -> Result<Vec<TopLink>>;

    /// تعداد کل لینک‌ها و کلیک‌ها
    async fn totals(&self) -> Result<GlobalTotals>;
}

/// لاگ رویدادهای کلیک (فقط append)
#[async_trait]
pub trait ClickEventLog: Send + Sync {
    /// ثبت رویداد و افزایش شمارنده لینک در یک تراکنش
    async fn append(&self, event: &NewClickEvent) -> Result<ClickEvent>;

    /// رویدادهای یک لینک به ترتیب صعودی زمان
    async fn list_by_code(&self, code: &str, query: &EventsQuery) -> Result<Vec<ClickEvent>>;

    /// شمارش کلیک‌ها به تفکیک روز UTC در بازه `[from, to)`
    ///
    /// با `code = None` همه لینک‌ها شمرده میشن
    async fn daily_counts(
        &self,
        code: Option<&str>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DayCount>>;
}

// =====================================
// Link Repository (SQLite)
// =====================================
/// پیاده‌سازی SQLite برای `LinkStore`
#[derive(Debug, Clone)]
pub struct LinkRepository {
    db: Database,
}

impl LinkRepository {
    /// ساخت repository جدید
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// افزایش شمارنده روی هر executor (pool یا تراکنش)
///
/// # مفاهیم:
/// - Generic Bounds: هر نوعی که `sqlx::Executor` برای SQLite باشه
pub(crate) async fn increment_clicks_with<'e, E>(executor: E, code: &str) -> Result<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("UPDATE links SET click_count = click_count + 1 WHERE code = ?")
        .bind(code)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl LinkStore for LinkRepository {
    async fn insert(&self, link: &NewLink) -> Result<Option<Link>> {
        let result = sqlx::query(
            r#"
            INSERT INTO links (code, original_url, created_at, expires_at, click_count)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(&link.code)
        .bind(&link.original_url)
        .bind(link.created_at)
        .bind(link.expires_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(Some(Link {
                code: link.code.clone(),
                original_url: link.original_url.clone(),
                created_at: link.created_at,
                expires_at: link.expires_at,
                click_count: 0,
            })),
            // کد تکراری: برنده رقابت کس دیگه‌ای بوده
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!(code = %link.code, "Code already taken");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT code, original_url, created_at, expires_at, click_count
            FROM links
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(link)
    }

    async fn increment_clicks(&self, code: &str) -> Result<bool> {
        increment_clicks_with(self.db.pool(), code).await
    }

    async fn top_links(&self, limit: u32) -> Result<Vec<TopLink>> {
        // rowid ترتیب درج رو نشون میده و برای created_at‌های برابر تعیین‌کننده‌ست
        let links = sqlx::query_as::<_, TopLink>(
            r#"
            SELECT code, original_url, click_count, created_at
            FROM links
            ORDER BY click_count DESC, created_at ASC, rowid ASC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(self.db.pool())
        .await?;

        Ok(links)
    }

    async fn totals(&self) -> Result<GlobalTotals> {
        let totals = sqlx::query_as::<_, GlobalTotals>(
            r#"
            SELECT
                COUNT(*) AS total_links,
                COALESCE(SUM(click_count), 0) AS total_clicks
            FROM links
            "#,
        )
        .fetch_one(self.db.pool())
        .await?;

        Ok(totals)
    }
}
