//! # ماژول دیتابیس (Database Layer)
//!
//! اتصال SQLite، migration‌ها و پیاده‌سازی Repository‌ها.
//!
//! ## مفاهیم Rust:
//! - **Arc<T>**: اشتراک pool بین handler‌ها بدون کپی
//! - **RAII**: اتصال و تراکنش با drop شدن آزاد میشن (حتی در مسیر خطا)
//!
//! ## الگوهای طراحی:
//! - Repository Pattern: جداسازی لایه داده از منطق
//! - Connection Pool: مدیریت اتصالات دیتابیس

mod click_repository;
mod repository;

pub use click_repository::*;
pub use repository::*;

use std::{str::FromStr, sync::Arc, time::Duration};

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
};
use tracing::debug;

use crate::error::Result;

// مسیر migration‌ها
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

// =====================================
// Database Connection
// =====================================
/// اتصال به دیتابیس با Connection Pool
///
/// هر clone فقط شمارنده Arc رو زیاد میکنه
#[derive(Debug, Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    /// اتصال به دیتابیس
    ///
    /// # Arguments
    /// * `database_url` - آدرس دیتابیس (مثلا `sqlite://data/links.db`)
    ///
    /// # Errors
    /// خطا برمیگردونه اگه پوشه قابل ساخت نباشه یا اتصال موفق نباشه
    pub async fn connect(database_url: impl AsRef<str>) -> Result<Self> {
        let url = database_url.as_ref();

        // ساخت پوشه فایل دیتابیس اگه وجود نداره
        if let Some(path) = url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        // WAL اجازه میده خواندن‌ها با نوشتن‌ها همزمان باشن؛
        // busy_timeout نوشتن‌های همزمان رو به جای خطا صف میکنه
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(options)
            .await?;

        debug!(url = %url, "SQLite pool ready");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// ساخت دیتابیس in-memory (برای تست‌ها)
    ///
    /// فقط یک اتصال داره چون هر اتصال `:memory:` دیتابیس جدای خودش رو میسازه.
    /// اتصال هیچوقت بسته نمیشه تا داده‌ها از بین نرن.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
        };

        db.migrate().await?;
        Ok(db)
    }

    /// اجرای migration‌ها
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&*self.pool).await?;
        Ok(())
    }

    /// دسترسی به pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// بررسی سلامت دیتابیس
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&*self.pool).await?;
        Ok(())
    }

    /// شروع یک تراکنش
    ///
    /// اگه `commit` صدا زده نشه، با drop شدن rollback میشه
    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, sqlx::Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// بستن pool (در shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// =====================================
// Test Support
// =====================================
/// دیتابیس فایلی موقت با همون تنظیمات production (WAL و pool چند اتصالی)
///
/// فایل‌ها با drop شدن پاک میشن
#[cfg(test)]
pub(crate) struct TempDatabase {
    pub(crate) db: Database,
    path: std::path::PathBuf,
}

#[cfg(test)]
impl TempDatabase {
    pub(crate) async fn new() -> Self {
        let path = std::env::temp_dir().join(format!("snip-links-{}.db", nanoid::nanoid!(12)));
        let db = Database::connect(format!("sqlite://{}", path.display()))
            .await
            .unwrap();
        db.migrate().await.unwrap();

        Self { db, path }
    }

    pub(crate) fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }
}

#[cfg(test)]
impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
