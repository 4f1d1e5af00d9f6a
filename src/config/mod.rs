//! # ماژول تنظیمات (Configuration)
//!
//! تنظیمات سرویس از سه لایه ساخته میشه:
//! 1. مقادیر پیش‌فرض
//! 2. فایل `.env` (با `dotenvy` در `main.rs`)
//! 3. متغیرهای محیطی با پیشوند `SNIP_` (مثلا `SNIP_PORT=8080`)
//!
//! ## مفاهیم Rust:
//! - **Derive Macros**: `Deserialize` برای ساخت struct از منابع تنظیمات
//! - **Default Trait**: مقادیر پیش‌فرض
//! - **Builder Pattern**: ساخت تدریجی آبجکت (برای تست‌ها)

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::MAX_DAILY_WINDOW,
};

/// پیشوند متغیرهای محیطی
pub const ENV_PREFIX: &str = "SNIP";

/// salt پیش‌فرض؛ در production باید عوض بشه
pub const DEFAULT_IP_HASH_SALT: &str = "change-me-in-production";

/// تنظیمات اصلی برنامه
///
/// # مثال
/// ```rust
/// use snip_links::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.code_length, 7);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// آدرس هاست سرور
    pub host: String,

    /// پورت سرور
    pub port: u16,

    /// آدرس پایه برای لینک‌های کوتاه (`<base_url>/<code>`)
    pub base_url: String,

    /// آدرس اتصال به دیتابیس
    pub database_url: String,

    /// طول کدهای تولیدی
    pub code_length: usize,

    /// حداکثر تلاش برای پیدا کردن کد آزاد
    pub code_max_attempts: u32,

    /// salt برای هش کردن IP کلاینت
    pub ip_hash_salt: String,

    /// مدت اعتبار کش آمار داشبورد (ثانیه). صفر یعنی بدون کش
    pub stats_cache_ttl_secs: u64,

    /// تعداد روزهای نمودار کلیک روزانه در داشبورد
    pub stats_window_days: u32,

    /// تعداد لینک‌های برتر در داشبورد
    pub top_links_limit: u32,

    /// محیط اجرا (development, testing, production)
    pub environment: Environment,
}

/// محیط اجرای برنامه
///
/// # مفاهیم:
/// - `#[serde(from = "String")]`: دسریالایز از طریق `From<String>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Environment {
    /// محیط توسعه
    #[default]
    Development,

    /// محیط تست
    Testing,

    /// محیط تولید
    Production,
}

impl Environment {
    /// آیا در محیط توسعه هستیم؟
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// آیا در محیط تولید هستیم؟
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "testing" | "test" => Environment::Testing,
            _ => Environment::Development,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            database_url: "sqlite://data/links.db".to_string(),
            code_length: 7,
            code_max_attempts: 5,
            ip_hash_salt: DEFAULT_IP_HASH_SALT.to_string(),
            stats_cache_ttl_secs: 30,
            stats_window_days: 7,
            top_links_limit: 5,
            environment: Environment::Development,
        }
    }
}

impl Config {
    /// ساخت تنظیمات از متغیرهای محیطی `SNIP_*`
    ///
    /// # Errors
    /// خطا برمیگردونه اگه مقداری قابل parse نباشه یا اعتبارسنجی fail بشه
    ///
    /// # مثال
    /// ```rust,no_run
    /// use snip_links::config::Config;
    ///
    /// let config = Config::from_env().expect("Failed to load config");
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::load(::config::Environment::with_prefix(ENV_PREFIX))
    }

    /// ساخت تنظیمات از یک منبع متغیر محیطی دلخواه
    ///
    /// مقادیر پیش‌فرض اول ثبت میشن و منبع محیطی روشون override میکنه
    pub fn load(source: ::config::Environment) -> Result<Self> {
        let defaults = Self::default();

        let config: Self = ::config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("base_url", defaults.base_url)?
            .set_default("database_url", defaults.database_url)?
            .set_default("code_length", defaults.code_length as i64)?
            .set_default("code_max_attempts", i64::from(defaults.code_max_attempts))?
            .set_default("ip_hash_salt", defaults.ip_hash_salt)?
            .set_default("stats_cache_ttl_secs", defaults.stats_cache_ttl_secs as i64)?
            .set_default("stats_window_days", i64::from(defaults.stats_window_days))?
            .set_default("top_links_limit", i64::from(defaults.top_links_limit))?
            .set_default("environment", defaults.environment.as_str())?
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// اعتبارسنجی تنظیمات
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(AppError::Config("PORT cannot be 0".to_string()));
        }

        if !(6..=12).contains(&self.code_length) {
            return Err(AppError::Config(format!(
                "CODE_LENGTH must be between 6 and 12, got {}",
                self.code_length
            )));
        }

        if self.code_max_attempts == 0 {
            return Err(AppError::Config(
                "CODE_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        if !(1..=MAX_DAILY_WINDOW).contains(&self.stats_window_days) {
            return Err(AppError::Config(format!(
                "STATS_WINDOW_DAYS must be between 1 and {}, got {}",
                MAX_DAILY_WINDOW, self.stats_window_days
            )));
        }

        if self.top_links_limit == 0 {
            return Err(AppError::Config(
                "TOP_LINKS_LIMIT must be positive".to_string(),
            ));
        }

        // salt پیش‌فرض در production یعنی هش IP‌ها قابل حدس زدنه
        if self.environment.is_production() && self.ip_hash_salt == DEFAULT_IP_HASH_SALT {
            return Err(AppError::Config(
                "IP_HASH_SALT must be changed in production".to_string(),
            ));
        }

        url::Url::parse(&self.base_url)?;

        Ok(())
    }

    /// آدرس کامل سرور
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// ساخت لینک کوتاه کامل برای یک کد
    #[must_use]
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// شکل نمایشی لینک کوتاه (`<host>/<code>`)
    ///
    /// `short_url` اسکیم رو نگه میداره چون باید قابل کلیک باشه؛
    /// داشبورد همون لینک رو بدون اسکیم نشون میده.
    #[must_use]
    pub fn short_display(&self, code: &str) -> String {
        let full = self.short_url(code);
        full.split_once("://")
            .map_or(full.clone(), |(_, rest)| rest.to_string())
    }
}

// =====================================
// Builder Pattern
// =====================================
/// ساخت Config با Builder Pattern (بیشتر برای تست‌ها)
///
/// # مثال
/// ```rust
/// use snip_links::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .port(8080)
///     .base_url("https://snp.it")
///     .build();
/// assert_eq!(config.short_url("abc1234"), "https://snp.it/abc1234");
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// ساخت builder جدید
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// تنظیم پورت
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// تنظیم هاست
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// تنظیم base_url
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// تنظیم database_url
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// تنظیم طول کد
    #[must_use]
    pub fn code_length(mut self, length: usize) -> Self {
        self.config.code_length = length;
        self
    }

    /// تنظیم حداکثر تلاش تولید کد
    #[must_use]
    pub fn code_max_attempts(mut self, attempts: u32) -> Self {
        self.config.code_max_attempts = attempts;
        self
    }

    /// تنظیم salt هش IP
    #[must_use]
    pub fn ip_hash_salt(mut self, salt: impl Into<String>) -> Self {
        self.config.ip_hash_salt = salt.into();
        self
    }

    /// تنظیم مدت کش آمار
    #[must_use]
    pub fn stats_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.config.stats_cache_ttl_secs = secs;
        self
    }

    /// تنظیم پنجره روزانه داشبورد
    #[must_use]
    pub fn stats_window_days(mut self, days: u32) -> Self {
        self.config.stats_window_days = days;
        self
    }

    /// تنظیم تعداد لینک‌های برتر
    #[must_use]
    pub fn top_links_limit(mut self, limit: u32) -> Self {
        self.config.top_links_limit = limit;
        self
    }

    /// تنظیم محیط
    #[must_use]
    pub fn environment(mut self, env: Environment) -> Self {
        self.config.environment = env;
        self
    }

    /// ساخت Config نهایی
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }

    /// ساخت Config با اعتبارسنجی
    ///
    /// # Errors
    /// خطا برمیگردونه اگه اعتبارسنجی fail بشه
    pub fn build_validated(self) -> Result<Config> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
