//! # ماژول مدیریت خطاها (Error Handling)
//!
//! این ماژول طبقه‌بندی خطاهای سرویس رو تعریف میکنه.
//!
//! ## مفاهیم Rust:
//! - **thiserror**: derive macro برای Error trait
//! - **From Trait**: تبدیل خودکار خطاهای کتابخانه‌ها با `?`
//! - **Result Type Alias**: alias برای ساده‌تر شدن کد
//!
//! ## طبقه‌بندی
//!
//! | خطا                  | وضعیت HTTP |
//! |----------------------|-----------|
//! | `InvalidUrl`         | 400       |
//! | `NotFound`           | 404       |
//! | `Expired`            | 410       |
//! | `ExhaustedRetries`   | 503       |
//! | `StorageUnavailable` | 503       |
//!
//! هیچ خطایی برای کل پروسه کشنده نیست؛ همه در سطح یک request هستن.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

// =====================================
// Result Type Alias
// =====================================
/// نوع Result سفارشی برنامه
///
/// به جای `Result<Link, AppError>` مینویسیم `Result<Link>`
pub type Result<T, E = AppError> = std::result::Result<T, E>;

// =====================================
// Custom Error Enum
// =====================================
/// خطای اصلی برنامه
#[derive(Debug, Error)]
pub enum AppError {
    // ----------------------------------------
    // خطاهای کاربر (4xx)
    // ----------------------------------------
    /// آدرس مقصد نامعتبر یا خالی - 400
    #[error("{0}")]
    InvalidUrl(String),

    /// درخواست نامعتبر - 400
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// خطای اعتبارسنجی - 400
    #[error("Validation error: {0}")]
    Validation(String),

    /// کد ناشناخته - 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// کد شناخته‌شده ولی منقضی - 410
    #[error("Link '{0}' has expired")]
    Expired(String),

    // ----------------------------------------
    // خطاهای سرور (5xx)
    // ----------------------------------------
    /// بعد از چند تلاش کد یکتا پیدا نشد - 503
    #[error("Could not allocate a unique code after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    /// خطای گذرای لایه ذخیره‌سازی - 503
    /// `#[from]` یعنی sqlx::Error خودکار به این تبدیل میشه
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// خطای migration دیتابیس
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// خطای سرور HTTP
    #[error("Server error: {0}")]
    Server(String),

    /// خطای تنظیمات
    #[error("Configuration error: {0}")]
    Config(String),

    // ----------------------------------------
    // خطاهای تبدیل شده از کتابخانه‌ها
    // ----------------------------------------
    /// خطای خوندن تنظیمات
    #[error("Settings error: {0}")]
    Settings(#[from] ::config::ConfigError),

    /// خطای IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// خطای URL
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl AppError {
    /// گرفتن HTTP status code متناسب با خطا
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::InvalidUrl(_) | Self::BadRequest(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Expired(_) => StatusCode::GONE,

            // 5xx Server Errors
            Self::ExhaustedRetries { .. } | Self::StorageUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Server(_)
            | Self::Config(_)
            | Self::Migration(_)
            | Self::Settings(_)
            | Self::Io(_)
            | Self::UrlParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// کد ماشینی خطا برای کلاینت
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Expired(_) => "EXPIRED",
            Self::ExhaustedRetries { .. } => "EXHAUSTED_RETRIES",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            _ => "INTERNAL_ERROR",
        }
    }

    /// آیا این یه خطای سرور هست؟
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// ساخت خطای Not Found برای لینک
    #[must_use]
    pub fn link_not_found(code: &str) -> Self {
        Self::NotFound(format!("Link with code '{}' not found", code))
    }

    /// پیامی که به کلاینت نشون داده میشه
    ///
    /// جزئیات خطاهای داخلی (مثلا متن خطای sqlx) به بیرون نشت نمیکنه
    fn public_message(&self) -> String {
        match self {
            Self::StorageUnavailable(_) | Self::Migration(_) => {
                "Storage is temporarily unavailable".to_string()
            }
            Self::Server(_)
            | Self::Config(_)
            | Self::Settings(_)
            | Self::Io(_)
            | Self::UrlParse(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

// =====================================
// Error Response DTO
// =====================================
/// ساختار پاسخ خطا در API
///
/// فرانت‌اند مقدار `error` رو مستقیم به کاربر نشون میده
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// پیام قابل نمایش
    pub error: String,

    /// کد خطا (مثلا "INVALID_URL")
    pub code: String,

    /// کد وضعیت HTTP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ErrorResponse {
    /// ساخت پاسخ خطای جدید
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            status_code: None,
        }
    }

    /// اضافه کردن کد وضعیت
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_code = Some(status.as_u16());
        self
    }
}

// =====================================
// IntoResponse Implementation
// =====================================
/// تبدیل AppError به Response HTTP
///
/// این باعث میشه handler‌ها بتونن مستقیم `Result<T, AppError>` برگردونن
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // لاگ کردن خطاهای سرور
        if self.is_server_error() {
            error!(error = %self, code = self.code(), "Server error occurred");
        }

        let status = self.status_code();
        let body = ErrorResponse::new(self.public_message(), self.code()).with_status(status);

        (status, Json(body)).into_response()
    }
}

// =====================================
// From Implementations
// =====================================
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

// =====================================
// Option Extensions
// =====================================
/// Extension trait برای Option
pub trait OptionExt<T> {
    /// تبدیل None به AppError::NotFound
    fn ok_or_not_found(self, message: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, message: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.into()))
    }
}
