//! # Custom Extractors
//!
//! Extractor‌های سفارشی برای استخراج داده از request
//!
//! ## مفاهیم Rust + Axum:
//! - **Extractors**: نوع‌هایی که از request داده استخراج میکنن
//! - **FromRequestParts**: برای header‌ها و query (بدون body)
//! - **FromRequest**: برای body (فقط آخرین پارامتر handler)
//! - **Rejection**: نوع خطا برای extractors
//!
//! ## چطور کار میکنه؟
//! وقتی یه extractor به عنوان پارامتر handler تعریف میشه،
//! axum قبل از اجرای handler، extractor رو اجرا میکنه.

use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ConnectInfo, FromRequest, FromRequestParts, Query, Request,
    },
    http::{header, request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

// =====================================
// JSON with Validation
// =====================================
/// استخراج JSON با اعتبارسنجی خودکار
///
/// # مفاهیم:
/// - Validation در سطح extractor
/// - JSON خراب یا Content-Type اشتباه => 400 با پیام خوانا
///
/// # استفاده:
/// ```rust,ignore
/// async fn handler(ValidatedJson(data): ValidatedJson<CreateLinkRequest>) -> ... {
///     // data حتما valid هست
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // اول JSON رو parse کن
        let Json(data): Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::BadRequest(e.body_text()))?;

        // بعد validate کن
        data.validate()?;

        Ok(ValidatedJson(data))
    }
}

// =====================================
// Query with Validation
// =====================================
/// استخراج query string با اعتبارسنجی
///
/// ```rust,ignore
/// async fn handler(ValidatedQuery(query): ValidatedQuery<EventsQuery>) -> ... {}
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query): Query<T> = Query::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::BadRequest(e.body_text()))?;

        query.validate()?;

        Ok(ValidatedQuery(query))
    }
}

// =====================================
// Client IP Extractor
// =====================================
/// استخراج IP کلاینت
///
/// # ترتیب:
/// 1. اولین آدرس در `X-Forwarded-For` (پشت proxy)
/// 2. `X-Real-IP`
/// 3. آدرس socket (اگه سرور با `ConnectInfo` اجرا شده باشه)
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

impl ClientIp {
    fn from_headers(headers: &HeaderMap) -> Option<String> {
        headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .or_else(|| {
                headers
                    .get("X-Real-IP")
                    .and_then(|v| v.to_str().ok())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
            })
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = Self::from_headers(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        Ok(ClientIp(ip))
    }
}

// =====================================
// User Agent / Referer Extractors
// =====================================
fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// استخراج User-Agent
#[derive(Debug, Clone)]
pub struct UserAgent(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserAgent {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(UserAgent(header_string(&parts.headers, header::USER_AGENT)))
    }
}

/// استخراج Referer
#[derive(Debug, Clone)]
pub struct Referer(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Referer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Referer(header_string(&parts.headers, header::REFERER)))
    }
}
