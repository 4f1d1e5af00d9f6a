//! # ماژول توابع کمکی (Utilities)
//!
//! ثابت‌ها، اعتبارسنجی URL و کد، و هش کردن IP.
//!
//! ## مفاهیم Rust:
//! - **static**: متغیرهای با عمر 'static
//! - **once_cell**: مقداردهی اولیه تنبل
//! - **Regex**: عبارات منظم

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

// =====================================
// Constants
// =====================================
/// کاراکترهای مجاز کد کوتاه (حساس به حروف بزرگ و کوچک)
pub const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// طول پیش‌فرض کد
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// حداکثر طول کدی که مسیر redirect قبول میکنه
pub const MAX_CODE_LENGTH: usize = 32;

/// حداکثر طول URL اصلی
pub const MAX_URL_LENGTH: usize = 2048;

/// مقداری که به جای IP نامعلوم هش میشه
pub const UNKNOWN_IP: &str = "unknown";

// =====================================
// Lazy Statics (Regex patterns)
// =====================================
/// الگوی کد کوتاه
pub static VALID_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z]+$").expect("Invalid regex pattern"));

// =====================================
// Validation Functions
// =====================================
/// آیا این رشته میتونه یک کد باشه؟
///
/// مسیر redirect قبل از رفتن سراغ دیتابیس با این چک میشه
///
/// # مثال
/// ```rust
/// use snip_links::utils::is_valid_code;
///
/// assert!(is_valid_code("aZ3kP9q"));
/// assert!(!is_valid_code("abc-123"));
/// ```
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= MAX_CODE_LENGTH && VALID_CODE.is_match(code)
}

/// اعتبارسنجی URL مقصد (رشته trim شده بدون تغییر برمیگرده)
///
/// فقط آدرس‌های مطلق `http`/`https` با host قبول میشن
///
/// # Errors
/// `AppError::InvalidUrl` با پیام توصیفی
pub fn validate_target_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(AppError::InvalidUrl("url is required".to_string()));
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(AppError::InvalidUrl(format!(
            "url must be at most {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed = url::Url::parse(trimmed)
        .map_err(|e| AppError::InvalidUrl(format!("url is not a valid absolute URL: {}", e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::InvalidUrl(format!(
            "url scheme must be http or https, got '{}'",
            parsed.scheme()
        )));
    }

    match parsed.host_str() {
        // parse فقط برای اعتبارسنجی؛ رشته ارسالی بدون نرمال‌سازی ذخیره میشه
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(AppError::InvalidUrl("url must include a host".to_string())),
    }
}

// =====================================
// Privacy
// =====================================
/// هش کردن IP با salt
///
/// خروجی hex از SHA-256 روی `salt:ip` هست. IP خام هیچوقت ذخیره نمیشه.
///
/// # مثال
/// ```rust
/// use snip_links::utils::hash_ip;
///
/// let hash = hash_ip("salt", Some("203.0.113.7"));
/// assert_eq!(hash.len(), 64);
/// assert_ne!(hash, hash_ip("other-salt", Some("203.0.113.7")));
/// ```
#[must_use]
pub fn hash_ip(salt: &str, ip: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(ip.unwrap_or(UNKNOWN_IP).as_bytes());
    format!("{:x}", hasher.finalize())
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code() {
        assert!(is_valid_code("abc1234"));
        assert!(is_valid_code("ABCxyz0"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("abc 123"));
        assert!(!is_valid_code("abc_123"));
        assert!(!is_valid_code(&"a".repeat(MAX_CODE_LENGTH + 1)));
    }

    #[test]
    fn test_validate_target_url_accepts_http_and_https() {
        assert_eq!(
            validate_target_url("https://example.com/x").unwrap(),
            "https://example.com/x"
        );
        assert_eq!(
            validate_target_url("  http://example.com/path?q=1  ").unwrap(),
            "http://example.com/path?q=1"
        );
    }

    #[test]
    fn test_validate_target_url_keeps_submitted_form() {
        for url in [
            "https://example.com",
            "https://Example.COM/a%7eb",
            "https://example.com:443/x",
        ] {
            assert_eq!(validate_target_url(url).unwrap(), url);
        }
    }

    #[test]
    fn test_validate_target_url_rejects_bad_input() {
        for bad in ["", "   ", "not a url", "ftp://example.com", "/relative/path", "mailto:a@b.c"] {
            assert!(
                matches!(validate_target_url(bad), Err(AppError::InvalidUrl(_))),
                "expected InvalidUrl for {:?}",
                bad
            );
        }

        let too_long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(matches!(
            validate_target_url(&too_long),
            Err(AppError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_hash_ip_is_salted_and_stable() {
        let a = hash_ip("salt", Some("203.0.113.7"));
        assert_eq!(a, hash_ip("salt", Some("203.0.113.7")));
        assert_ne!(a, hash_ip("pepper", Some("203.0.113.7")));
        assert!(!a.contains("203.0.113.7"));
        assert_eq!(hash_ip("salt", None), hash_ip("salt", Some(UNKNOWN_IP)));
    }
}
