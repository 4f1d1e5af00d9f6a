//! # تولید کد کوتاه
//!
//! کدها از الفبای ۶۲ حرفی `[0-9A-Za-z]` با طول ثابت ساخته میشن.
//! یکتا بودن رو دیتابیس تضمین میکنه (unique constraint)؛ این ماژول فقط
//! کد نامزد میسازه و در صورت برخورد دوباره تلاش میکنه.
//!
//! ## مفاهیم Rust:
//! - **Generic Closures**: `FnMut(String) -> Fut` برای تزریق عملیات درج
//! - **Future trait bound**: closure میتونه هر async block برگردونه

use std::future::Future;

use rand::Rng;
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::{AppError, Result},
    utils::{CODE_ALPHABET, DEFAULT_CODE_LENGTH},
};

/// تعداد پیش‌فرض تلاش برای گرفتن کد یکتا
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

// =====================================
// Code Generator
// =====================================
/// سازنده کدهای کوتاه
///
/// # مثال
/// ```rust
/// use snip_links::services::CodeGenerator;
///
/// let generator = CodeGenerator::new(7, 5);
/// let code = generator.generate();
/// assert_eq!(code.len(), 7);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
    max_attempts: u32,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS)
    }
}

impl CodeGenerator {
    /// ساخت generator با طول و تعداد تلاش مشخص
    ///
    /// حداقل یک تلاش همیشه انجام میشه
    #[must_use]
    pub fn new(length: usize, max_attempts: u32) -> Self {
        Self {
            length,
            max_attempts: max_attempts.max(1),
        }
    }

    /// ساخت از روی تنظیمات
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.code_length, config.code_max_attempts)
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// تولید یک کد نامزد (بدون بررسی یکتا بودن)
    #[must_use]
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }

    /// تولید کد و ثبت آن با `claim`
    ///
    /// `claim` کد نامزد رو میگیره و:
    /// - `Ok(Some(v))`: کد ثبت شد؛ `v` برگردونده میشه
    /// - `Ok(None)`: کد قبلا گرفته شده؛ کد جدید امتحان میشه
    /// - `Err(e)`: خطا بلافاصله برگردونده میشه
    ///
    /// # Errors
    /// `AppError::ExhaustedRetries` اگه همه تلاش‌ها به برخورد بخورن
    pub async fn generate_with<T, F, Fut>(&self, mut claim: F) -> Result<T>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        for attempt in 1..=self.max_attempts {
            let code = self.generate();

            match claim(code.clone()).await? {
                Some(value) => {
                    debug!(code = %code, attempt, "Claimed short code");
                    return Ok(value);
                }
                None => warn!(code = %code, attempt, "Short code collision, retrying"),
            }
        }

        Err(AppError::ExhaustedRetries {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use crate::utils::is_valid_code;

    #[test]
    fn test_default_generator() {
        let generator = CodeGenerator::default();
        assert_eq!(generator.length(), 7);
        assert_eq!(generator.max_attempts(), 5);
        assert_eq!(CodeGenerator::new(7, 0).max_attempts(), 1);
    }

    #[test]
    fn test_codes_rarely_repeat() {
        let generator = CodeGenerator::default();
        let codes: HashSet<String> = (0..10_000).map(|_| generator.generate()).collect();
        // 62^7 حالت؛ برخورد در ده هزار نمونه عملا غیرممکنه
        assert!(codes.len() > 9_990);
    }

    #[tokio::test]
    async fn test_first_free_code_wins() {
        let generator = CodeGenerator::default();
        let code = generator
            .generate_with(|code| async move { Ok(Some(code)) })
            .await
            .unwrap();

        assert_eq!(code.len(), 7);
    }

    #[tokio::test]
    async fn test_retries_after_collision() {
        let generator = CodeGenerator::new(7, 5);
        let mut calls = 0;

        let claimed = generator
            .generate_with(|code| {
                calls += 1;
                let taken = calls < 3;
                async move { Ok(if taken { None } else { Some(code) }) }
            })
            .await
            .unwrap();

        assert_eq!(calls, 3);
        assert!(is_valid_code(&claimed));
    }

    #[tokio::test]
    async fn test_always_taken_exhausts_retries() {
        let generator = CodeGenerator::new(7, 4);
        let mut calls = 0;

        let result: Result<String> = generator
            .generate_with(|_| {
                calls += 1;
                async { Ok(None) }
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::ExhaustedRetries { attempts: 4 })
        ));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_claim_error_stops_immediately() {
        let generator = CodeGenerator::default();
        let mut calls = 0;

        let result: Result<String> = generator
            .generate_with(|_| {
                calls += 1;
                async { Err(AppError::StorageUnavailable(sqlx::Error::PoolTimedOut)) }
            })
            .await;

        assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
        assert_eq!(calls, 1);
    }

    proptest! {
        #[test]
        fn generated_codes_use_alphabet(length in 6usize..=12) {
            let code = CodeGenerator::new(length, 1).generate();
            prop_assert_eq!(code.len(), length);
            prop_assert!(is_valid_code(&code));
        }
    }
}
