//! # ساعت (Clock)
//!
//! انقضای لینک‌ها و دسته‌بندی روزانه کلیک‌ها به "الان" وابسته‌ان.
//! سرویس‌ها زمان رو از یک `Clock` میگیرن تا تست‌ها بتونن زمان رو جابجا کنن.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

/// منبع زمان جاری (همیشه UTC)
pub trait Clock: Send + Sync {
    /// زمان جاری
    fn now(&self) -> DateTime<Utc>;
}

/// ساعت واقعی سیستم
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// ساعت دستی برای تست‌ها
///
/// # مثال
/// ```rust
/// use chrono::{Duration, Utc};
/// use snip_links::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(Utc::now());
/// let before = clock.now();
/// clock.advance(Duration::hours(2));
/// assert_eq!(clock.now() - before, Duration::hours(2));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    /// ساخت ساعت با زمان اولیه
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// تنظیم زمان
    pub fn set(&self, at: DateTime<Utc>) {
        let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = at;
    }

    /// جلو بردن زمان
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
