//! # Analytics Aggregator
//!
//! شمارش روزانه کلیک‌ها، لینک‌های برتر و آمار کلی داشبورد
//!
//! ## مفاهیم Rust:
//! - **tokio::sync::RwLock**: کش snapshot داشبورد با چند خواننده همزمان
//! - **Cancellation**: اگه future وسط محاسبه drop بشه، چیزی در کش نوشته نمیشه
//!
//! همه دسته‌بندی‌ها بر اساس تاریخ تقویمی UTC هستن.

use std::{collections::HashMap, sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use tokio::{sync::RwLock, time::Instant};
use tracing::{debug, instrument};

use crate::{
    clock::Clock,
    config::Config,
    database::{ClickEventLog, LinkStore},
    error::{AppError, Result},
    models::{
        DailyClicks, DayCount, GlobalTotals, StatsResponse, TopLink, TopLinkResponse,
        MAX_DAILY_WINDOW,
    },
};

use super::LinkService;

/// snapshot کش‌شده داشبورد
#[derive(Debug, Clone)]
struct CachedStats {
    computed_at: Instant,
    stats: StatsResponse,
}

// =====================================
// Analytics Service
// =====================================
/// سرویس آمار
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn LinkStore>,
    events: Arc<dyn ClickEventLog>,
    links: LinkService,
    clock: Arc<dyn Clock>,
    config: Arc<Config>,
    cache: Arc<RwLock<Option<CachedStats>>>,
}

impl AnalyticsService {
    #[must_use]
    pub fn new(
        store: Arc<dyn LinkStore>,
        events: Arc<dyn ClickEventLog>,
        links: LinkService,
        clock: Arc<dyn Clock>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            events,
            links,
            clock,
            config,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// کلیک‌های روزانه یک لینک در `window_days` روز اخیر (شامل امروز)
    ///
    /// # Errors
    /// - `NotFound`: لینک وجود نداره
    /// - `BadRequest`: پنجره خارج از بازه ۱ تا ۹۰
    #[instrument(skip(self))]
    pub async fn daily_clicks(&self, code: &str, window_days: u32) -> Result<Vec<DailyClicks>> {
        check_window(window_days)?;
        let link = self.links.get(code).await?;
        self.series(Some(&link.code), window_days).await
    }

    /// کلیک‌های روزانه همه لینک‌ها
    #[instrument(skip(self))]
    pub async fn global_daily_clicks(&self, window_days: u32) -> Result<Vec<DailyClicks>> {
        check_window(window_days)?;
        self.series(None, window_days).await
    }

    /// لینک‌های پرکلیک
    pub async fn top_links(&self, limit: u32) -> Result<Vec<TopLink>> {
        self.store.top_links(limit).await
    }

    /// تعداد کل لینک‌ها و کلیک‌ها
    pub async fn global_totals(&self) -> Result<GlobalTotals> {
        self.store.totals().await
    }

    /// payload داشبورد (`GET /api/stats`)
    ///
    /// تا `stats_cache_ttl_secs` ثانیه از کش جواب میده.
    /// کش فقط بعد از محاسبه کامل نوشته میشه.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<StatsResponse> {
        let ttl = StdDuration::from_secs(self.config.stats_cache_ttl_secs);

        if !ttl.is_zero() {
            if let Some(cached) = self.cache.read().await.as_ref() {
                if cached.computed_at.elapsed() < ttl {
                    debug!("Serving dashboard stats from cache");
                    return Ok(cached.stats.clone());
                }
            }
        }

        let totals = self.global_totals().await?;
        let top = self.top_links(self.config.top_links_limit).await?;
        let clicks_per_day = self
            .global_daily_clicks(self.config.stats_window_days)
            .await?;

        let stats = StatsResponse {
            total_urls: totals.total_links,
            total_clicks: totals.total_clicks,
            top_urls: top
                .into_iter()
                .map(|link| TopLinkResponse {
                    short: self.config.short_display(&link.code),
                    short_url: self.config.short_url(&link.code),
                    id: link.code,
                    original: link.original_url,
                    clicks: link.click_count,
                })
                .collect(),
            clicks_per_day,
        };

        if !ttl.is_zero() {
            *self.cache.write().await = Some(CachedStats {
                computed_at: Instant::now(),
                stats: stats.clone(),
            });
        }

        Ok(stats)
    }

    /// سری روزانه پر شده با صفر
    async fn series(&self, code: Option<&str>, window_days: u32) -> Result<Vec<DailyClicks>> {
        let today = self.clock.now().date_naive();
        let (from, to) = window_bounds(today, window_days);

        let counts = self.events.daily_counts(code, from, to).await?;
        Ok(fill_daily_buckets(today, window_days, &counts))
    }
}

fn check_window(window_days: u32) -> Result<()> {
    if (1..=MAX_DAILY_WINDOW).contains(&window_days) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "days must be between 1 and {}",
            MAX_DAILY_WINDOW
        )))
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// بازه `[from, to)` برای `window_days` روز که به `today` ختم میشه
#[must_use]
pub fn window_bounds(today: NaiveDate, window_days: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = today - Duration::days(i64::from(window_days.max(1)) - 1);
    (start_of_day(first), start_of_day(today + Duration::days(1)))
}

/// تبدیل شمارش‌های خام به دقیقا `window_days` ردیف صعودی
///
/// روزهایی که در `counts` نیستن با صفر پر میشن.
///
/// # مثال
/// ```rust
/// use chrono::NaiveDate;
/// use snip_links::services::fill_daily_buckets;
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
/// let days = fill_daily_buckets(today, 7, &[]);
/// assert_eq!(days.len(), 7);
/// assert!(days.iter().all(|d| d.clicks == 0));
/// ```
#[must_use]
pub fn fill_daily_buckets(
    today: NaiveDate,
    window_days: u32,
    counts: &[DayCount],
) -> Vec<DailyClicks> {
    let by_day: HashMap<&str, i64> = counts
        .iter()
        .map(|count| (count.day.as_str(), count.clicks))
        .collect();

    (0..i64::from(window_days))
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let key = date.format("%Y-%m-%d").to_string();
            DailyClicks::new(date, by_day.get(key.as_str()).copied().unwrap_or(0))
        })
        .collect()
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        config::ConfigBuilder,
        database::{ClickRepository, Database, LinkRepository},
        models::{ClickContext, CreateLinkRequest, NewClickEvent},
        services::CodeGenerator,
    };
    use pretty_assertions::assert_eq;

    struct Fixture {
        events: Arc<ClickRepository>,
        links: LinkService,
        clock: ManualClock,
        analytics: AnalyticsService,
    }

    async fn fixture(cache_ttl: u64) -> Fixture {
        let db = Database::in_memory().await.unwrap();
        let store = Arc::new(LinkRepository::new(db.clone()));
        let events = Arc::new(ClickRepository::new(db));
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap());
        let config = Arc::new(
            ConfigBuilder::new()
                .base_url("https://sn.ip")
                .stats_cache_ttl_secs(cache_ttl)
                .build(),
        );

        let links = LinkService::new(
            store.clone(),
            events.clone(),
            CodeGenerator::default(),
            Arc::new(clock.clone()),
        );
        let analytics = AnalyticsService::new(
            store,
            events.clone(),
            links.clone(),
            Arc::new(clock.clone()),
            config,
        );

        Fixture {
            events,
            links,
            clock,
            analytics,
        }
    }

    async fn click(fixture: &Fixture, code: &str, at: DateTime<Utc>) {
        let event = NewClickEvent::from_context(code, at, ClickContext::default(), "salt");
        fixture.events.append(&event).await.unwrap();
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fill_daily_buckets_zero_fills_and_orders() {
        let today = date(2026, 10, 16);
        let counts = vec![
            DayCount {
                day: "2026-10-16".to_string(),
                clicks: 4,
            },
            DayCount {
                day: "2026-10-12".to_string(),
                clicks: 2,
            },
            // بیرون از پنجره
            DayCount {
                day: "2026-09-01".to_string(),
                clicks: 99,
            },
        ];

        let days = fill_daily_buckets(today, 7, &counts);
        let clicks: Vec<i64> = days.iter().map(|d| d.clicks).collect();

        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, date(2026, 10, 10));
        assert_eq!(days[6].date, today);
        assert_eq!(clicks, vec![0, 0, 2, 0, 0, 0, 4]);
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_window_bounds_cover_whole_days() {
        let (from, to) = window_bounds(date(2026, 10, 16), 7);
        assert_eq!(from, Utc.with_ymd_and_hms(2026, 10, 10, 0, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_daily_clicks_for_link() {
        let fixture = fixture(0).await;
        let link = fixture
            .links
            .create(CreateLinkRequest::new("https://example.com/"))
            .await
            .unwrap();
        let now = fixture.clock.now();

        click(&fixture, &link.code, now).await;
        click(&fixture, &link.code, now - Duration::hours(14)).await;
        click(&fixture, &link.code, now - Duration::days(3)).await;
        click(&fixture, &link.code, now - Duration::days(30)).await;

        let days = fixture.analytics.daily_clicks(&link.code, 7).await.unwrap();
        let clicks: Vec<i64> = days.iter().map(|d| d.clicks).collect();

        assert_eq!(days.len(), 7);
        assert_eq!(days[6].date, date(2026, 10, 16));
        // 15:00 منهای ۱۴ ساعت => همون روز (ساعت ۰۱:۰۰)
        assert_eq!(clicks, vec![0, 0, 0, 1, 0, 0, 2]);
    }

    #[tokio::test]
    async fn test_daily_clicks_errors() {
        let fixture = fixture(0).await;

        assert!(matches!(
            fixture.analytics.daily_clicks("missing", 7).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fixture.analytics.global_daily_clicks(0).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            fixture.analytics.global_daily_clicks(MAX_DAILY_WINDOW + 1).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_top_links_tie_goes_to_earlier_link() {
        let fixture = fixture(0).await;

        let first = fixture
            .links
            .create(CreateLinkRequest::new("https://example.com/first"))
            .await
            .unwrap();
        fixture.clock.advance(Duration::minutes(1));
        let second = fixture
            .links
            .create(CreateLinkRequest::new("https://example.com/second"))
            .await
            .unwrap();

        let now = fixture.clock.now();
        click(&fixture, &second.code, now).await;
        click(&fixture, &first.code, now).await;

        let top = fixture.analytics.top_links(5).await.unwrap();
        let codes: Vec<&str> = top.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec![first.code.as_str(), second.code.as_str()]);
    }

    #[tokio::test]
    async fn test_dashboard_payload() {
        let fixture = fixture(0).await;
        let link = fixture
            .links
            .create(CreateLinkRequest::new("https://example.com/"))
            .await
            .unwrap();
        fixture
            .links
            .create(CreateLinkRequest::new("https://example.org/"))
            .await
            .unwrap();
        click(&fixture, &link.code, fixture.clock.now()).await;

        let stats = fixture.analytics.dashboard().await.unwrap();

        assert_eq!(stats.total_urls, 2);
        assert_eq!(stats.total_clicks, 1);
        assert_eq!(stats.top_urls[0].id, link.code);
        assert_eq!(stats.top_urls[0].clicks, 1);
        assert_eq!(stats.top_urls[0].short, format!("sn.ip/{}", link.code));
        assert_eq!(stats.top_urls[0].short_url, format!("https://sn.ip/{}", link.code));
        assert_eq!(stats.clicks_per_day.len(), 7);
        assert_eq!(stats.clicks_per_day[6].clicks, 1);
    }

    #[tokio::test]
    async fn test_dashboard_cache() {
        let cached = fixture(300).await;
        let first = cached.analytics.dashboard().await.unwrap();
        cached
            .links
            .create(CreateLinkRequest::new("https://example.com/"))
            .await
            .unwrap();
        assert_eq!(cached.analytics.dashboard().await.unwrap(), first);

        let uncached = fixture(0).await;
        uncached.analytics.dashboard().await.unwrap();
        uncached
            .links
            .create(CreateLinkRequest::new("https://example.com/"))
            .await
            .unwrap();
        assert_eq!(uncached.analytics.dashboard().await.unwrap().total_urls, 1);
    }
}
