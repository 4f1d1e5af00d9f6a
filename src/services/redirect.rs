//! # Redirect Resolver
//!
//! تبدیل کد به آدرس مقصد و ثبت کلیک
//!
//! ## مراحل:
//! 1. پیدا کردن لینک
//! 2. بررسی انقضا (لینک منقضی هیچوقت کلیک ثبت نمیکنه)
//! 3. ثبت کلیک در یک task جدا تا redirect معطل دیتابیس نشه
//!
//! task‌های ثبت شمرده میشن تا shutdown قبل از بستن pool منتظرشون بمونه.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, instrument, warn};

use crate::{
    clock::Clock,
    database::{ClickEventLog, LinkStore},
    error::Result,
    models::{ClickContext, LinkState, NewClickEvent},
    utils,
};

// =====================================
// Resolution
// =====================================
/// نتیجه resolve یک کد
#[derive(Debug)]
pub enum Resolution {
    /// لینک فعال؛ باید redirect بشه
    Active {
        original_url: String,
        /// task ثبت کلیک؛ handler منتظرش نمیمونه ولی تست‌ها میتونن await کنن
        recording: JoinHandle<()>,
    },
    /// لینک منقضی شده (410)
    Expired,
    /// کد وجود نداره (404)
    NotFound,
}

// =====================================
// In-flight Recordings
// =====================================
/// شمارنده task‌های ثبت کلیک که هنوز تموم نشدن
#[derive(Clone)]
struct InFlight(Arc<watch::Sender<usize>>);

impl InFlight {
    fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self(Arc::new(tx))
    }

    /// قبل از spawn گرفته میشه تا `idle` هیچ task‌ی رو از قلم نندازه
    fn enter(&self) -> InFlightGuard {
        self.0.send_modify(|n| *n += 1);
        InFlightGuard(Arc::clone(&self.0))
    }

    async fn idle(&self) {
        let mut rx = self.0.subscribe();
        // sender در Arc خودمون زنده‌ست، پس خطا نمیده
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

/// با drop شدن (حتی در panic) شمارنده کم میشه
struct InFlightGuard(Arc<watch::Sender<usize>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

// =====================================
// Redirect Resolver
// =====================================
/// سرویس redirect
#[derive(Clone)]
pub struct RedirectResolver {
    store: Arc<dyn LinkStore>,
    events: Arc<dyn ClickEventLog>,
    clock: Arc<dyn Clock>,
    ip_hash_salt: Arc<str>,
    in_flight: InFlight,
}

impl RedirectResolver {
    #[must_use]
    pub fn new(
        store: Arc<dyn LinkStore>,
        events: Arc<dyn ClickEventLog>,
        clock: Arc<dyn Clock>,
        ip_hash_salt: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            events,
            clock,
            ip_hash_salt: ip_hash_salt.into(),
            in_flight: InFlight::new(),
        }
    }

    /// صبر تا همه ثبت‌های کلیک در جریان تموم بشن
    ///
    /// در shutdown بعد از توقف سرور و قبل از بستن pool صدا زده میشه.
    pub async fn wait_for_recordings(&self) {
        self.in_flight.idle().await;
    }

    /// resolve کردن کد
    ///
    /// # Errors
    /// فقط خطای دیتابیس در مرحله lookup؛ خطای ثبت کلیک لاگ و رها میشه
    #[instrument(skip(self, context))]
    pub async fn resolve(&self, code: &str, context: ClickContext) -> Result<Resolution> {
        if !utils::is_valid_code(code) {
            return Ok(Resolution::NotFound);
        }

        let Some(link) = self.store.find_by_code(code).await? else {
            debug!(code = %code, "Unknown code");
            return Ok(Resolution::NotFound);
        };

        let now = self.clock.now();
        if link.state_at(now) == LinkState::Expired {
            warn!(code = %code, "Attempted to access expired link");
            return Ok(Resolution::Expired);
        }

        // IP همینجا هش میشه؛ task فقط هش رو میبینه
        let event = NewClickEvent::from_context(&link.code, now, context, &self.ip_hash_salt);
        let events = Arc::clone(&self.events);
        let guard = self.in_flight.enter();

        let recording = tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = events.append(&event).await {
                warn!(error = %e, code = %event.link_code, "Failed to record click");
            }
        });

        Ok(Resolution::Active {
            original_url: link.original_url,
            recording,
        })
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        database::{ClickRepository, Database, LinkRepository, TempDatabase},
        models::{EventsQuery, NewLink},
    };
    use chrono::{Duration, TimeZone, Utc};

    struct Fixture {
        links: Arc<LinkRepository>,
        events: Arc<ClickRepository>,
        clock: ManualClock,
        resolver: RedirectResolver,
    }

    async fn fixture() -> Fixture {
        fixture_on(Database::in_memory().await.unwrap())
    }

    fn fixture_on(db: Database) -> Fixture {
        let links = Arc::new(LinkRepository::new(db.clone()));
        let events = Arc::new(ClickRepository::new(db));
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap());

        let resolver = RedirectResolver::new(
            links.clone(),
            events.clone(),
            Arc::new(clock.clone()),
            "test-salt",
        );

        Fixture {
            links,
            events,
            clock,
            resolver,
        }
    }

    async fn insert(fixture: &Fixture, code: &str, expires_in: Option<Duration>) {
        let now = fixture.clock.now();
        fixture
            .links
            .insert(&NewLink {
                code: code.to_string(),
                original_url: "https://example.com/target".to_string(),
                created_at: now,
                expires_at: expires_in.map(|d| now + d),
            })
            .await
            .unwrap()
            .unwrap();
    }

    fn context() -> ClickContext {
        ClickContext {
            ip: Some("203.0.113.9".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            referer: Some("https://news.example/".to_string()),
        }
    }

    #[tokio::test]
    async fn test_active_link_records_click() {
        let fixture = fixture().await;
        insert(&fixture, "active1", None).await;

        let resolution = fixture.resolver.resolve("active1", context()).await.unwrap();
        let Resolution::Active {
            original_url,
            recording,
        } = resolution
        else {
            panic!("expected active resolution");
        };
        recording.await.unwrap();

        assert_eq!(original_url, "https://example.com/target");

        let link = fixture.links.find_by_code("active1").await.unwrap().unwrap();
        assert_eq!(link.click_count, 1);

        let events = fixture
            .events
            .list_by_code("active1", &EventsQuery::default())
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].clicked_at, fixture.clock.now());
        assert_eq!(events[0].referer.as_deref(), Some("https://news.example/"));
        assert_eq!(events[0].ip_hash, utils::hash_ip("test-salt", Some("203.0.113.9")));
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let fixture = fixture().await;

        assert!(matches!(
            fixture.resolver.resolve("nope123", context()).await.unwrap(),
            Resolution::NotFound
        ));
        assert!(matches!(
            fixture.resolver.resolve("favicon.ico", context()).await.unwrap(),
            Resolution::NotFound
        ));
    }

    #[tokio::test]
    async fn test_link_expires_when_clock_passes_expiry() {
        let fixture = fixture().await;
        insert(&fixture, "hourly1", Some(Duration::hours(1))).await;

        match fixture.resolver.resolve("hourly1", context()).await.unwrap() {
            Resolution::Active { recording, .. } => recording.await.unwrap(),
            other => panic!("expected active, got {:?}", other),
        }

        fixture.clock.advance(Duration::hours(1) + Duration::seconds(1));

        assert!(matches!(
            fixture.resolver.resolve("hourly1", context()).await.unwrap(),
            Resolution::Expired
        ));
    }

    #[tokio::test]
    async fn test_expired_redirect_never_counts() {
        let fixture = fixture().await;
        insert(&fixture, "expire1", Some(Duration::minutes(5))).await;
        fixture.clock.advance(Duration::minutes(5));

        for _ in 0..3 {
            assert!(matches!(
                fixture.resolver.resolve("expire1", context()).await.unwrap(),
                Resolution::Expired
            ));
        }

        let link = fixture.links.find_by_code("expire1").await.unwrap().unwrap();
        assert_eq!(link.click_count, 0);
        assert!(fixture
            .events
            .list_by_code("expire1", &EventsQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_redirects_do_not_lose_clicks() {
        // فایل WAL با pool چند اتصالی؛ نوشتن‌ها واقعا همزمان رقابت میکنن
        let temp = TempDatabase::new().await;
        let fixture = Arc::new(fixture_on(temp.db.clone()));
        insert(&fixture, "busy001", None).await;

        let resolves: Vec<_> = (0..50)
            .map(|_| {
                let fixture = Arc::clone(&fixture);
                tokio::spawn(async move {
                    match fixture.resolver.resolve("busy001", context()).await.unwrap() {
                        Resolution::Active { recording, .. } => recording.await.unwrap(),
                        other => panic!("expected active, got {:?}", other),
                    }
                })
            })
            .collect();
        for handle in resolves {
            handle.await.unwrap();
        }

        let link = fixture.links.find_by_code("busy001").await.unwrap().unwrap();
        let events = fixture
            .events
            .list_by_code("busy001", &EventsQuery::default())
            .await
            .unwrap();
        assert_eq!(link.click_count, 50);
        assert_eq!(events.len(), 50);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_pending_recordings() {
        let temp = TempDatabase::new().await;
        let fixture = fixture_on(temp.db.clone());
        insert(&fixture, "keep001", None).await;

        // handle رو await نمیکنیم؛ مثل handler که فقط 302 برمیگردونه
        for _ in 0..5 {
            let resolution = fixture.resolver.resolve("keep001", context()).await.unwrap();
            assert!(matches!(resolution, Resolution::Active { .. }));
        }

        // همون ترتیب main: اول صبر برای ثبت‌ها، بعد بستن pool
        fixture.resolver.wait_for_recordings().await;
        temp.db.close().await;

        let reopened = Database::connect(temp.url()).await.unwrap();
        let link = LinkRepository::new(reopened.clone())
            .find_by_code("keep001")
            .await
            .unwrap()
            .unwrap();
        let events = ClickRepository::new(reopened.clone())
            .list_by_code("keep001", &EventsQuery::default())
            .await
            .unwrap();
        reopened.close().await;

        assert_eq!(link.click_count, 5);
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn test_wait_for_recordings_returns_when_idle() {
        let fixture = fixture().await;
        tokio::time::timeout(
            std::time::Duration::from_secs(1),
            fixture.resolver.wait_for_recordings(),
        )
        .await
        .unwrap();
    }
}
