//! # Click Repository
//!
//! پیاده‌سازی SQLite برای `ClickEventLog`.
//!
//! ## مفاهیم Rust:
//! - **Transaction**: ثبت رویداد و افزایش شمارنده یا هر دو انجام میشن یا هیچکدوم
//! - **QueryBuilder**: ساخت کوئری با فیلترهای اختیاری بدون string concat دستی

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use super::{repository::increment_clicks_with, ClickEventLog, Database};
use crate::{
    error::{AppError, Result},
    models::{ClickEvent, DayCount, EventsQuery, NewClickEvent},
};

/// پیاده‌سازی SQLite برای لاگ رویدادها
#[derive(Debug, Clone)]
pub struct ClickRepository {
    db: Database,
}

impl ClickRepository {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClickEventLog for ClickRepository {
    async fn append(&self, event: &NewClickEvent) -> Result<ClickEvent> {
        let mut tx = self.db.begin().await?;

        // اول UPDATE تا قفل نوشتن از همون ابتدا گرفته بشه
        if !increment_clicks_with(&mut *tx, &event.link_code).await? {
            // tx بدون commit drop میشه => rollback
            return Err(AppError::link_not_found(&event.link_code));
        }

        sqlx::query(
            r#"
            INSERT INTO click_events (id, link_code, clicked_at, user_agent, referer, ip_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.link_code)
        .bind(event.clicked_at)
        .bind(&event.user_agent)
        .bind(&event.referer)
        .bind(&event.ip_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ClickEvent {
            id: event.id.clone(),
            link_code: event.link_code.clone(),
            clicked_at: event.clicked_at,
            user_agent: event.user_agent.clone(),
            referer: event.referer.clone(),
            ip_hash: event.ip_hash.clone(),
        })
    }

    async fn list_by_code(&self, code: &str, query: &EventsQuery) -> Result<Vec<ClickEvent>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, link_code, clicked_at, user_agent, referer, ip_hash \
             FROM click_events WHERE link_code = ",
        );
        builder.push_bind(code.to_string());

        if let Some(since) = query.since {
            builder.push(" AND clicked_at >= ").push_bind(since);
        }
        if let Some(until) = query.until {
            builder.push(" AND clicked_at < ").push_bind(until);
        }

        builder
            .push(" ORDER BY clicked_at ASC, rowid ASC LIMIT ")
            .push_bind(i64::from(query.effective_limit()));

        let events = builder
            .build_query_as::<ClickEvent>()
            .fetch_all(self.db.pool())
            .await?;

        Ok(events)
    }

    async fn daily_counts(
        &self,
        code: Option<&str>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DayCount>> {
        // زمان‌ها به صورت RFC 3339 با offset صفر ذخیره میشن،
        // پس ده کاراکتر اول همون تاریخ UTC هست
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT substr(clicked_at, 1, 10) AS day, COUNT(*) AS clicks \
             FROM click_events WHERE clicked_at >= ",
        );
        builder.push_bind(from);
        builder.push(" AND clicked_at < ").push_bind(to);

        if let Some(code) = code {
            builder.push(" AND link_code = ").push_bind(code.to_string());
        }

        builder.push(" GROUP BY day ORDER BY day ASC");

        let counts = builder
            .build_query_as::<DayCount>()
            .fetch_all(self.db.pool())
            .await?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{LinkRepository, LinkStore};
    use crate::models::NewLink;
    use chrono::{Duration, TimeZone};

    async fn setup() -> (LinkRepository, ClickRepository) {
        let db = Database::in_memory().await.unwrap();
        let links = LinkRepository::new(db.clone());
        let created_at = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();

        for code in ["link001", "link002"] {
            links
                .insert(&NewLink {
                    code: code.to_string(),
                    original_url: "https://example.com/".to_string(),
                    created_at,
                    expires_at: None,
                })
                .await
                .unwrap();
        }

        (links, ClickRepository::new(db))
    }

    fn event(id: &str, code: &str, at: DateTime<Utc>) -> NewClickEvent {
        NewClickEvent {
            id: id.to_string(),
            link_code: code.to_string(),
            clicked_at: at,
            user_agent: Some("test-agent".to_string()),
            referer: None,
            ip_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_append_keeps_counter_in_sync() {
        let (links, clicks) = setup().await;
        let at = Utc.with_ymd_and_hms(2026, 10, 10, 9, 30, 0).unwrap();

        let stored = clicks.append(&event("e1", "link001", at)).await.unwrap();
        clicks.append(&event("e2", "link001", at)).await.unwrap();

        assert_eq!(stored.clicked_at, at);
        let link = links.find_by_code("link001").await.unwrap().unwrap();
        assert_eq!(link.click_count, 2);

        let events = clicks
            .list_by_code("link001", &EventsQuery::default())
            .await
            .unwrap();
        assert_eq!(events.len() as i64, link.click_count);
    }

    #[tokio::test]
    async fn test_append_to_unknown_link_writes_nothing() {
        let (_, clicks) = setup().await;
        let err = clicks
            .append(&event("e1", "missing", Utc::now()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(clicks
            .list_by_code("missing", &EventsQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_by_code_filters_window_and_orders() {
        let (_, clicks) = setup().await;
        let base = Utc.with_ymd_and_hms(2026, 10, 10, 0, 0, 0).unwrap();

        clicks.append(&event("late", "link001", base + Duration::hours(5))).await.unwrap();
        clicks.append(&event("early", "link001", base + Duration::hours(1))).await.unwrap();
        clicks.append(&event("other", "link002", base + Duration::hours(2))).await.unwrap();
        clicks.append(&event("mid", "link001", base + Duration::hours(3))).await.unwrap();

        let all = clicks
            .list_by_code("link001", &EventsQuery::default())
            .await
            .unwrap();
        let ids: Vec<&str> = all.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);

        let windowed = clicks
            .list_by_code(
                "link001",
                &EventsQuery {
                    limit: Some(10),
                    since: Some(base + Duration::hours(1)),
                    until: Some(base + Duration::hours(5)),
                },
            )
            .await
            .unwrap();
        let ids: Vec<&str> = windowed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid"]);

        let limited = clicks
            .list_by_code(
                "link001",
                &EventsQuery {
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "early");
    }

    #[tokio::test]
    async fn test_daily_counts_groups_by_utc_day() {
        let (_, clicks) = setup().await;
        let day1 = Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap();
        let day2 = day1 + Duration::days(1);

        clicks.append(&event("a", "link001", day1)).await.unwrap();
        clicks
            .append(&event("b", "link001", day1 + Duration::hours(23) + Duration::minutes(59)))
            .await
            .unwrap();
        clicks.append(&event("c", "link002", day1 + Duration::hours(4))).await.unwrap();
        clicks.append(&event("d", "link001", day2 + Duration::milliseconds(250))).await.unwrap();
        // بیرون از بازه
        clicks.append(&event("e", "link001", day1 - Duration::seconds(1))).await.unwrap();

        let to = day2 + Duration::days(1);
        let per_link = clicks.daily_counts(Some("link001"), day1, to).await.unwrap();
        assert_eq!(
            per_link,
            vec![
                DayCount {
                    day: "2026-10-14".to_string(),
                    clicks: 2
                },
                DayCount {
                    day: "2026-10-15".to_string(),
                    clicks: 1
                },
            ]
        );

        let global = clicks.daily_counts(None, day1, to).await.unwrap();
        assert_eq!(global[0].clicks, 3);
        assert_eq!(global[1].clicks, 1);
    }
}
