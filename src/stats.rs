//! Hourly per-zone request counters and their rolling 24 hour summaries.
//!
//! One observation is recorded per completed record operation. Buckets are
//! keyed by the local wall-clock hour the observation fell into.

use std::fmt;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Timelike};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::db::stats_repo;
use sqlx::SqlitePool;

/// Start of the wall-clock hour containing `at`, in `at`'s own time zone.
pub fn hour_bucket<Tz: TimeZone>(at: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    at.with_minute(0)?.with_second(0)?.with_nanosecond(0)
}

/// Record one request against `zone`, bucketed by the current local hour.
pub async fn record_observation(db: &SqlitePool, zone: &str, latency: Duration) -> anyhow::Result<()> {
    record_observation_at(db, zone, latency, Local::now()).await
}

pub async fn record_observation_at(
    db: &SqlitePool,
    zone: &str,
    latency: Duration,
    at: DateTime<Local>,
) -> anyhow::Result<()> {
    let hour = hour_bucket(&at)
        .with_context(|| format!("cannot truncate {at} to the hour"))?
        .timestamp();
    let latency_ms = i64::try_from(latency.as_millis()).unwrap_or(i64::MAX);

    stats_repo::upsert_observation(db, zone, hour, latency_ms).await?;
    debug!(zone, hour, latency_ms, "recorded zone observation");
    Ok(())
}

/// Relative change of the last 24 hours against the 24 hours before.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeFromYesterday {
    Percent(f64),
    /// The previous window saw no queries.
    NotApplicable,
}

impl ChangeFromYesterday {
    pub fn between(today: i64, yesterday: i64) -> Self {
        if yesterday == 0 {
            return ChangeFromYesterday::NotApplicable;
        }
        let change = (today - yesterday) as f64 / yesterday as f64 * 100.0;
        ChangeFromYesterday::Percent(change)
    }
}

impl fmt::Display for ChangeFromYesterday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeFromYesterday::Percent(p) if *p > 0.0 => write!(f, "+{p:.1}%"),
            ChangeFromYesterday::Percent(p) => write!(f, "{p:.1}%"),
            ChangeFromYesterday::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl Serialize for ChangeFromYesterday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStatsSummary {
    pub zone: String,
    pub total_queries: i64,
    pub avg_latency_ms: f64,
    pub previous_queries: i64,
    pub change_from_yesterday: ChangeFromYesterday,
}

/// Summary over `[now - 24h, now]`, or `None` when no bucket falls inside it.
pub async fn zone_last_24h(db: &SqlitePool, zone: &str) -> sqlx::Result<Option<ZoneStatsSummary>> {
    zone_last_24h_at(db, zone, Local::now()).await
}

pub async fn zone_last_24h_at(
    db: &SqlitePool,
    zone: &str,
    now: DateTime<Local>,
) -> sqlx::Result<Option<ZoneStatsSummary>> {
    let day = TimeDelta::hours(24);
    let now_ts = now.timestamp();
    let day_ago = (now - day).timestamp();
    let two_days_ago = (now - day - day).timestamp();

    let today = stats_repo::totals_inclusive(db, zone, day_ago, now_ts).await?;
    if today.buckets == 0 {
        return Ok(None);
    }
    let yesterday = stats_repo::totals_half_open(db, zone, two_days_ago, day_ago).await?;

    Ok(Some(ZoneStatsSummary {
        zone: zone.to_string(),
        total_queries: today.queries,
        avg_latency_ms: today.avg_latency_ms,
        previous_queries: yesterday.queries,
        change_from_yesterday: ChangeFromYesterday::between(today.queries, yesterday.queries),
    }))
}
