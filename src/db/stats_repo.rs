//! Per-(zone, hour) counters in the `zone_stats` table.
use sqlx::SqlitePool;

/// Count one request for `zone` in the bucket starting at `hour` (unix
/// seconds). The bucket keeps the latest latency, not an aggregate.
pub async fn upsert_observation(
    db: &SqlitePool,
    zone: &str,
    hour: i64,
    latency_ms: i64,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO zone_stats (zone, hour, queries, latency)
        VALUES (?, ?, 1, ?)
        ON CONFLICT (zone, hour) DO UPDATE SET
            queries = zone_stats.queries + 1,
            latency = excluded.latency
        "#,
    )
    .bind(zone)
    .bind(hour)
    .bind(latency_ms)
    .execute(db)
    .await?;

    Ok(())
}

/// Aggregate over the buckets of one zone whose hour lies in a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowTotals {
    pub buckets: i64,
    pub queries: i64,
    pub avg_latency_ms: f64,
}

/// Buckets with `from <= hour <= to`.
pub async fn totals_inclusive(
    db: &SqlitePool,
    zone: &str,
    from: i64,
    to: i64,
) -> sqlx::Result<WindowTotals> {
    totals(
        db,
        "SELECT COUNT(*), SUM(queries), AVG(latency) FROM zone_stats \
         WHERE zone = ? AND hour >= ? AND hour <= ?",
        zone,
        from,
        to,
    )
    .await
}

/// Buckets with `from <= hour < to`.
pub async fn totals_half_open(
    db: &SqlitePool,
    zone: &str,
    from: i64,
    to: i64,
) -> sqlx::Result<WindowTotals> {
    totals(
        db,
        "SELECT COUNT(*), SUM(queries), AVG(latency) FROM zone_stats \
         WHERE zone = ? AND hour >= ? AND hour < ?",
        zone,
        from,
        to,
    )
    .await
}

async fn totals(
    db: &SqlitePool,
    sql: &'static str,
    zone: &str,
    from: i64,
    to: i64,
) -> sqlx::Result<WindowTotals> {
    let (buckets, queries, avg_latency): (i64, Option<i64>, Option<f64>) = sqlx::query_as(sql)
        .bind(zone)
        .bind(from)
        .bind(to)
        .fetch_one(db)
        .await?;

    Ok(WindowTotals {
        buckets,
        queries: queries.unwrap_or(0),
        avg_latency_ms: avg_latency.unwrap_or(0.0),
    })
}

/// Raw `(queries, latency)` of one bucket.
pub async fn bucket(db: &SqlitePool, zone: &str, hour: i64) -> sqlx::Result<Option<(i64, i64)>> {
    sqlx::query_as("SELECT queries, latency FROM zone_stats WHERE zone = ? AND hour = ?")
        .bind(zone)
        .bind(hour)
        .fetch_optional(db)
        .await
}
