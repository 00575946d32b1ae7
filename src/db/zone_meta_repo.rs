//! Repository functions for the `zone_meta` table (one row per local zone).
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// Locally kept bookkeeping for a zone hosted upstream.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ZoneMeta {
    pub id: i64,
    pub zone_name: String,
    pub owner: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub synced_with_pdns: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new `zone_meta` row.
#[derive(Debug, Clone, Default)]
pub struct NewZoneMeta<'a> {
    pub zone_name: &'a str,
    pub owner: Option<&'a str>,
    pub description: &'a str,
    pub tags: &'a [String],
    pub synced_with_pdns: bool,
}

pub async fn exists(db: &SqlitePool, zone_name: &str) -> sqlx::Result<bool> {
    let cnt: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM zone_meta WHERE zone_name = ?")
        .bind(zone_name)
        .fetch_one(db)
        .await?;
    Ok(cnt.0 > 0)
}

pub async fn find_by_name(db: &SqlitePool, zone_name: &str) -> sqlx::Result<Option<ZoneMeta>> {
    let row = sqlx::query(
        r#"
        SELECT
            id,
            zone_name,
            owner,
            description,
            tags,
            synced_with_pdns,
            created_at,
            updated_at
        FROM zone_meta
        WHERE zone_name = ?
        "#,
    )
    .bind(zone_name)
    .fetch_optional(db)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tags: String = row.get("tags");
    Ok(Some(ZoneMeta {
        id: row.get("id"),
        zone_name: row.get("zone_name"),
        owner: row.get("owner"),
        description: row.get("description"),
        tags: serde_json::from_str(&tags).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        synced_with_pdns: row.get::<i64, _>("synced_with_pdns") != 0,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }))
}

/// Insert metadata for a freshly created zone. Fails with a unique-constraint
/// database error if the zone already has a row.
pub async fn insert(db: &SqlitePool, meta: &NewZoneMeta<'_>) -> sqlx::Result<i64> {
    let now = Utc::now();
    let tags = serde_json::to_string(meta.tags).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let res = sqlx::query(
        r#"
        INSERT INTO zone_meta (
            zone_name,
            owner,
            description,
            tags,
            synced_with_pdns,
            created_at,
            updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(meta.zone_name)
    .bind(meta.owner)
    .bind(meta.description)
    .bind(tags)
    .bind(if meta.synced_with_pdns { 1 } else { 0 })
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(res.last_insert_rowid())
}

/// Remove the zone's row. Returns whether a row existed.
pub async fn delete(db: &SqlitePool, zone_name: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM zone_meta WHERE zone_name = ?")
        .bind(zone_name)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
