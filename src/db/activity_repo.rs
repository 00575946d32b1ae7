//! Append-only audit trail in the `activity_log` table.
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

#[derive(Debug, Clone, serde::Serialize)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub actor_id: String,
    pub action: String,
    pub target: Option<String>,
    pub details: serde_json::Value,
    pub source_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub async fn append(
    db: &SqlitePool,
    actor_id: &str,
    action: &str,
    target: Option<&str>,
    details: &serde_json::Value,
    source_address: Option<&str>,
) -> sqlx::Result<i64> {
    let res = sqlx::query(
        r#"
        INSERT INTO activity_log (
            actor_id,
            action,
            target,
            details,
            source_address,
            created_at
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(actor_id)
    .bind(action)
    .bind(target)
    .bind(details.to_string())
    .bind(source_address)
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(res.last_insert_rowid())
}

/// Entries recorded against `target`, oldest first.
pub async fn list_for_target(db: &SqlitePool, target: &str) -> sqlx::Result<Vec<ActivityLogEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, actor_id, action, target, details, source_address, created_at
        FROM activity_log
        WHERE target = ?
        ORDER BY id
        "#,
    )
    .bind(target)
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|row| {
            let details: String = row.get("details");
            Ok(ActivityLogEntry {
                id: row.get("id"),
                actor_id: row.get("actor_id"),
                action: row.get("action"),
                target: row.get("target"),
                details: serde_json::from_str(&details)
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
                source_address: row.get("source_address"),
                timestamp: row.get::<DateTime<Utc>, _>("created_at"),
            })
        })
        .collect()
}
