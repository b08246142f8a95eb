use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DBError;

/// Which side of the configured band a reading fell out of.
/// Part of the dedup key, so a LOW and a HIGH alert can be open
/// for the same sensor at the same time.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertKind {
    High,
    Low,
}

impl AlertKind {
    pub fn parse(value: &str) -> Option<AlertKind> {
        match value {
            "HIGH" => Some(AlertKind::High),
            "LOW" => Some(AlertKind::Low),
            _ => None,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct AlertDao {
    pub(crate) id: i64,
    pub(crate) sensor_id: i64,
    pub(crate) kind: AlertKind,
    pub(crate) message: String,
    pub(crate) timestamp: NaiveDateTime,
    pub(crate) acknowledged: bool,
    pub(crate) created_at: NaiveDateTime,
}

impl AlertDao {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn sensor_id(&self) -> i64 {
        self.sensor_id
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn message(&self) -> &String {
        &self.message
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
}

/// Inserts a new unacknowledged alert.
/// The `open_alert_per_kind` index rejects a second open row for the
/// same (sensor, kind), see monitor::dedup.
pub async fn insert_open(
    conn: &sqlx::SqlitePool,
    sensor_id: i64,
    kind: AlertKind,
    message: &str,
    timestamp: NaiveDateTime,
) -> Result<AlertDao, DBError> {
    Ok(sqlx::query_as::<_, AlertDao>(
        r#"INSERT INTO alerts (sensor_id, kind, message, timestamp, acknowledged, created_at)
            VALUES (?, ?, ?, ?, 0, ?) RETURNING *"#,
    )
    .bind(sensor_id)
    .bind(kind)
    .bind(message)
    .bind(timestamp)
    .bind(Utc::now().naive_utc())
    .fetch_one(conn)
    .await?)
}

pub async fn find_open(
    conn: &sqlx::SqlitePool,
    sensor_id: i64,
    kind: AlertKind,
) -> Result<Option<AlertDao>, DBError> {
    Ok(sqlx::query_as::<_, AlertDao>(
        "SELECT * FROM alerts WHERE sensor_id = ? AND kind = ? AND acknowledged = 0",
    )
    .bind(sensor_id)
    .bind(kind)
    .fetch_optional(conn)
    .await?)
}

pub async fn get(conn: &sqlx::SqlitePool, alert_id: i64) -> Result<Option<AlertDao>, DBError> {
    Ok(
        sqlx::query_as::<_, AlertDao>("SELECT * FROM alerts WHERE id = ?")
            .bind(alert_id)
            .fetch_optional(conn)
            .await?,
    )
}

pub async fn count_unacknowledged(conn: &sqlx::SqlitePool) -> Result<i64, DBError> {
    let record = sqlx::query_as::<_, super::CountRecord>(
        "SELECT count(*) as count FROM alerts WHERE acknowledged = 0",
    )
    .fetch_one(conn)
    .await?;
    Ok(record.count())
}

/// READ the most recently created unacknowledged alerts, newest first
pub async fn recent_unacknowledged(
    conn: &sqlx::SqlitePool,
    limit: i64,
) -> Result<Vec<AlertDao>, DBError> {
    Ok(sqlx::query_as::<_, AlertDao>(
        "SELECT * FROM alerts WHERE acknowledged = 0 ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(conn)
    .await?)
}

/// READ alerts, optionally filtered by kind, acknowledged ones only on demand
pub async fn read(
    conn: &sqlx::SqlitePool,
    kind: Option<AlertKind>,
    include_acknowledged: bool,
) -> Result<Vec<AlertDao>, DBError> {
    let mut sql = String::from("SELECT * FROM alerts");
    let mut clauses: Vec<&str> = Vec::new();
    if !include_acknowledged {
        clauses.push("acknowledged = 0");
    }
    if kind.is_some() {
        clauses.push("kind = ?");
    }
    if !clauses.is_empty() {
        sql += " WHERE ";
        sql += &clauses.join(" AND ");
    }
    sql += " ORDER BY timestamp DESC";

    let mut query = sqlx::query_as::<_, AlertDao>(&sql);
    if let Some(kind) = kind {
        query = query.bind(kind);
    }
    Ok(query.fetch_all(conn).await?)
}

pub async fn acknowledge(conn: &sqlx::SqlitePool, alert_id: i64) -> Result<(), DBError> {
    sqlx::query("UPDATE alerts SET acknowledged = 1 WHERE id = ?")
        .bind(alert_id)
        .execute(conn)
        .await?;
    Ok(())
}
