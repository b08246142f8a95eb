use chrono::NaiveDateTime;

use crate::error::DBError;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SensorDataDao {
    pub(crate) id: i64,
    pub(crate) sensor_id: i64,
    pub(crate) timestamp: NaiveDateTime,
    pub(crate) value: f64,
    pub(crate) raw: String,
}

impl SensorDataDao {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn sensor_id(&self) -> i64 {
        self.sensor_id
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn raw(&self) -> &String {
        &self.raw
    }
}

/// Readings are append-only, there is no update or delete path
pub async fn insert(
    conn: &sqlx::SqlitePool,
    sensor_id: i64,
    timestamp: NaiveDateTime,
    value: f64,
) -> Result<SensorDataDao, DBError> {
    Ok(sqlx::query_as::<_, SensorDataDao>(
        "INSERT INTO sensor_data (sensor_id, timestamp, value, raw) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(sensor_id)
    .bind(timestamp)
    .bind(value)
    .bind(value.to_string())
    .fetch_one(conn)
    .await?)
}

pub async fn get_latest(
    conn: &sqlx::SqlitePool,
    sensor_id: i64,
) -> Result<Option<SensorDataDao>, DBError> {
    Ok(sqlx::query_as::<_, SensorDataDao>(
        "SELECT * FROM sensor_data WHERE sensor_id = ? ORDER BY timestamp DESC LIMIT 1",
    )
    .bind(sensor_id)
    .fetch_optional(conn)
    .await?)
}

/// READ sensor_data since a point in time, ascending by timestamp.
/// Future-dated readings are included on purpose, timestamps may be
/// client-supplied.
pub async fn get_since(
    conn: &sqlx::SqlitePool,
    sensor_id: i64,
    from: NaiveDateTime,
) -> Result<Vec<SensorDataDao>, DBError> {
    Ok(sqlx::query_as::<_, SensorDataDao>(
        r#"SELECT * FROM sensor_data
            WHERE sensor_id = ? AND timestamp >= ?
            ORDER BY timestamp ASC"#,
    )
    .bind(sensor_id)
    .bind(from)
    .fetch_all(conn)
    .await?)
}

/// READ sensor_data between optional bounds, newest first
pub async fn get_range(
    conn: &sqlx::SqlitePool,
    sensor_id: i64,
    from: Option<NaiveDateTime>,
    until: Option<NaiveDateTime>,
    limit: i64,
) -> Result<Vec<SensorDataDao>, DBError> {
    let mut sql = String::from("SELECT * FROM sensor_data WHERE sensor_id = ?");
    if from.is_some() {
        sql += " AND timestamp >= ?";
    }
    if until.is_some() {
        sql += " AND timestamp <= ?";
    }
    sql += " ORDER BY timestamp DESC LIMIT ?";

    let mut query = sqlx::query_as::<_, SensorDataDao>(&sql).bind(sensor_id);
    if let Some(from) = from {
        query = query.bind(from);
    }
    if let Some(until) = until {
        query = query.bind(until);
    }
    Ok(query.bind(limit).fetch_all(conn).await?)
}
