use crate::config::CONFIG;
use crate::error::DBError;

pub async fn establish_db_connection() -> Option<sqlx::SqlitePool> {
    let database_url = CONFIG.database_url();
    sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&database_url)
        .await
        .ok()
}

/// Creates all tables and indices, if not present yet
pub async fn init_schema(conn: &sqlx::SqlitePool) -> Result<(), DBError> {
    for stmt in SCHEMA {
        sqlx::query(stmt).execute(conn).await?;
    }
    Ok(())
}

pub async fn check_schema(conn: &sqlx::SqlitePool) -> Result<(), DBError> {
    sqlx::query("SELECT count(*) as count FROM sensors")
        .fetch_one(conn)
        .await?;
    Ok(())
}

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS parcels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        location TEXT NOT NULL,
        area REAL NOT NULL,
        owner_id INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS sensors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        id_code TEXT NOT NULL,
        parcel_id INTEGER NOT NULL,
        sensor_type TEXT NOT NULL,
        unit TEXT NOT NULL,
        description TEXT NOT NULL,
        threshold_low REAL NOT NULL,
        threshold_high REAL NOT NULL,
        active INTEGER NOT NULL DEFAULT 1
    )"#,
    r#"CREATE TABLE IF NOT EXISTS sensor_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sensor_id INTEGER NOT NULL,
        timestamp TEXT NOT NULL,
        value REAL NOT NULL,
        raw TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS alerts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sensor_id INTEGER NOT NULL,
        kind TEXT NOT NULL,
        message TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        acknowledged INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )"#,
    // at most one open alert per (sensor, kind) - guards the
    // check-then-insert sequence in monitor::dedup
    r#"CREATE UNIQUE INDEX IF NOT EXISTS open_alert_per_kind
        ON alerts (sensor_id, kind) WHERE acknowledged = 0"#,
    "CREATE INDEX IF NOT EXISTS sensor_data_by_time ON sensor_data (sensor_id, timestamp)",
];

#[derive(sqlx::FromRow)]
pub(crate) struct CountRecord {
    pub count: i64,
}

impl CountRecord {
    pub fn count(self) -> i64 {
        self.count
    }
}

pub mod alert;
pub mod parcel;
pub mod sensor;
pub mod sensor_data;

// in-memory database, one connection so every query sees the same db
#[cfg(test)]
pub(crate) async fn establish_test_db_connection() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod test;
