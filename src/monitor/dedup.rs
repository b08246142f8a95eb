use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::DBError;
use crate::models::alert::{self, AlertKind};

/// Raises an alert unless one of the same kind is already open for the
/// sensor. Returns whether a new alert was created.
///
/// The check-then-insert below is not transactional. Two overlapping
/// evaluation cycles can both pass the `find_open` check, so the
/// `open_alert_per_kind` unique index has the final word: the losing
/// insert surfaces as a unique violation and is reported as "not created".
pub async fn try_raise(
    conn: &sqlx::SqlitePool,
    sensor_id: i64,
    kind: AlertKind,
    message: &str,
    timestamp: NaiveDateTime,
) -> Result<bool, DBError> {
    if alert::find_open(conn, sensor_id, kind).await?.is_some() {
        debug!(sensor_id = sensor_id, "Alert already open, not re-raising");
        return Ok(false);
    }

    match alert::insert_open(conn, sensor_id, kind, message, timestamp).await {
        Ok(_) => Ok(true),
        Err(DBError::SqlError(sqlx::Error::Database(db_err))) if db_err.is_unique_violation() => {
            debug!(sensor_id = sensor_id, "Lost alert insert race");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}
