use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::info;

use super::dedup;
use super::evaluator::{self, SensorStatus};
use crate::error::DBError;
use crate::models::alert::{self, AlertKind};
use crate::models::{parcel, sensor, sensor_data};

const RECENT_ALERT_COUNT: i64 = 5;

#[derive(Serialize, Debug, Clone)]
pub struct SensorOverview {
    pub id: i64,
    pub code: String,
    pub sensor_type: String,
    pub parcel_id: i64,
    pub unit: String,
    pub status: SensorStatus,
    pub value_display: String,
    pub last_update: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct AlertOverview {
    pub id: i64,
    pub sensor_code: String,
    pub kind: AlertKind,
    pub message: String,
    pub time_ago: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct DashboardSummary {
    pub total_parcels: i64,
    pub total_sensors: i64,
    pub active_alerts: i64,
    pub sensors: Vec<SensorOverview>,
    pub recent_alerts: Vec<AlertOverview>,
}

/// Runs one evaluation cycle and rolls the results up into the dashboard
/// summary.
///
/// Every sensor is evaluated against its single latest reading; violations
/// are handed to the deduplicator, which decides whether a new alert row
/// is persisted. Re-running with unchanged readings is a no-op on the
/// alert table, so the scheduler may call this as often as it likes.
pub async fn build(conn: &sqlx::SqlitePool) -> Result<DashboardSummary, DBError> {
    let now = Utc::now().naive_utc();

    let sensors = sensor::read(conn).await?;
    let mut overviews = Vec::with_capacity(sensors.len());
    for sensor in &sensors {
        let latest = sensor_data::get_latest(conn, sensor.id()).await?;
        let evaluation = evaluator::evaluate(sensor, latest.as_ref());

        if let (Some(kind), Some(message)) =
            (evaluation.status.violation_kind(), &evaluation.message)
        {
            // timestamp is copied from the triggering reading
            let reading = latest.as_ref().unwrap();
            if dedup::try_raise(conn, sensor.id(), kind, message, reading.timestamp()).await? {
                info!(sensor_id = sensor.id(), kind = ?kind, "Raised alert");
            }
        }

        let (value_display, last_update) = match &latest {
            Some(reading) => (
                format!("{:.1}", reading.value()),
                last_update_label(now - reading.timestamp()),
            ),
            None => ("--".to_owned(), "Never".to_owned()),
        };
        overviews.push(SensorOverview {
            id: sensor.id(),
            code: sensor.id_code().clone(),
            sensor_type: sensor.sensor_type().clone(),
            parcel_id: sensor.parcel_id(),
            unit: sensor.unit().clone(),
            status: evaluation.status,
            value_display,
            last_update,
        });
    }

    // global count, not scoped to the sensors evaluated above
    let active_alerts = alert::count_unacknowledged(conn).await?;

    let mut recent_alerts = Vec::new();
    for dao in alert::recent_unacknowledged(conn, RECENT_ALERT_COUNT).await? {
        let sensor_code = match sensor::get(conn, dao.sensor_id()).await? {
            Some(sensor) => sensor.id_code().clone(),
            None => "Unknown".to_owned(),
        };
        recent_alerts.push(AlertOverview {
            id: dao.id(),
            sensor_code,
            kind: dao.kind(),
            message: dao.message().clone(),
            time_ago: alert_age_label(now - dao.timestamp()),
        });
    }

    let total_parcels = parcel::count(conn).await?;

    Ok(DashboardSummary {
        total_parcels,
        total_sensors: sensors.len() as i64,
        active_alerts,
        sensors: overviews,
        recent_alerts,
    })
}

/// Relative age of a sensor's latest reading, hour granularity at most
pub(crate) fn last_update_label(delta: Duration) -> String {
    let seconds = delta.num_seconds();
    if seconds < 60 {
        "Just now".to_owned()
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else {
        format!("{}h ago", seconds / 3600)
    }
}

/// Relative age of an alert, escalates to day granularity past 24h
pub(crate) fn alert_age_label(delta: Duration) -> String {
    let seconds = delta.num_seconds();
    if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", delta.num_days())
    }
}
