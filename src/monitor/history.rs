use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::DBError;
use crate::models::sensor_data;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    #[serde(rename = "24h")]
    Hours24,
    #[serde(rename = "7d")]
    Days7,
    #[serde(rename = "30d")]
    Days30,
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::Hours24
    }
}

impl TimeWindow {
    /// Unknown values fall back to the 24h default
    pub fn parse(value: &str) -> TimeWindow {
        match value {
            "7d" => TimeWindow::Days7,
            "30d" => TimeWindow::Days30,
            _ => TimeWindow::Hours24,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            TimeWindow::Hours24 => Duration::hours(24),
            TimeWindow::Days7 => Duration::days(7),
            TimeWindow::Days30 => Duration::days(30),
        }
    }

    /// Chart axis label for a point inside this window
    pub fn label(&self, timestamp: &NaiveDateTime) -> String {
        match self {
            TimeWindow::Hours24 => timestamp.format("%H:%M").to_string(),
            _ => timestamp.format("%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct HistoryPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub label: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct SensorHistory {
    pub window: TimeWindow,
    pub points: Vec<HistoryPoint>,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Collects all readings of a sensor inside the trailing window, ascending
/// by timestamp, with min/avg/max over the same set.
///
/// An empty window reports min = max = avg = 0, the dashboard renders
/// those as literal zeros.
pub async fn aggregate(
    conn: &sqlx::SqlitePool,
    sensor_id: i64,
    window: TimeWindow,
) -> Result<SensorHistory, DBError> {
    let from = Utc::now().naive_utc() - window.duration();
    let daos = sensor_data::get_since(conn, sensor_id, from).await?;

    let points: Vec<HistoryPoint> = daos
        .iter()
        .map(|dao| HistoryPoint {
            timestamp: dao.timestamp(),
            value: dao.value(),
            label: window.label(&dao.timestamp()),
        })
        .collect();

    let (mut min, mut max, mut avg) = (0.0, 0.0, 0.0);
    if !points.is_empty() {
        min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        max = points
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max);
        avg = points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64;
    }

    Ok(SensorHistory {
        window,
        points,
        min,
        max,
        avg,
    })
}
