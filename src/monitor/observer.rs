use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::history::{self, SensorHistory, TimeWindow};
use super::summary::{self, DashboardSummary};
use crate::config::CONFIG;
use crate::error::{DBError, ObserverError};
use crate::models::{
    self,
    alert::{self as alert_model, AlertDao, AlertKind},
    parcel::{self as parcel_model, ParcelDao},
    sensor::{self as sensor_model, NewSensor, SensorDao},
    sensor_data::{self as sensor_data_model, SensorDataDao},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    Acknowledged,
    AlreadyAcknowledged,
}

/// Shared entry point for the scheduler and the REST layer.
///
/// Holds the connection pool and nothing else, every operation reads
/// fresh state. The periodic refresh is just `refresh_dashboard()` on a
/// timer, so the whole cycle stays callable on demand.
pub struct ConcurrentMonitor {
    pub(crate) db_conn: sqlx::SqlitePool,
    poll_interval: Duration,
    is_polling: AtomicBool,
}

impl ConcurrentMonitor {
    pub fn new(db_conn: sqlx::SqlitePool) -> Arc<Self> {
        Self::with_interval(db_conn, Duration::from_millis(CONFIG.poll_interval_ms()))
    }

    pub fn with_interval(db_conn: sqlx::SqlitePool, poll_interval: Duration) -> Arc<Self> {
        Arc::new(ConcurrentMonitor {
            db_conn,
            poll_interval,
            is_polling: AtomicBool::new(false),
        })
    }

    /// Runs the fixed-interval evaluation loop until `stop_polling()`.
    /// Each tick awaits the full cycle before re-arming, a slow cycle
    /// delays the next one instead of overlapping it.
    /// Blocks caller task in infinite loop
    pub async fn dispatch_poll_loop(self: Arc<ConcurrentMonitor>) {
        if self.is_polling.swap(true, Ordering::SeqCst) {
            error!("dispatch_poll_loop() already called!");
            return;
        }

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Start dashboard refresh loop");
        while self.is_polling.load(Ordering::SeqCst) {
            interval.tick().await;
            if !self.is_polling.load(Ordering::SeqCst) {
                break;
            }
            if let Err(e) = self.refresh_dashboard().await {
                error!("Failed refreshing dashboard: {}", e);
            }
        }
        info!("Stopped dashboard refresh loop");
    }

    pub fn stop_polling(&self) {
        self.is_polling.store(false, Ordering::SeqCst);
    }

    /// One evaluation cycle over all sensors, see summary::build
    pub async fn refresh_dashboard(&self) -> Result<DashboardSummary, ObserverError> {
        Ok(summary::build(&self.db_conn).await?)
    }

    /// Fetches a sensor with its parcel and windowed history
    pub async fn sensor_history(
        &self,
        sensor_id: i64,
        window: TimeWindow,
    ) -> Result<(SensorDao, Option<ParcelDao>, SensorHistory), ObserverError> {
        let sensor = sensor_model::get(&self.db_conn, sensor_id)
            .await?
            .ok_or(DBError::SensorNotFound(sensor_id))?;
        let parcel = parcel_model::get(&self.db_conn, sensor.parcel_id()).await?;
        let history = history::aggregate(&self.db_conn, sensor_id, window).await?;

        debug!(sensor_id = sensor_id, "Aggregated sensor history");
        Ok((sensor, parcel, history))
    }

    pub async fn add_reading(
        &self,
        sensor_id: i64,
        timestamp: Option<DateTime<Utc>>,
        value: f64,
    ) -> Result<SensorDataDao, ObserverError> {
        let _ = sensor_model::get(&self.db_conn, sensor_id)
            .await?
            .ok_or(DBError::SensorNotFound(sensor_id))?;

        let timestamp = timestamp
            .map(|ts| ts.naive_utc())
            .unwrap_or_else(|| Utc::now().naive_utc());
        let dao = sensor_data_model::insert(&self.db_conn, sensor_id, timestamp, value).await?;

        debug!(sensor_id = sensor_id, "Persisted sensor reading");
        Ok(dao)
    }

    pub async fn readings(
        &self,
        sensor_id: i64,
        from: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
        limit: i64,
    ) -> Result<Vec<SensorDataDao>, ObserverError> {
        let _ = sensor_model::get(&self.db_conn, sensor_id)
            .await?
            .ok_or(DBError::SensorNotFound(sensor_id))?;
        Ok(sensor_data_model::get_range(&self.db_conn, sensor_id, from, until, limit).await?)
    }

    /// Acknowledging twice is a reported no-op, not an error
    pub async fn acknowledge_alert(&self, alert_id: i64) -> Result<AckOutcome, ObserverError> {
        let alert = alert_model::get(&self.db_conn, alert_id)
            .await?
            .ok_or(DBError::AlertNotFound(alert_id))?;
        if alert.acknowledged() {
            return Ok(AckOutcome::AlreadyAcknowledged);
        }

        alert_model::acknowledge(&self.db_conn, alert_id).await?;
        info!(alert_id = alert_id, "Acknowledged alert");
        Ok(AckOutcome::Acknowledged)
    }

    /// Alerts newest first, each with the owning sensor's code
    pub async fn alerts(
        &self,
        kind: Option<AlertKind>,
        include_acknowledged: bool,
    ) -> Result<Vec<(AlertDao, String)>, ObserverError> {
        let daos = alert_model::read(&self.db_conn, kind, include_acknowledged).await?;
        let mut annotated = Vec::with_capacity(daos.len());
        for dao in daos {
            let sensor_code = match sensor_model::get(&self.db_conn, dao.sensor_id()).await? {
                Some(sensor) => sensor.id_code().clone(),
                None => "Unknown".to_owned(),
            };
            annotated.push((dao, sensor_code));
        }
        Ok(annotated)
    }

    pub async fn parcels(&self) -> Result<Vec<ParcelDao>, ObserverError> {
        Ok(parcel_model::read(&self.db_conn).await?)
    }

    pub async fn register_parcel(
        &self,
        name: &str,
        location: &str,
        area: f64,
        owner_id: i64,
    ) -> Result<ParcelDao, ObserverError> {
        let dao = parcel_model::insert(&self.db_conn, name, location, area, owner_id).await?;
        info!(parcel_id = dao.id(), "Registered new parcel");
        Ok(dao)
    }

    pub async fn remove_parcel(&self, parcel_id: i64) -> Result<(), ObserverError> {
        let _ = parcel_model::get(&self.db_conn, parcel_id)
            .await?
            .ok_or(DBError::ParcelNotFound(parcel_id))?;
        parcel_model::delete(&self.db_conn, parcel_id).await?;
        info!(parcel_id = parcel_id, "Removed parcel");
        Ok(())
    }

    pub async fn sensors(&self) -> Result<Vec<SensorDao>, ObserverError> {
        Ok(sensor_model::read(&self.db_conn).await?)
    }

    pub async fn parcel_sensors(&self, parcel_id: i64) -> Result<Vec<SensorDao>, ObserverError> {
        let _ = parcel_model::get(&self.db_conn, parcel_id)
            .await?
            .ok_or(DBError::ParcelNotFound(parcel_id))?;
        Ok(sensor_model::read_by_parcel(&self.db_conn, parcel_id).await?)
    }

    pub async fn register_sensor(&self, new_sensor: NewSensor) -> Result<SensorDao, ObserverError> {
        let parcel_id = new_sensor.parcel_id;
        let _ = parcel_model::get(&self.db_conn, parcel_id)
            .await?
            .ok_or(DBError::ParcelNotFound(parcel_id))?;

        let dao = sensor_model::insert(&self.db_conn, new_sensor).await?;
        info!(sensor_id = dao.id(), "Registered new sensor");
        Ok(dao)
    }

    pub async fn update_sensor(
        &self,
        sensor_id: i64,
        description: &str,
        threshold_low: f64,
        threshold_high: f64,
    ) -> Result<SensorDao, ObserverError> {
        let dao = sensor_model::update(
            &self.db_conn,
            sensor_id,
            description,
            threshold_low,
            threshold_high,
        )
        .await?;
        info!(sensor_id = sensor_id, "Updated sensor thresholds");
        Ok(dao)
    }

    pub async fn remove_sensor(&self, sensor_id: i64) -> Result<(), ObserverError> {
        let _ = sensor_model::get(&self.db_conn, sensor_id)
            .await?
            .ok_or(DBError::SensorNotFound(sensor_id))?;
        sensor_model::delete(&self.db_conn, sensor_id).await?;
        info!(sensor_id = sensor_id, "Removed sensor");
        Ok(())
    }

    pub async fn check_db(&self) -> String {
        match models::check_schema(&self.db_conn).await {
            Ok(_) => "connected".to_owned(),
            Err(e) => format!("error: {}", e),
        }
    }

    pub async fn sensor_count(&self) -> usize {
        sensor_model::read(&self.db_conn)
            .await
            .map(|v| v.len())
            .unwrap_or(0)
    }
}
