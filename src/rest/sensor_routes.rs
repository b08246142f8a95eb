use std::sync::Arc;
use warp::Filter;

use super::build_response;
use crate::models::sensor::NewSensor;
use crate::monitor::history::TimeWindow;
use crate::monitor::ConcurrentMonitor;

pub fn routes(
    monitor: &Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    get_sensors(monitor.clone())
        .or(create_sensor(monitor.clone()))
        .or(update_sensor(monitor.clone()))
        .or(delete_sensor(monitor.clone()))
        .or(ingest_reading(monitor.clone()))
        .or(get_readings(monitor.clone()))
        .or(get_history(monitor.clone()))
}

/// GET /api/sensor
///
/// List all sensors in the system
fn get_sensors(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::get())
        .and(warp::path!("api" / "sensor"))
        .and_then(|monitor: Arc<ConcurrentMonitor>| async move {
            let resp = monitor
                .sensors()
                .await
                .map(|sensors| sensors.iter().map(dto::SensorDto::from).collect::<Vec<_>>());
            build_response(resp)
        })
        .boxed()
}

/// POST /api/sensor
///
/// Register a new sensor on a parcel.
/// The unit defaults from the sensor type when omitted
fn create_sensor(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::post())
        .and(warp::path!("api" / "sensor"))
        .and(warp::body::json())
        .and_then(
            |monitor: Arc<ConcurrentMonitor>, body: dto::SensorCreateRequestDto| async move {
                let resp = monitor
                    .register_sensor(NewSensor {
                        id_code: body.id_code,
                        parcel_id: body.parcel_id,
                        sensor_type: body.sensor_type,
                        unit: body.unit,
                        description: body.description,
                        threshold_low: body.threshold_low,
                        threshold_high: body.threshold_high,
                    })
                    .await
                    .map(|dao| dto::SensorDto::from(&dao));
                build_response(resp)
            },
        )
        .boxed()
}

/// PUT /api/sensor/:id
///
/// Edit a sensor's description and threshold bounds
fn update_sensor(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::put())
        .and(warp::path!("api" / "sensor" / i64))
        .and(warp::body::json())
        .and_then(
            |monitor: Arc<ConcurrentMonitor>,
             sensor_id: i64,
             body: dto::SensorUpdateRequestDto| async move {
                let resp = monitor
                    .update_sensor(
                        sensor_id,
                        &body.description,
                        body.threshold_low,
                        body.threshold_high,
                    )
                    .await
                    .map(|dao| dto::SensorDto::from(&dao));
                build_response(resp)
            },
        )
        .boxed()
}

/// DELETE /api/sensor
///
/// Remove a sensor with all its readings and alerts
fn delete_sensor(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::delete())
        .and(warp::path!("api" / "sensor"))
        .and(warp::body::json())
        .and_then(
            |monitor: Arc<ConcurrentMonitor>, body: dto::SensorDeleteRequestDto| async move {
                let resp = monitor.remove_sensor(body.id).await;
                build_response(resp)
            },
        )
        .boxed()
}

/// POST /api/sensor/:id/data
///
/// Submit a new reading. The timestamp may be client-supplied and
/// defaults to now
fn ingest_reading(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::post())
        .and(warp::path!("api" / "sensor" / i64 / "data"))
        .and(warp::body::json())
        .and_then(
            |monitor: Arc<ConcurrentMonitor>, sensor_id: i64, body: dto::ReadingInputDto| async move {
                let resp = monitor
                    .add_reading(sensor_id, body.timestamp, body.value)
                    .await
                    .map(|dao| dto::ReadingCreatedDto {
                        status: "success".to_owned(),
                        data_id: dao.id(),
                    });
                build_response(resp)
            },
        )
        .boxed()
}

/// GET /api/sensor/:id/data?from=&until=&limit=
///
/// Raw readings between optional RFC 3339 bounds, newest first
fn get_readings(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::get())
        .and(warp::path!("api" / "sensor" / i64 / "data"))
        .and(warp::query::<dto::RangeQueryDto>())
        .and_then(
            |monitor: Arc<ConcurrentMonitor>, sensor_id: i64, query: dto::RangeQueryDto| async move {
                let resp = monitor
                    .readings(
                        sensor_id,
                        query.from.map(|ts| ts.naive_utc()),
                        query.until.map(|ts| ts.naive_utc()),
                        query.limit.unwrap_or(100),
                    )
                    .await
                    .map(|daos| daos.iter().map(dto::ReadingDto::from).collect::<Vec<_>>());
                build_response(resp)
            },
        )
        .boxed()
}

/// GET /api/sensor/:id/history?window=24h|7d|30d
///
/// Windowed history with min/avg/max summary statistics and
/// chart-ready point labels
fn get_history(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::get())
        .and(warp::path!("api" / "sensor" / i64 / "history"))
        .and(warp::query::<dto::WindowQueryDto>())
        .and_then(
            |monitor: Arc<ConcurrentMonitor>, sensor_id: i64, query: dto::WindowQueryDto| async move {
                let window = query
                    .window
                    .as_deref()
                    .map(TimeWindow::parse)
                    .unwrap_or_default();
                let resp = monitor
                    .sensor_history(sensor_id, window)
                    .await
                    .map(|(sensor, parcel, history)| dto::SensorHistoryDto {
                        sensor_code: sensor.id_code().clone(),
                        description: sensor.description().clone(),
                        unit: sensor.unit().clone(),
                        parcel_name: parcel
                            .map(|p| p.name().clone())
                            .unwrap_or_else(|| "Unknown Parcel".to_owned()),
                        history,
                    });
                build_response(resp)
            },
        )
        .boxed()
}

pub mod dto {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Serialize};

    use crate::models::sensor::SensorDao;
    use crate::models::sensor_data::SensorDataDao;
    use crate::monitor::history::SensorHistory;

    #[derive(Debug, Serialize)]
    pub struct SensorDto {
        pub id: i64,
        pub id_code: String,
        pub parcel_id: i64,
        pub sensor_type: String,
        pub unit: String,
        pub description: String,
        pub threshold_low: f64,
        pub threshold_high: f64,
        pub active: bool,
    }

    impl From<&SensorDao> for SensorDto {
        fn from(dao: &SensorDao) -> Self {
            SensorDto {
                id: dao.id(),
                id_code: dao.id_code().clone(),
                parcel_id: dao.parcel_id(),
                sensor_type: dao.sensor_type().clone(),
                unit: dao.unit().clone(),
                description: dao.description().clone(),
                threshold_low: dao.threshold_low(),
                threshold_high: dao.threshold_high(),
                active: dao.active(),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct SensorCreateRequestDto {
        pub id_code: String,
        pub parcel_id: i64,
        pub sensor_type: String,
        pub unit: Option<String>,
        pub description: String,
        pub threshold_low: f64,
        pub threshold_high: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct SensorUpdateRequestDto {
        pub description: String,
        pub threshold_low: f64,
        pub threshold_high: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct SensorDeleteRequestDto {
        pub id: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ReadingInputDto {
        pub timestamp: Option<DateTime<Utc>>,
        pub value: f64,
    }

    #[derive(Debug, Serialize)]
    pub struct ReadingCreatedDto {
        pub status: String,
        pub data_id: i64,
    }

    #[derive(Debug, Serialize)]
    pub struct ReadingDto {
        pub id: i64,
        pub timestamp: NaiveDateTime,
        pub value: f64,
        pub raw: String,
    }

    impl From<&SensorDataDao> for ReadingDto {
        fn from(dao: &SensorDataDao) -> Self {
            ReadingDto {
                id: dao.id(),
                timestamp: dao.timestamp(),
                value: dao.value(),
                raw: dao.raw().clone(),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct RangeQueryDto {
        pub from: Option<DateTime<Utc>>,
        pub until: Option<DateTime<Utc>>,
        pub limit: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindowQueryDto {
        pub window: Option<String>,
    }

    #[derive(Debug, Serialize)]
    pub struct SensorHistoryDto {
        pub sensor_code: String,
        pub description: String,
        pub unit: String,
        pub parcel_name: String,
        #[serde(flatten)]
        pub history: SensorHistory,
    }
}
