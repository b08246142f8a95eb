use std::sync::Arc;
use warp::Filter;

use super::build_response;
use crate::monitor::ConcurrentMonitor;

pub fn routes(
    monitor: &Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    get_parcels(monitor.clone())
        .or(create_parcel(monitor.clone()))
        .or(delete_parcel(monitor.clone()))
        .or(get_parcel_sensors(monitor.clone()))
}

/// GET /api/parcel
///
/// List all registered parcels
fn get_parcels(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::get())
        .and(warp::path!("api" / "parcel"))
        .and_then(|monitor: Arc<ConcurrentMonitor>| async move {
            let resp = monitor.parcels().await.map(|parcels| {
                parcels
                    .iter()
                    .map(dto::ParcelDto::from)
                    .collect::<Vec<_>>()
            });
            build_response(resp)
        })
        .boxed()
}

/// POST /api/parcel
///
/// Register a new parcel
fn create_parcel(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::post())
        .and(warp::path!("api" / "parcel"))
        .and(warp::body::json())
        .and_then(
            |monitor: Arc<ConcurrentMonitor>, body: dto::ParcelCreateRequestDto| async move {
                let resp = monitor
                    .register_parcel(&body.name, &body.location, body.area, body.owner_id)
                    .await
                    .map(|dao| dto::ParcelDto::from(&dao));
                build_response(resp)
            },
        )
        .boxed()
}

/// DELETE /api/parcel
///
/// Remove a parcel with all its sensors, readings and alerts
fn delete_parcel(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::delete())
        .and(warp::path!("api" / "parcel"))
        .and(warp::body::json())
        .and_then(
            |monitor: Arc<ConcurrentMonitor>, body: dto::ParcelDeleteRequestDto| async move {
                let resp = monitor.remove_parcel(body.id).await;
                build_response(resp)
            },
        )
        .boxed()
}

/// GET /api/parcel/:id/sensor
///
/// List the sensors attached to a parcel
fn get_parcel_sensors(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::get())
        .and(warp::path!("api" / "parcel" / i64 / "sensor"))
        .and_then(|monitor: Arc<ConcurrentMonitor>, parcel_id: i64| async move {
            let resp = monitor.parcel_sensors(parcel_id).await.map(|sensors| {
                sensors
                    .iter()
                    .map(super::sensor_routes::dto::SensorDto::from)
                    .collect::<Vec<_>>()
            });
            build_response(resp)
        })
        .boxed()
}

pub mod dto {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Serialize};

    use crate::models::parcel::ParcelDao;

    #[derive(Debug, Serialize)]
    pub struct ParcelDto {
        pub id: i64,
        pub name: String,
        pub location: String,
        pub area: f64,
        pub owner_id: i64,
        pub created_at: NaiveDateTime,
    }

    impl From<&ParcelDao> for ParcelDto {
        fn from(dao: &ParcelDao) -> Self {
            ParcelDto {
                id: dao.id(),
                name: dao.name().clone(),
                location: dao.location().clone(),
                area: dao.area(),
                owner_id: dao.owner_id(),
                created_at: dao.created_at(),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct ParcelCreateRequestDto {
        pub name: String,
        pub location: String,
        pub area: f64,
        pub owner_id: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ParcelDeleteRequestDto {
        pub id: i64,
    }
}
