use std::sync::Arc;

use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::Filter;

use crate::config::CONFIG;
use crate::error::ObserverError;
use crate::monitor::ConcurrentMonitor;

mod alert_routes;
mod dashboard_routes;
mod parcel_routes;
mod sensor_routes;


fn build_response<T: serde::Serialize>(
    resp: Result<T, ObserverError>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, warp::Rejection> {
    match resp {
        Ok(data) => Ok(warp::reply::with_status(
            warp::reply::json(&data),
            StatusCode::OK,
        )),
        Err(ObserverError::User(err)) => {
            warn!("{}", err);
            Ok(warp::reply::with_status(
                warp::reply::json(&dto::ErrorResponseDto {
                    error: format!("{}", err),
                }),
                StatusCode::BAD_REQUEST,
            ))
        }
        Err(ObserverError::NotFound(err)) => {
            warn!("{}", err);
            Ok(warp::reply::with_status(
                warp::reply::json(&dto::ErrorResponseDto {
                    error: format!("{}", err),
                }),
                StatusCode::NOT_FOUND,
            ))
        }
        Err(ObserverError::Internal(err)) => {
            error!("{}", err);
            Ok(warp::reply::with_status(
                warp::reply::json(&dto::ErrorResponseDto {
                    error: "Internal error".to_owned(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

pub fn routes(
    monitor: &Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    parcel_routes::routes(monitor)
        .or(sensor_routes::routes(monitor))
        .or(alert_routes::routes(monitor))
        .or(dashboard_routes::routes(monitor))
}

pub async fn dispatch_server(monitor: Arc<ConcurrentMonitor>) {
    let port: u16 = CONFIG
        .server_port()
        .parse()
        .expect("SERVER_PORT must be a port number");

    info!("Starting webserver at 0.0.0.0:{}", port);
    warp::serve(routes(&monitor)).run(([0, 0, 0, 0], port)).await;
}

mod dto {
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    pub struct ErrorResponseDto {
        pub error: String,
    }
}
