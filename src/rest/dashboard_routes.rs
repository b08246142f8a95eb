use std::sync::Arc;
use warp::Filter;

use super::build_response;
use crate::monitor::ConcurrentMonitor;

pub fn routes(
    monitor: &Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    dashboard(monitor.clone()).or(health(monitor.clone()))
}

/// GET /api/dashboard
///
/// Runs one evaluation cycle and returns the dashboard summary.
/// This is the same idempotent tick the background scheduler runs
fn dashboard(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::get())
        .and(warp::path!("api" / "dashboard"))
        .and_then(|monitor: Arc<ConcurrentMonitor>| async move {
            let resp = monitor.refresh_dashboard().await;
            build_response(resp)
        })
        .boxed()
}

/// GET /api/health
fn health(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::get())
        .and(warp::path!("api" / "health"))
        .and_then(|monitor: Arc<ConcurrentMonitor>| async move {
            let ret = dto::HealthyDto {
                healthy: true,
                database_state: monitor.check_db().await,
                sensor_count: monitor.sensor_count().await,
            };
            build_response(Ok(ret))
        })
        .boxed()
}

mod dto {
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    pub struct HealthyDto {
        pub healthy: bool,
        pub database_state: String,
        pub sensor_count: usize,
    }
}
