use std::sync::Arc;
use warp::Filter;

use super::build_response;
use crate::models::alert::AlertKind;
use crate::monitor::{AckOutcome, ConcurrentMonitor};

pub fn routes(
    monitor: &Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    get_alerts(monitor.clone()).or(acknowledge_alert(monitor.clone()))
}

/// GET /api/alert?kind=HIGH|LOW&history=bool
///
/// Alerts newest first. Acknowledged ones are only included with
/// `history=true`
fn get_alerts(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::get())
        .and(warp::path!("api" / "alert"))
        .and(warp::query::<dto::AlertQueryDto>())
        .and_then(
            |monitor: Arc<ConcurrentMonitor>, query: dto::AlertQueryDto| async move {
                let kind = query.kind.as_deref().and_then(AlertKind::parse);
                let resp = monitor
                    .alerts(kind, query.history.unwrap_or(false))
                    .await
                    .map(|alerts| {
                        alerts
                            .iter()
                            .map(|(dao, sensor_code)| dto::AlertDto::build(dao, sensor_code))
                            .collect::<Vec<_>>()
                    });
                build_response(resp)
            },
        )
        .boxed()
}

/// POST /api/alert/:id/ack
///
/// Acknowledge an alert. Re-acknowledging is a no-op,
/// an unknown id is a 404
fn acknowledge_alert(
    monitor: Arc<ConcurrentMonitor>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || monitor.clone())
        .and(warp::post())
        .and(warp::path!("api" / "alert" / i64 / "ack"))
        .and_then(|monitor: Arc<ConcurrentMonitor>, alert_id: i64| async move {
            let resp = monitor
                .acknowledge_alert(alert_id)
                .await
                .map(|outcome| dto::AckResponseDto {
                    status: "success".to_owned(),
                    message: match outcome {
                        AckOutcome::Acknowledged => "Alert acknowledged".to_owned(),
                        AckOutcome::AlreadyAcknowledged => "Alert already acknowledged".to_owned(),
                    },
                });
            build_response(resp)
        })
        .boxed()
}

pub mod dto {
    use serde::{Deserialize, Serialize};

    use crate::models::alert::{AlertDao, AlertKind};

    #[derive(Debug, Deserialize)]
    pub struct AlertQueryDto {
        pub kind: Option<String>,
        pub history: Option<bool>,
    }

    #[derive(Debug, Serialize)]
    pub struct AlertDto {
        pub id: i64,
        pub sensor_code: String,
        pub kind: AlertKind,
        pub message: String,
        pub timestamp: String,
        pub acknowledged: bool,
    }

    impl AlertDto {
        pub fn build(dao: &AlertDao, sensor_code: &str) -> Self {
            AlertDto {
                id: dao.id(),
                sensor_code: sensor_code.to_owned(),
                kind: dao.kind(),
                message: dao.message().clone(),
                timestamp: dao.timestamp().format("%Y-%m-%d %H:%M").to_string(),
                acknowledged: dao.acknowledged(),
            }
        }
    }

    #[derive(Debug, Serialize)]
    pub struct AckResponseDto {
        pub status: String,
        pub message: String,
    }
}
