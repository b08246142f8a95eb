mod config;
mod error;
mod logging;
mod models;
mod monitor;
mod rest;

use tracing::info;

#[tokio::main]
pub async fn main() {
    logging::init();

    let db_conn = models::establish_db_connection()
        .await
        .expect("Failed connecting database");
    models::init_schema(&db_conn)
        .await
        .expect("Failed initializing schema");

    let monitor = monitor::ConcurrentMonitor::new(db_conn);
    info!("Starting monitor with {} ms tick", config::CONFIG.poll_interval_ms());

    let poll_loop = monitor.clone().dispatch_poll_loop();
    let server = rest::dispatch_server(monitor.clone());
    let _ = tokio::join!(poll_loop, server);
}
