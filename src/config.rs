use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::env;

pub struct Config {
    inner: RwLock<InnerConfig>,
}

struct InnerConfig {
    database_url: String,
    server_port: String,
    poll_interval_ms: u64,
}

impl Config {
    pub fn database_url(&self) -> String {
        let inner = self.inner.read();
        inner.database_url.clone()
    }

    pub fn server_port(&self) -> String {
        let inner = self.inner.read();
        inner.server_port.clone()
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.inner.read().poll_interval_ms
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv::dotenv().ok();

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://agrimon.db?mode=rwc".to_owned());
    let server_port = env::var("SERVER_PORT").unwrap_or_else(|_| "8000".to_owned());
    let poll_interval_ms = env::var("POLL_INTERVAL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);

    Config {
        inner: RwLock::new(InnerConfig {
            database_url,
            server_port,
            poll_interval_ms,
        }),
    }
});
