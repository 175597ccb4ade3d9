use std::net::SocketAddr;
use std::path::PathBuf;

/// Process configuration, populated from environment variables (optionally
/// loaded from a `.env` file via `dotenvy` in development). Three scalar
/// fields don't warrant a reflection-based config crate.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub snapshot_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let bind_addr = std::env::var("PLOTTRADER_BIND_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let snapshot_dir = std::env::var("PLOTTRADER_SNAPSHOT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let log_level = std::env::var("PLOTTRADER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self { bind_addr, snapshot_dir, log_level }
    }
}
