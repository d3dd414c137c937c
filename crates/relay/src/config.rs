// Relay server configuration.
//
// Centralizes environment variable parsing with defaults for local
// development.

use std::net::SocketAddr;
use std::time::Duration;

use roomwatch_common::presence::DEFAULT_PRESENCE_TTL;

/// Core relay server configuration.
///
/// Constructed via [`RelayConfig::from_env`] which reads environment
/// variables and falls back to sensible development defaults.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Listen address (host:port).
    pub listen_addr: SocketAddr,
    /// TTL applied to presence queries that do not pass `ttl_ms`.
    pub presence_ttl: Duration,
    /// Period of the background presence sweep. `None` keeps eviction lazy-only.
    pub sweep_interval: Option<Duration>,
    /// Comma-separated CORS origins (or `"*"` for any).
    pub cors_origins: Option<String>,
    /// Log filter directive (e.g. `info`, `roomwatch_relay=debug`).
    pub log_filter: String,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl RelayConfig {
    /// Parse configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `ROOMWATCH_RELAY_HOST` | `0.0.0.0` |
    /// | `ROOMWATCH_RELAY_PORT` | `8080` |
    /// | `ROOMWATCH_RELAY_PRESENCE_TTL_MS` | `45000` |
    /// | `ROOMWATCH_RELAY_SWEEP_INTERVAL_MS` | *(none — lazy eviction only)* |
    /// | `ROOMWATCH_RELAY_CORS_ORIGINS` | *(none — cors.rs uses dev defaults)* |
    /// | `ROOMWATCH_RELAY_LOG_FILTER` | `info` |
    /// | `ROOMWATCH_RELAY_LOG_FORMAT` | `text` (`json` for JSON lines) |
    pub fn from_env() -> Self {
        Self::from_env_fn(|key| std::env::var(key))
    }

    /// Testable constructor that accepts an environment lookup function.
    fn from_env_fn<F>(env: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let host = env("ROOMWATCH_RELAY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env("ROOMWATCH_RELAY_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let listen_addr = format!("{host}:{port}")
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));

        let presence_ttl = parse_millis(&env, "ROOMWATCH_RELAY_PRESENCE_TTL_MS")
            .unwrap_or(DEFAULT_PRESENCE_TTL);
        let sweep_interval = parse_millis(&env, "ROOMWATCH_RELAY_SWEEP_INTERVAL_MS")
            .filter(|interval| !interval.is_zero());

        let cors_origins = env("ROOMWATCH_RELAY_CORS_ORIGINS").ok();

        let log_filter = env("ROOMWATCH_RELAY_LOG_FILTER").unwrap_or_else(|_| "info".into());
        let log_json = env("ROOMWATCH_RELAY_LOG_FORMAT")
            .map(|format| format.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self { listen_addr, presence_ttl, sweep_interval, cors_origins, log_filter, log_json }
    }
}

fn parse_millis<F>(env: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    env(key).ok().and_then(|v| v.trim().parse::<u64>().ok()).map(Duration::from_millis)
}
