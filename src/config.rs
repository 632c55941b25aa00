use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for `CANCELLATION_LEAD_HOURS`, one year.
pub const MAX_LEAD_HOURS: i64 = 24 * 365;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub inventory_service_url: String,
    pub inventory_timeout: Duration,
    pub inventory_max_concurrency: usize,
    pub cancellation_lead_hours: i64,
    pub pnr_max_attempts: u32,
    pub forward_idempotency_key: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "flightbook.db".to_string(),
            inventory_service_url: "http://localhost:8081".to_string(),
            inventory_timeout: Duration::from_millis(5000),
            inventory_max_concurrency: 16,
            cancellation_lead_hours: 24,
            pnr_max_attempts: 5,
            forward_idempotency_key: false,
        }
    }
}

impl AppConfig {
    /// Reads the process environment once. Unset or unparsable values fall back
    /// to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            inventory_service_url: lookup("INVENTORY_SERVICE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.inventory_service_url),
            inventory_timeout: parse_var(&lookup, "INVENTORY_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.inventory_timeout),
            inventory_max_concurrency: parse_var(&lookup, "INVENTORY_MAX_CONCURRENCY")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.inventory_max_concurrency),
            cancellation_lead_hours: parse_var(&lookup, "CANCELLATION_LEAD_HOURS")
                .filter(|h: &i64| (0..=MAX_LEAD_HOURS).contains(h))
                .unwrap_or(defaults.cancellation_lead_hours),
            pnr_max_attempts: parse_var(&lookup, "PNR_MAX_ATTEMPTS")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(defaults.pnr_max_attempts),
            forward_idempotency_key: parse_var(&lookup, "FORWARD_IDEMPOTENCY_KEY")
                .unwrap_or(defaults.forward_idempotency_key),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
