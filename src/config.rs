use std::env;
use std::time::Duration;

pub const DEFAULT_KALEYRA_ENDPOINT: &str = "https://api-alerts.kaleyra.com/v4/";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub api_token: String,
    /// Suppresses real sends when true.
    pub debug: bool,
    pub kaleyra: KaleyraConfig,
    pub queue: QueueConfig,
}

#[derive(Clone, Debug)]
pub struct KaleyraConfig {
    pub api_key: Option<String>,
    pub sender_id: Option<String>,
    pub endpoint: String,
    pub method: String,
}

#[derive(Clone, Debug)]
pub struct QueueConfig {
    pub worker_concurrency: usize,
    pub capacity: usize,
    pub result_expires: Duration,
    pub sweep_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_or("PORT", 3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "smsgate.db".to_string()),
            api_token: env::var("API_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            debug: parse_debug_flag(env::var("DEBUG").ok().as_deref()),
            kaleyra: KaleyraConfig::from_env(),
            queue: QueueConfig::from_env(),
        }
    }
}

impl KaleyraConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_var("KALEYRA_API_KEY"),
            sender_id: non_empty_var("KALEYRA_SENDER_ID"),
            endpoint: env::var("KALEYRA_API_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_KALEYRA_ENDPOINT.to_string()),
            method: "sms".to_string(),
        }
    }
}

impl Default for KaleyraConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            sender_id: None,
            endpoint: DEFAULT_KALEYRA_ENDPOINT.to_string(),
            method: "sms".to_string(),
        }
    }
}

impl QueueConfig {
    pub fn from_env() -> Self {
        Self {
            worker_concurrency: parse_or("WORKER_CONCURRENCY", 4usize).max(1),
            capacity: parse_or("QUEUE_CAPACITY", 1024usize).max(1),
            result_expires: Duration::from_secs(parse_or("TASK_RESULT_EXPIRES", 3600)),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            worker_concurrency: 4,
            capacity: 1024,
            result_expires: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Unset means debug. When set, only the literal `true` keeps debug on.
pub fn parse_debug_flag(value: Option<&str>) -> bool {
    value.map(|v| v == "true").unwrap_or(true)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_defaults_to_suppressed() {
        assert!(parse_debug_flag(None));
    }

    #[test]
    fn debug_only_literal_true_suppresses() {
        assert!(parse_debug_flag(Some("true")));
        assert!(!parse_debug_flag(Some("false")));
        assert!(!parse_debug_flag(Some("TRUE")));
        assert!(!parse_debug_flag(Some("")));
        assert!(!parse_debug_flag(Some("1")));
    }

    #[test]
    fn kaleyra_defaults() {
        let config = KaleyraConfig::default();
        assert_eq!(config.endpoint, DEFAULT_KALEYRA_ENDPOINT);
        assert_eq!(config.method, "sms");
        assert!(config.api_key.is_none());
        assert!(config.sender_id.is_none());
    }
}
