use {
    crate::{
        adapters::ipapi_client::DEFAULT_ENDPOINT,
        domain::error::AuditError,
        services::{poller::RetryPolicy, worker::WorkerConfig},
    },
    std::{env, path::PathBuf, str::FromStr, time::Duration},
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub geo_endpoint: String,
    pub geo_timeout: Duration,
    pub enrich_retry: RetryPolicy,
    pub workers: WorkerConfig,
    pub queue_capacity: usize,
    pub revocation_sweep: Duration,
    pub diagnostic_log_path: Option<PathBuf>,
}

impl Config {
    /// Read configuration from the process environment (after `.env`, if any).
    pub fn from_env() -> Result<Self, AuditError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, AuditError> {
        let database_url =
            get("DATABASE_URL").ok_or_else(|| AuditError::Config("DATABASE_URL must be set".into()))?;

        Ok(Self {
            database_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            geo_endpoint: get("GEO_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.into()),
            geo_timeout: Duration::from_secs(parse(&get, "GEO_TIMEOUT_SECS", 5)?),
            enrich_retry: RetryPolicy {
                step: Duration::from_secs(parse(&get, "ENRICH_STEP_SECS", 2)?),
                max_tries: Some(parse(&get, "ENRICH_MAX_TRIES", 2)?),
            },
            workers: WorkerConfig {
                workers_per_queue: parse(&get, "WORKERS_PER_QUEUE", 2)?,
                max_attempts: parse(&get, "TASK_MAX_ATTEMPTS", 5)?,
            },
            queue_capacity: parse(&get, "QUEUE_CAPACITY", 1024)?,
            revocation_sweep: Duration::from_secs(parse(&get, "REVOCATION_SWEEP_SECS", 60)?),
            diagnostic_log_path: get("DIAGNOSTIC_LOG_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AuditError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AuditError::Config(format!("{key} has an invalid value: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::collections::HashMap};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3000");
        assert_eq!(cfg.geo_endpoint, "https://ipapi.co");
        assert_eq!(cfg.enrich_retry, RetryPolicy::default());
        assert_eq!(cfg.workers.max_attempts, 5);
        assert!(cfg.diagnostic_log_path.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }

    #[test]
    fn invalid_number_is_an_error() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("ENRICH_MAX_TRIES", "two"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ENRICH_MAX_TRIES"));
    }
}
