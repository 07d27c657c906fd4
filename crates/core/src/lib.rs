pub mod domain;
pub mod error;
pub mod exchange;
pub mod impurity;
pub mod mapping;
pub mod pipeline;
pub mod retry;
pub mod screening;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub mod config {
    use crate::retry::RetryPolicy;
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_OPENFIGI_BASE_URL: &str = "https://api.openfigi.com/v3";
    const DEFAULT_ZOYA_URL: &str = "https://api.zoya.finance/graphql";
    const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_MAPPING_RETRY_DELAY_MS: u64 = 5_000;
    const DEFAULT_SCREENING_RETRY_DELAY_MS: u64 = 1_000;
    const DEFAULT_SCREENING_MAX_ATTEMPTS: u32 = 3;
    const DEFAULT_PROGRESS_EVERY: usize = 25;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub openfigi_base_url: String,
        pub openfigi_api_key: Option<String>,
        pub zoya_url: String,
        pub zoya_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub http_timeout: Duration,
        pub mapping_retry_delay: Duration,
        pub mapping_max_attempts: Option<u32>,
        pub mapping_max_elapsed: Option<Duration>,
        pub screening_retry_delay: Duration,
        pub screening_max_attempts: u32,
        pub progress_every: usize,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                openfigi_base_url: non_empty_var("OPENFIGI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENFIGI_BASE_URL.to_string()),
                openfigi_api_key: non_empty_var("OPENFIGI_API_KEY"),
                zoya_url: non_empty_var("ZOYA_URL").unwrap_or_else(|| DEFAULT_ZOYA_URL.to_string()),
                zoya_api_key: non_empty_var("ZOYA_API_KEY"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                http_timeout: Duration::from_secs(
                    parse_var("HTTP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
                ),
                mapping_retry_delay: Duration::from_millis(
                    parse_var("MAPPING_RETRY_DELAY_MS")?.unwrap_or(DEFAULT_MAPPING_RETRY_DELAY_MS),
                ),
                mapping_max_attempts: parse_var("MAPPING_MAX_ATTEMPTS")?,
                mapping_max_elapsed: parse_var::<u64>("MAPPING_MAX_ELAPSED_SECS")?
                    .map(Duration::from_secs),
                screening_retry_delay: Duration::from_millis(
                    parse_var("SCREENING_RETRY_DELAY_MS")?
                        .unwrap_or(DEFAULT_SCREENING_RETRY_DELAY_MS),
                ),
                screening_max_attempts: parse_var("SCREENING_MAX_ATTEMPTS")?
                    .unwrap_or(DEFAULT_SCREENING_MAX_ATTEMPTS),
                progress_every: parse_var("PROGRESS_EVERY")?.unwrap_or(DEFAULT_PROGRESS_EVERY),
            })
        }

        pub fn require_zoya_api_key(&self) -> anyhow::Result<&str> {
            self.zoya_api_key
                .as_deref()
                .context("ZOYA_API_KEY is required")
        }

        /// Mapping failures are retried until the service comes back unless an
        /// attempt or elapsed-time budget is configured.
        pub fn mapping_retry(&self) -> RetryPolicy {
            RetryPolicy {
                max_attempts: self.mapping_max_attempts,
                max_elapsed: self.mapping_max_elapsed,
                ..RetryPolicy::unbounded(self.mapping_retry_delay)
            }
        }

        pub fn screening_retry(&self) -> RetryPolicy {
            RetryPolicy::bounded(self.screening_max_attempts, self.screening_retry_delay)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        non_empty_var(key)
            .map(|s| s.parse::<T>().with_context(|| format!("{key} is not valid: {s}")))
            .transpose()
    }
}
