use std::time::Duration;

use envconfig::Envconfig;
use url::Url;

#[derive(Debug, Envconfig)]
pub struct CliConfig {
    #[envconfig(from = "BEACON_HTTP_URL", default = "http://localhost:3500")]
    pub beacon_http_url: Url,
    /// Deadline for a whole command, also applied to each HTTP request.
    #[envconfig(from = "REQUEST_TIMEOUT_SECS", default = "120")]
    pub request_timeout_secs: u64,
    #[envconfig(from = "BLOCK_FETCH_CONCURRENCY", default = "8")]
    pub block_fetch_concurrency: usize,
}

impl CliConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
