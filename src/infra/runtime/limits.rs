use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::core::KittError;
use crate::infra::config::KittConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the shared reqwest client: timeouts, optional `x-api-key` default header,
/// and TLS verification unless explicitly disabled.
pub fn make_http_client(cfg: &KittConfig) -> Result<reqwest::Client, KittError> {
    let mut headers = HeaderMap::new();
    if let Some(key) = cfg.api_key.as_deref() {
        let mut value = HeaderValue::from_str(key)
            .map_err(|_| KittError::Config("api key is not a valid header value".into()))?;
        value.set_sensitive(true);
        headers.insert("x-api-key", value);
    }

    if cfg.insecure_tls {
        tracing::warn!(
            base_url = %cfg.base_url,
            "TLS certificate verification DISABLED; traffic to upstream can be intercepted"
        );
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .danger_accept_invalid_certs(cfg.insecure_tls)
        .build()
        .map_err(|e| KittError::Config(format!("building http client: {e}")))
}
