use thiserror::Error;

/// Gateway-wide error model. Upstream HTTP error statuses are not errors here;
/// only failures that prevent handing back a decoded body are.
#[derive(Debug, Error)]
pub enum KittError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status} with a body that is not valid JSON: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

impl KittError {
    pub fn missing(field: &str) -> Self {
        KittError::InvalidArgument(format!("missing required field: {field}"))
    }
}

impl From<KittError> for rmcp::ErrorData {
    fn from(e: KittError) -> Self {
        match e {
            KittError::InvalidArgument(msg) => rmcp::ErrorData::invalid_params(msg, None),
            other => rmcp::ErrorData::internal_error(other.to_string(), None),
        }
    }
}
