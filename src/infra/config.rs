use serde::Deserialize;

use crate::core::KittError;

pub const DEFAULT_BASE_URL: &str = "https://api.trykitt.ai";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct Config {
    pub mode: String, // "stdio" or "server"
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let mode = std::env::var("MODE").unwrap_or_else(|_| "stdio".into());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);

        Self { mode, port }
    }
}

/// Upstream settings. Built once at startup and handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KittConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Disables TLS certificate verification. Only for debugging proxies.
    pub insecure_tls: bool,
    pub timeout_secs: u64,
}

impl Default for KittConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            insecure_tls: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    kitt: FileKitt,
}

#[derive(Deserialize, Default)]
struct FileKitt {
    base_url: Option<String>,
    api_key: Option<String>,
    insecure_tls: Option<bool>,
    timeout_secs: Option<u64>,
}

impl KittConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    /// Defaults, then the TOML file named by `KITT_CONFIG` (if any), then env.
    pub fn from_env_and_toml() -> Result<Self, KittError> {
        let mut cfg = Self::default();
        if let Ok(path) = std::env::var("KITT_CONFIG") {
            if !path.trim().is_empty() {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| KittError::Config(format!("reading {path}: {e}")))?;
                cfg.apply_toml(&raw)?;
            }
        }
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_toml(&mut self, raw: &str) -> Result<(), KittError> {
        let file: FileConfig =
            toml::from_str(raw).map_err(|e| KittError::Config(format!("invalid TOML: {e}")))?;
        let k = file.kitt;
        if let Some(base) = k.base_url {
            self.base_url = base;
        }
        if k.api_key.is_some() {
            self.api_key = k.api_key;
        }
        if let Some(insecure) = k.insecure_tls {
            self.insecure_tls = insecure;
        }
        if let Some(secs) = k.timeout_secs {
            self.timeout_secs = secs;
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(base) = std::env::var("KITT_BASE_URL") {
            if !base.trim().is_empty() {
                self.base_url = base;
            }
        }
        if let Ok(key) = std::env::var("TRYKITT_API_KEY") {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(v) = std::env::var("KITT_INSECURE_TLS") {
            self.insecure_tls = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(secs) = std::env::var("KITT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.timeout_secs = secs;
        }
    }

    pub fn validate(&self) -> Result<(), KittError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(KittError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(KittError::Config("timeout_secs cannot be 0".into()));
        }
        Ok(())
    }
}
