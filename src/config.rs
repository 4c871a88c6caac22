//! Client configuration: backend base URL, credential persistence, timeouts.

use std::path::{Path, PathBuf};

use crate::errors::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    /// Base URL of the backend API, e.g. `https://api.example.com/api/`.
    pub base_url: String,
    /// Where to persist the token pair across restarts. In-memory only when
    /// absent.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    pub fn from_values(
        base_url: impl Into<String>,
        credentials_path: Option<PathBuf>,
        timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            credentials_path,
            timeout_secs: timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// # ENV Vars
    /// * `STOREFRONT_API_URL` - backend base URL (required)
    /// * `STOREFRONT_CREDENTIALS_PATH` - token persistence file (optional)
    /// * `STOREFRONT_TIMEOUT_SECS` - request timeout (optional)
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("STOREFRONT_API_URL")
            .map_err(|_| Error::Config("Missing STOREFRONT_API_URL env var".to_string()))?;
        let credentials_path = std::env::var("STOREFRONT_CREDENTIALS_PATH")
            .ok()
            .map(PathBuf::from);
        let timeout_secs = match std::env::var("STOREFRONT_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.parse().map_err(|_| {
                Error::Config(format!("Invalid STOREFRONT_TIMEOUT_SECS '{raw}'"))
            })?),
            Err(_) => None,
        };
        Ok(Self {
            base_url,
            credentials_path,
            timeout_secs: timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Validate and normalize the base URL before any network call. The
    /// scheme defaults to https and a trailing slash is enforced so that
    /// relative endpoint paths join underneath it.
    pub(crate) fn parsed_base_url(&self) -> Result<reqwest::Url, Error> {
        let mut raw = if self.base_url.starts_with("http") {
            self.base_url.clone()
        } else {
            format!("https://{}", self.base_url)
        };
        if !raw.ends_with('/') {
            raw.push('/');
        }
        reqwest::Url::parse(&raw)
            .map_err(|e| Error::Config(format!("Invalid base URL '{raw}': {e}")))
    }
}
