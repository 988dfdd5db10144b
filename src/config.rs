use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254/latest/meta-data/";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the instance metadata service, with trailing slash.
    pub metadata_url: String,
    /// Upper bound for each individual metadata field fetch.
    pub metadata_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let timeout_secs: u64 = std::env::var("METADATA_TIMEOUT_SECS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .context("METADATA_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "80".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            metadata_url: normalize_base_url(
                std::env::var("METADATA_URL").unwrap_or_else(|_| DEFAULT_METADATA_URL.to_string()),
            ),
            metadata_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            metadata_timeout: Duration::from_secs(2),
        }
    }
}

/// Field names are appended to the base URL, so it must end in `/`.
fn normalize_base_url(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
