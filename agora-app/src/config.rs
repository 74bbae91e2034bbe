use crate::domain::DEFAULT_PAGE_SIZE;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AgoraConfig {
    pub database_url: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub storage_dir: String,
    pub storage_public_base: String,
    pub feed_page_size: u64,
}

impl AgoraConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let google_redirect_uri = required("GOOGLE_REDIRECT_URI")?;
        url::Url::parse(&google_redirect_uri).map_err(|e| ConfigError::Invalid {
            name: "GOOGLE_REDIRECT_URI",
            reason: e.to_string(),
        })?;

        let feed_page_size = match lookup("FEED_PAGE_SIZE") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "FEED_PAGE_SIZE",
                        reason: format!("expected a positive integer, got {raw:?}"),
                    })
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            google_redirect_uri,
            storage_dir: lookup("STORAGE_DIR").unwrap_or_else(|| "./storage".to_string()),
            storage_public_base: lookup("STORAGE_PUBLIC_BASE")
                .unwrap_or_else(|| "/storage".to_string()),
            feed_page_size,
        })
    }
}
