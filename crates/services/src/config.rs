use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the remote CRUD interface lives and how long a request may take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetConfig {
    base_url: String,
    timeout: Duration,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SheetConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL does not parse, is not http(s),
    /// or the timeout is zero.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
            raw: base_url.to_owned(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.to_owned()));
        }
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("0".into()));
        }
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            timeout,
        })
    }

    /// Reads `SHEET_API_URL` and `SHEET_API_TIMEOUT_SECS`, falling back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("SHEET_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let timeout = match env::var("SHEET_API_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout_secs(&raw)?,
            Err(_) => DEFAULT_TIMEOUT,
        };
        Self::new(&base_url, timeout)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a path below the base, e.g. `endpoint("sheet")`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// # Errors
///
/// Returns `ConfigError::InvalidTimeout` unless `raw` is a positive integer.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let config = SheetConfig::new("http://localhost:5000/api/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(config.endpoint("sheet"), "http://localhost:5000/api/sheet");
        assert_eq!(config.endpoint("/topic"), "http://localhost:5000/api/topic");
    }

    #[test]
    fn default_matches_constants() {
        let config = SheetConfig::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            SheetConfig::new("not a url", DEFAULT_TIMEOUT),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            SheetConfig::new("ftp://example.com", DEFAULT_TIMEOUT),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn timeout_must_be_positive_seconds() {
        assert_eq!(parse_timeout_secs("7").unwrap(), Duration::from_secs(7));
        assert!(parse_timeout_secs("0").is_err());
        assert!(parse_timeout_secs("soon").is_err());
        assert!(SheetConfig::new(DEFAULT_BASE_URL, Duration::ZERO).is_err());
    }
}
