//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `CART_API_URL` - Catalog base URL (default: `http://localhost:3333`)
//! - `CART_API_TOKEN` - Bearer token sent to the catalog
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart (default: `.rocket-cart`)
//! - `CART_STORAGE_KEY` - Storage key for the serialized cart (default: `@RocketShoes:cart`)
//! - `CART_HTTP_TIMEOUT_SECS` - Per-request catalog timeout (default: 10)
//! - `CART_PRODUCT_CACHE_TTL_SECS` - Product cache TTL, 0 disables (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Storage key the cart is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_DIR: &str = ".rocket-cart";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CartConfig {
    /// Catalog base URL; `/products/{id}` and `/stock/{id}` are resolved against it
    pub api_url: Url,
    /// Optional bearer token for the catalog
    pub api_token: Option<SecretString>,
    /// Directory for the file-backed cart storage
    pub storage_dir: PathBuf,
    /// Key the serialized cart is stored under
    pub storage_key: String,
    /// Timeout applied to every catalog request
    pub http_timeout: Duration,
    /// How long fetched products stay cached; zero disables caching
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for CartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("storage_dir", &self.storage_dir)
            .field("storage_key", &self.storage_key)
            .field("http_timeout", &self.http_timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(
            "CART_API_URL",
            &get_env_or_default(&lookup, "CART_API_URL", DEFAULT_API_URL),
        )?;
        let api_token = get_optional_env(&lookup, "CART_API_TOKEN").map(SecretString::from);
        let storage_dir = PathBuf::from(get_env_or_default(
            &lookup,
            "CART_STORAGE_DIR",
            DEFAULT_STORAGE_DIR,
        ));

        let storage_key = get_env_or_default(&lookup, "CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let http_timeout = get_secs(&lookup, "CART_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if http_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_HTTP_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let product_cache_ttl = get_secs(
            &lookup,
            "CART_PRODUCT_CACHE_TTL_SECS",
            DEFAULT_PRODUCT_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            api_url,
            api_token,
            storage_dir,
            storage_key,
            http_timeout,
            product_cache_ttl,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get a whole number of seconds as a `Duration`.
fn get_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    get_optional_env(lookup, key).map_or(Ok(Duration::from_secs(default)), |raw| {
        raw.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse the catalog base URL, requiring an http(s) scheme.
///
/// A trailing slash is added so relative joins keep any path prefix.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CartConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:3333/");
        assert!(config.api_token.is_none());
        assert_eq!(config.storage_dir, PathBuf::from(".rocket-cart"));
        assert_eq!(config.storage_key, "@RocketShoes:cart");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.product_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_lookup(lookup_from(&[
            ("CART_API_URL", "https://api.example.com/v1"),
            ("CART_API_TOKEN", "tok_123"),
            ("CART_STORAGE_DIR", "/tmp/cart"),
            ("CART_STORAGE_KEY", "cart"),
            ("CART_HTTP_TIMEOUT_SECS", "3"),
            ("CART_PRODUCT_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.api_url.as_str(), "https://api.example.com/v1/");
        assert_eq!(
            config.api_token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("tok_123".to_string())
        );
        assert_eq!(config.storage_key, "cart");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert!(config.product_cache_ttl.is_zero());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config =
            CartConfig::from_lookup(lookup_from(&[("CART_API_TOKEN", "  "), ("CART_API_URL", "")]))
                .unwrap();
        assert!(config.api_token.is_none());
        assert_eq!(config.api_url.as_str(), "http://localhost:3333/");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = CartConfig::from_lookup(lookup_from(&[("CART_API_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "CART_API_URL"));

        let err = CartConfig::from_lookup(lookup_from(&[("CART_API_URL", "ftp://example.com")]))
            .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let err = CartConfig::from_lookup(lookup_from(&[("CART_HTTP_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = CartConfig::from_lookup(lookup_from(&[("CART_HTTP_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config =
            CartConfig::from_lookup(lookup_from(&[("CART_API_TOKEN", "super_secret_token")]))
                .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
        assert!(debug_output.contains("@RocketShoes:cart"));
    }
}
