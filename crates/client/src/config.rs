//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SOLAR_MARKET_API_URL` - Backend base URL (default: `https://api.solarmarket.app`)
//! - `SOLAR_MARKET_STOREFRONT_URL` - Origin the `accessToken` cookie is scoped to
//!   (default: `http://localhost:3000`)
//! - `SOLAR_MARKET_CART_ADD_ENDPOINT` - Add-to-cart path (default: `/cart/add`)
//! - `SOLAR_MARKET_LEGACY_CART_PATHS` - Try the legacy add-to-cart paths
//!   when the configured one fails (default: `true`)
//! - `SOLAR_MARKET_PRODUCT_CACHE_CAPACITY` - Max cached products (default: 1000)
//! - `SOLAR_MARKET_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `SOLAR_MARKET_STORAGE_PATH` - JSON file for persisted session state
//!   (default: in-memory only)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Hosted backend used when no URL is configured.
pub const DEFAULT_API_URL: &str = "https://api.solarmarket.app";

/// Storefront origin used when none is configured.
pub const DEFAULT_STOREFRONT_URL: &str = "http://localhost:3000";

/// Primary add-to-cart endpoint.
pub const DEFAULT_CART_ADD_ENDPOINT: &str = "/cart/add";

/// Paths tried after the configured add-to-cart endpoint fails.
///
/// Older backend deployments mounted the cart routes under `/api` or
/// accepted `POST /cart` directly. Remove once every deployment serves
/// `/cart/add`.
pub const LEGACY_CART_ADD_PATHS: &[&str] = &["/api/cart/add", "/cart", "/api/cart"];

const DEFAULT_PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid URL {0}: {1}")]
    InvalidUrl(String, url::ParseError),
    #[error("URL must use http or https: {0}")]
    UnsupportedScheme(String),
}

/// Marketplace client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash
    pub api_url: String,
    /// Origin the mirrored `accessToken` cookie belongs to
    pub storefront_url: Url,
    /// Path used for add-to-cart
    pub cart_add_endpoint: String,
    /// Whether [`LEGACY_CART_ADD_PATHS`] are tried after the primary path fails
    pub legacy_cart_paths: bool,
    /// Max entries in the product cache
    pub product_cache_capacity: u64,
    /// Optional per-request timeout; requests never time out when `None`
    pub request_timeout: Option<Duration>,
    /// Where persisted session state lives, if on disk
    pub storage_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Build a configuration for the given backend with every other setting
    /// at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_base_url(api_url)?,
            storefront_url: parse_http_url(DEFAULT_STOREFRONT_URL)?,
            cart_add_endpoint: DEFAULT_CART_ADD_ENDPOINT.to_string(),
            legacy_cart_paths: true,
            product_cache_capacity: DEFAULT_PRODUCT_CACHE_CAPACITY,
            request_timeout: None,
            storage_path: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut config = Self::new(&get_env_or_default("SOLAR_MARKET_API_URL", DEFAULT_API_URL))?;

        config.storefront_url = parse_http_url(&get_env_or_default(
            "SOLAR_MARKET_STOREFRONT_URL",
            DEFAULT_STOREFRONT_URL,
        ))?;
        config.cart_add_endpoint = normalize_path(&get_env_or_default(
            "SOLAR_MARKET_CART_ADD_ENDPOINT",
            DEFAULT_CART_ADD_ENDPOINT,
        ));

        if let Some(value) = get_optional_env("SOLAR_MARKET_LEGACY_CART_PATHS") {
            config.legacy_cart_paths = parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "SOLAR_MARKET_LEGACY_CART_PATHS".to_string(),
                    format!("expected true/false, got '{value}'"),
                )
            })?;
        }

        if let Some(value) = get_optional_env("SOLAR_MARKET_PRODUCT_CACHE_CAPACITY") {
            config.product_cache_capacity = value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "SOLAR_MARKET_PRODUCT_CACHE_CAPACITY".to_string(),
                    e.to_string(),
                )
            })?;
        }

        if let Some(value) = get_optional_env("SOLAR_MARKET_REQUEST_TIMEOUT_SECS") {
            let secs = value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "SOLAR_MARKET_REQUEST_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        config.storage_path = get_optional_env("SOLAR_MARKET_STORAGE_PATH").map(PathBuf::from);

        Ok(config)
    }

    /// Ordered add-to-cart candidates: the configured endpoint first, then the
    /// legacy paths when enabled. Duplicates are skipped.
    #[must_use]
    pub fn cart_add_candidates(&self) -> Vec<&str> {
        let mut candidates = vec![self.cart_add_endpoint.as_str()];
        if self.legacy_cart_paths {
            for &path in LEGACY_CART_ADD_PATHS {
                if !candidates.contains(&path) {
                    candidates.push(path);
                }
            }
        }
        candidates
    }

    /// Absolute URL for a backend path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, normalize_path(path))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(raw.to_string()));
    }
    Ok(url)
}

/// Validate a base URL and strip any trailing slash so paths can be appended.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = parse_http_url(raw)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        let config = ClientConfig::new("https://api.example.com/v1/").unwrap();
        assert_eq!(config.api_url, "https://api.example.com/v1");
        assert_eq!(config.endpoint("/products"), "https://api.example.com/v1/products");
        assert_eq!(config.endpoint("cart"), "https://api.example.com/v1/cart");
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ConfigError::InvalidUrl(_, _))
        ));
        assert!(matches!(
            ClientConfig::new("ftp://files.example.com"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new(DEFAULT_API_URL).unwrap();
        assert_eq!(config.cart_add_endpoint, "/cart/add");
        assert!(config.legacy_cart_paths);
        assert_eq!(config.product_cache_capacity, 1000);
        assert!(config.request_timeout.is_none());
        assert!(config.storage_path.is_none());
    }

    #[test]
    fn test_cart_add_candidates_with_legacy_paths() {
        let config = ClientConfig::new(DEFAULT_API_URL).unwrap();
        assert_eq!(
            config.cart_add_candidates(),
            vec!["/cart/add", "/api/cart/add", "/cart", "/api/cart"]
        );
    }

    #[test]
    fn test_cart_add_candidates_without_legacy_paths() {
        let mut config = ClientConfig::new(DEFAULT_API_URL).unwrap();
        config.legacy_cart_paths = false;
        assert_eq!(config.cart_add_candidates(), vec!["/cart/add"]);
    }

    #[test]
    fn test_cart_add_candidates_skip_duplicates() {
        let mut config = ClientConfig::new(DEFAULT_API_URL).unwrap();
        config.cart_add_endpoint = "/cart".to_string();
        assert_eq!(
            config.cart_add_candidates(),
            vec!["/cart", "/api/cart/add", "/api/cart"]
        );
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
