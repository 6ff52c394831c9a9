//! Webhook service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ADMIN_API_TOKEN` - Admin API access token (HIGH PRIVILEGE)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `SHOPIFY_ADMIN_ENDPOINT` - Full GraphQL URL, overrides store + version
//! - `SHOPIFY_TIMEOUT_SECS` - Per-call timeout (default: 30)
//! - `SHOPIFY_WEBHOOK_SECRET` - Enables `X-Shopify-Hmac-Sha256` verification
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (order edits)
//! - `SIZE_MARKER_PATTERN` - `substring` (default) or `suffix`
//! - `ORDER_EDIT_RESTOCK` - Restock removed placeholders (default: false)
//! - `ORDER_EDIT_NOTIFY_CUSTOMER` - Email the customer on commit (default: false)
//! - `ORDER_EDIT_STAFF_NOTE` - Staff note attached to the commit
//!
//! ## Optional (donations)
//! - `DONATION_PAGE_KEYWORDS` - Comma-separated title keywords (default: marble,falls)
//! - `DONATION_RATE` - Share of each order total (default: 0.25)
//! - `DONATION_METAFIELD_NAMESPACE` - Metafield namespace (default: custom)
//! - `DONATION_METAFIELD_KEY` - Metafield key (default: `total_donations`)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use sizeswap_core::MarkerPattern;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_API_VERSION: &str = "2025-01";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Known placeholder patterns that indicate insecure secrets.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Webhook service configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin API configuration
    pub shopify: ShopifyAdminConfig,
    /// Shared secret for webhook signatures (verification disabled if unset)
    pub webhook_secret: Option<WebhookSecret>,
    /// Order edit behaviour
    pub reconcile: ReconcileConfig,
    /// Donation ledger settings
    pub donation: DonationConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the HIGH PRIVILEGE access token.
#[derive(Clone)]
pub struct ShopifyAdminConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Admin API access token (HIGH PRIVILEGE - full store access)
    pub access_token: SecretString,
    /// Explicit GraphQL endpoint, used instead of store + version
    pub endpoint: Option<Url>,
    /// Upper bound on each Admin API call
    pub timeout: Duration,
}

impl std::fmt::Debug for ShopifyAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ShopifyAdminConfig {
    /// The GraphQL endpoint requests are posted to.
    ///
    /// # Errors
    ///
    /// Returns an error if the store domain does not form a valid URL.
    pub fn graphql_endpoint(&self) -> Result<Url, url::ParseError> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }
        Url::parse(&format!(
            "https://{}/admin/api/{}/graphql.json",
            self.store, self.api_version
        ))
    }
}

/// Webhook signing secret.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct WebhookSecret(pub SecretString);

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret([REDACTED])")
    }
}

/// How order edits are performed.
#[derive(Debug, Clone, Default)]
pub struct ReconcileConfig {
    /// Rule used to recognize placeholder tags
    pub pattern: MarkerPattern,
    /// Return removed placeholder units to inventory
    pub restock: bool,
    /// Email the customer when the edit is committed
    pub notify_customer: bool,
    /// Note attached to the committed edit
    pub staff_note: Option<String>,
}

/// Donation ledger settings.
#[derive(Debug, Clone)]
pub struct DonationConfig {
    /// Words that must all appear in the ledger page title
    pub page_keywords: Vec<String>,
    /// Share of each order total that is donated
    pub rate: Decimal,
    /// Metafield namespace holding the total
    pub namespace: String,
    /// Metafield key holding the total
    pub key: String,
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            page_keywords: vec!["marble".to_string(), "falls".to_string()],
            rate: Decimal::new(25, 2),
            namespace: "custom".to_string(),
            key: "total_donations".to_string(),
        }
    }
}

impl WebhookConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("PORT", "3000")?;

        let shopify = ShopifyAdminConfig::from_env()?;
        let webhook_secret = get_optional_env("SHOPIFY_WEBHOOK_SECRET")
            .map(|value| {
                validate_secret_strength(&value, "SHOPIFY_WEBHOOK_SECRET")?;
                Ok::<_, ConfigError>(WebhookSecret(SecretString::from(value)))
            })
            .transpose()?;
        let reconcile = ReconcileConfig::from_env()?;
        let donation = DonationConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            shopify,
            webhook_secret,
            reconcile,
            donation,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyAdminConfig {
    /// Load only the Shopify settings (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = get_optional_env("SHOPIFY_ADMIN_ENDPOINT")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPIFY_ADMIN_ENDPOINT".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let timeout_secs = parse_env_or_default::<u64>(
            "SHOPIFY_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE_DOMAIN")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: get_validated_secret("SHOPIFY_ADMIN_API_TOKEN")?,
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl ReconcileConfig {
    /// Load order edit settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let pattern = get_optional_env("SIZE_MARKER_PATTERN")
            .map(|raw| {
                raw.parse::<MarkerPattern>()
                    .map_err(|e| ConfigError::InvalidEnvVar("SIZE_MARKER_PATTERN".to_string(), e))
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            pattern,
            restock: get_bool_env("ORDER_EDIT_RESTOCK")?,
            notify_customer: get_bool_env("ORDER_EDIT_NOTIFY_CUSTOMER")?,
            staff_note: get_optional_env("ORDER_EDIT_STAFF_NOTE"),
        })
    }
}

impl DonationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let page_keywords = get_optional_env("DONATION_PAGE_KEYWORDS")
            .map_or(defaults.page_keywords, |raw| parse_keywords(&raw));
        if page_keywords.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "DONATION_PAGE_KEYWORDS".to_string(),
                "at least one keyword is required".to_string(),
            ));
        }

        let rate = get_optional_env("DONATION_RATE")
            .map(|raw| parse_rate(&raw))
            .transpose()?
            .unwrap_or(defaults.rate);

        Ok(Self {
            page_keywords,
            rate,
            namespace: get_env_or_default("DONATION_METAFIELD_NAMESPACE", &defaults.namespace),
            key: get_env_or_default("DONATION_METAFIELD_KEY", &defaults.key),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Read a boolean flag (unset means false).
fn get_bool_env(key: &str) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(false), |raw| {
        parse_bool(&raw).ok_or_else(|| {
            ConfigError::InvalidEnvVar(key.to_string(), format!("expected a boolean, got '{raw}'"))
        })
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn parse_rate(raw: &str) -> Result<Decimal, ConfigError> {
    let rate = Decimal::from_str(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("DONATION_RATE".to_string(), e.to_string()))?;
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            "DONATION_RATE".to_string(),
            format!("{rate} is outside 0..=1"),
        ));
    }
    Ok(rate)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder values and low-entropy secrets.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real tokens are random; anything repetitive was typed by hand
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token Shopify issued."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
