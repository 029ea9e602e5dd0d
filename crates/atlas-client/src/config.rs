use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use atlas_core::AppError;
use url::Url;

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Format of the client key store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStoreType {
    /// Binary PKCS#12 archive holding the certificate chain and private key.
    Pkcs12,
    /// PEM bundle with the certificate chain and one private key.
    Pem,
}

impl FromStr for KeyStoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PKCS12" | "P12" | "PFX" => Ok(KeyStoreType::Pkcs12),
            "PEM" => Ok(KeyStoreType::Pem),
            _ => Err(format!("Unsupported key store type: {s}")),
        }
    }
}

impl fmt::Display for KeyStoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStoreType::Pkcs12 => write!(f, "PKCS12"),
            KeyStoreType::Pem => write!(f, "PEM"),
        }
    }
}

/// Client certificate material for mutual TLS.
#[derive(Clone)]
pub struct SslConfig {
    pub key_store: PathBuf,
    pub key_store_password: String,
    pub key_store_type: KeyStoreType,
    /// Optional PEM bundle of CA certificates to trust in addition to the system roots.
    pub trust_store: Option<PathBuf>,
}

impl fmt::Debug for SslConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SslConfig")
            .field("key_store", &self.key_store)
            .field("key_store_password", &"<redacted>")
            .field("key_store_type", &self.key_store_type)
            .field("trust_store", &self.trust_store)
            .finish()
    }
}

/// Configuration for the outbound HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URLs of the remote service. More than one enables round-robin balancing.
    pub urls: Vec<Url>,
    pub read_timeout: Duration,
    /// Upper bound for a whole exchange, including sending the request body.
    pub write_timeout: Duration,
    pub connect_timeout: Duration,
    pub ssl: Option<SslConfig>,
}

impl ClientConfig {
    /// Single-URL config with default timeouts and no client certificate.
    pub fn new(url: &str) -> Result<Self, AppError> {
        Ok(Self {
            urls: vec![parse_base_url(url)?],
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ssl: None,
        })
    }

    pub fn with_ssl(mut self, ssl: SslConfig) -> Self {
        self.ssl = Some(ssl);
        self
    }

    /// Read configuration from environment variables.
    ///
    /// - `REMOTE_SERVICES_URL` (comma-separated; unset means no remote service)
    /// - `REMOTE_SERVICES_READ_TIMEOUT_SECS`, `REMOTE_SERVICES_WRITE_TIMEOUT_SECS`
    ///   (default 10), `REMOTE_SERVICES_CONNECT_TIMEOUT_SECS` (default 5)
    /// - `REMOTE_SERVICES_SSL_KEY_STORE`, `REMOTE_SERVICES_SSL_KEY_STORE_PASSWORD`,
    ///   `REMOTE_SERVICES_SSL_KEY_STORE_TYPE` (default PKCS12),
    ///   `REMOTE_SERVICES_SSL_TRUST_STORE`
    pub fn from_env() -> Result<Option<Self>, AppError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Option<Self>, AppError> {
        let Some(raw_urls) = var("REMOTE_SERVICES_URL") else {
            return Ok(None);
        };

        let urls = raw_urls
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_base_url)
            .collect::<Result<Vec<_>, _>>()?;
        if urls.is_empty() {
            return Err(AppError::ConfigError(
                "REMOTE_SERVICES_URL must contain at least one URL".into(),
            ));
        }

        let ssl = match var("REMOTE_SERVICES_SSL_KEY_STORE") {
            None => None,
            Some(key_store) => {
                let key_store_password =
                    var("REMOTE_SERVICES_SSL_KEY_STORE_PASSWORD").unwrap_or_default();
                let key_store_type = match var("REMOTE_SERVICES_SSL_KEY_STORE_TYPE") {
                    Some(raw) => raw.parse().map_err(AppError::ConfigError)?,
                    None => KeyStoreType::Pkcs12,
                };
                Some(SslConfig {
                    key_store: PathBuf::from(key_store),
                    key_store_password,
                    key_store_type,
                    trust_store: var("REMOTE_SERVICES_SSL_TRUST_STORE").map(PathBuf::from),
                })
            }
        };

        Ok(Some(Self {
            urls,
            read_timeout: secs(&var, "REMOTE_SERVICES_READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT)?,
            write_timeout: secs(
                &var,
                "REMOTE_SERVICES_WRITE_TIMEOUT_SECS",
                DEFAULT_WRITE_TIMEOUT,
            )?,
            connect_timeout: secs(
                &var,
                "REMOTE_SERVICES_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT,
            )?,
            ssl,
        }))
    }
}

/// Parse a base URL, keeping only http/https.
pub fn parse_base_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::ConfigError(format!("Invalid remote service URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AppError::ConfigError(format!(
            "Remote service URL scheme '{scheme}' is not allowed (only http/https)"
        ))),
    }
}

fn secs(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration, AppError> {
    match var(key) {
        None => Ok(default),
        Some(raw) => {
            let parsed: u64 = raw.parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid {key} '{raw}': must be a positive integer"
                ))
            })?;
            if parsed == 0 {
                return Err(AppError::ConfigError(format!("{key} must be at least 1")));
            }
            Ok(Duration::from_secs(parsed))
        }
    }
}
