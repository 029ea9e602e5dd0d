use std::path::PathBuf;

use atlas_core::AppError;
use jsonwebtoken::Algorithm;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ADMIN_ROLE: &str = "ADMIN";
const DEFAULT_ROLES_CLAIM: &str = "roles";
const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Server settings read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Role required for country writes.
    pub admin_role: String,
    pub jwt: JwtConfig,
    pub cors: Cors,
}

/// Where the token signature key comes from.
#[derive(Clone)]
pub enum JwtKey {
    /// Shared HMAC secret.
    Secret(String),
    /// PEM file holding an RSA, EC or Ed25519 public key.
    PublicKeyFile(PathBuf),
}

impl std::fmt::Debug for JwtKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtKey::Secret(_) => f.write_str("Secret(<redacted>)"),
            JwtKey::PublicKeyFile(path) => f.debug_tuple("PublicKeyFile").field(path).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub key: JwtKey,
    pub algorithm: Algorithm,
    pub issuer: Option<String>,
    pub audience: Vec<String>,
    pub leeway_secs: u64,
    /// Claim holding granted roles. Dots descend into nested objects,
    /// e.g. `realm_access.roles`.
    pub roles_claim: String,
}

impl JwtConfig {
    /// HS256 config with default claim names, mostly for tests and local runs.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            key: JwtKey::Secret(secret.into()),
            algorithm: Algorithm::HS256,
            issuer: None,
            audience: Vec::new(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
            roles_claim: DEFAULT_ROLES_CLAIM.to_string(),
        }
    }
}

/// Cross-origin settings applied to every path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cors {
    pub allow_credentials: bool,
    /// Origin patterns; `*` matches any run of characters.
    pub allowed_origin_pattern: Vec<String>,
    /// Header names, or `*` to mirror the request.
    pub allowed_headers: Vec<String>,
    /// Method names, or `*` to mirror the request.
    pub allowed_methods: Vec<String>,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `ATLAS_SERVER_PORT` (default 8080), `ATLAS_ADMIN_ROLE` (default `ADMIN`)
    /// - `ATLAS_JWT_SECRET` or `ATLAS_JWT_PUBLIC_KEY_FILE` (exactly one),
    ///   `ATLAS_JWT_ALGORITHM`, `ATLAS_JWT_ISSUER`, `ATLAS_JWT_AUDIENCE`,
    ///   `ATLAS_JWT_LEEWAY_SECS`, `ATLAS_JWT_ROLES_CLAIM`
    /// - `CORS_ALLOW_CREDENTIALS`, `CORS_ALLOWED_ORIGIN_PATTERN`,
    ///   `CORS_ALLOWED_HEADERS`, `CORS_ALLOWED_METHODS` (lists are comma-separated)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let port = match var("ATLAS_SERVER_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid ATLAS_SERVER_PORT '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            admin_role: var("ATLAS_ADMIN_ROLE")
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ADMIN_ROLE.to_string()),
            jwt: jwt_from_vars(&var)?,
            cors: cors_from_vars(&var)?,
        })
    }
}

fn jwt_from_vars(var: &impl Fn(&str) -> Option<String>) -> Result<JwtConfig, AppError> {
    let key = match (var("ATLAS_JWT_SECRET"), var("ATLAS_JWT_PUBLIC_KEY_FILE")) {
        (Some(secret), None) if !secret.is_empty() => JwtKey::Secret(secret),
        (None, Some(path)) => JwtKey::PublicKeyFile(PathBuf::from(path)),
        (Some(_), Some(_)) => {
            return Err(AppError::ConfigError(
                "Set only one of ATLAS_JWT_SECRET and ATLAS_JWT_PUBLIC_KEY_FILE".into(),
            ));
        }
        _ => {
            return Err(AppError::ConfigError(
                "ATLAS_JWT_SECRET or ATLAS_JWT_PUBLIC_KEY_FILE must be set".into(),
            ));
        }
    };

    let algorithm = match var("ATLAS_JWT_ALGORITHM") {
        Some(raw) => raw.parse::<Algorithm>().map_err(|_| {
            AppError::ConfigError(format!("Unsupported ATLAS_JWT_ALGORITHM '{raw}'"))
        })?,
        None => match key {
            JwtKey::Secret(_) => Algorithm::HS256,
            JwtKey::PublicKeyFile(_) => Algorithm::RS256,
        },
    };

    let is_hmac = matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    );
    if is_hmac != matches!(key, JwtKey::Secret(_)) {
        return Err(AppError::ConfigError(format!(
            "Algorithm {algorithm:?} does not fit the configured key"
        )));
    }

    let leeway_secs = match var("ATLAS_JWT_LEEWAY_SECS") {
        Some(raw) => raw.parse().map_err(|_| {
            AppError::ConfigError(format!("Invalid ATLAS_JWT_LEEWAY_SECS '{raw}'"))
        })?,
        None => DEFAULT_LEEWAY_SECS,
    };

    Ok(JwtConfig {
        key,
        algorithm,
        issuer: var("ATLAS_JWT_ISSUER").filter(|s| !s.is_empty()),
        audience: var("ATLAS_JWT_AUDIENCE")
            .map(|raw| list(&raw))
            .unwrap_or_default(),
        leeway_secs,
        roles_claim: var("ATLAS_JWT_ROLES_CLAIM")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLES_CLAIM.to_string()),
    })
}

fn cors_from_vars(var: &impl Fn(&str) -> Option<String>) -> Result<Cors, AppError> {
    let allow_credentials = match var("CORS_ALLOW_CREDENTIALS").as_deref() {
        None | Some("") => false,
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                return Err(AppError::ConfigError(format!(
                    "Invalid CORS_ALLOW_CREDENTIALS '{raw}'"
                )));
            }
        },
    };

    Ok(Cors {
        allow_credentials,
        allowed_origin_pattern: var("CORS_ALLOWED_ORIGIN_PATTERN")
            .map(|raw| list(&raw))
            .unwrap_or_default(),
        allowed_headers: var("CORS_ALLOWED_HEADERS")
            .map(|raw| list(&raw))
            .unwrap_or_else(|| vec!["*".to_string()]),
        allowed_methods: var("CORS_ALLOWED_METHODS")
            .map(|raw| list(&raw))
            .unwrap_or_else(|| vec!["*".to_string()]),
    })
}

fn list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
