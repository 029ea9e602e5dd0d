use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Prefix some identity providers put in front of role names.
const ROLE_PREFIX: &str = "ROLE_";

/// The authenticated end user, built from token claims for one request.
///
/// The principal itself grants nothing: its authority list is always empty.
/// Granted authorities live on the surrounding [`Authentication`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct User {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl User {
    pub fn new(
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            first_name,
            last_name,
            email,
        }
    }

    /// Display name: first and last name joined by a space.
    ///
    /// Missing parts render as `null`, which matches how the name has always
    /// been reported for tokens without name claims.
    pub fn name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or("null"),
            self.last_name.as_deref().unwrap_or("null")
        )
    }

    pub fn authorities(&self) -> &[Authority] {
        &[]
    }

    pub fn attributes(&self) -> HashMap<String, serde_json::Value> {
        HashMap::new()
    }
}

/// A granted authority, taken verbatim from the roles claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this authority names `role`, with or without the `ROLE_` prefix.
    pub fn is_role(&self, role: &str) -> bool {
        let bare = self.0.strip_prefix(ROLE_PREFIX).unwrap_or(&self.0);
        let wanted = role.strip_prefix(ROLE_PREFIX).unwrap_or(role);
        bare == wanted
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The raw bearer access token with its validity window.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    value: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl BearerToken {
    pub fn new(
        value: impl Into<String>,
        issued_at: Option<DateTime<Utc>>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            value: value.into(),
            issued_at,
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Per-request authentication: who the caller is, the token they presented,
/// and what they are allowed to do.
#[derive(Debug, Clone)]
pub struct Authentication {
    pub principal: User,
    pub token: BearerToken,
    pub authorities: Vec<Authority>,
}

impl Authentication {
    pub fn new(principal: User, token: BearerToken, authorities: Vec<Authority>) -> Self {
        Self {
            principal,
            token,
            authorities,
        }
    }

    pub fn name(&self) -> String {
        self.principal.name()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.authorities.iter().any(|a| a.is_role(role))
    }
}
