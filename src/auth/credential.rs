//! Credential types.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::StaticKeys;

/// AWS credentials ready to sign Bedrock requests.
///
/// Held only for the duration of the calling operation; this crate never
/// stores or caches them.
#[derive(Clone)]
pub struct ResolvedCredential {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
    region: String,
    expires_at: Option<DateTime<Utc>>,
}

impl ResolvedCredential {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            session_token: None,
            region: region.into(),
            expires_at: None,
        }
    }

    /// Credential straight from a static key pair.
    pub fn from_keys(keys: &StaticKeys, region: impl Into<String>) -> Self {
        let credential = Self::new(keys.access_key_id(), keys.secret_access_key(), region);
        match keys.session_token() {
            Some(token) => credential.with_session_token(token),
            None => credential,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(SecretString::from(token.into()));
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_ref().map(|s| s.expose_secret())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Check if the credential carries an expiry that has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| Utc::now() >= exp)
            .unwrap_or(false)
    }

    /// Short-lived credentials carry a session token.
    pub fn is_temporary(&self) -> bool {
        self.session_token.is_some()
    }
}

impl PartialEq for ResolvedCredential {
    fn eq(&self, other: &Self) -> bool {
        self.access_key_id == other.access_key_id
            && self.secret_access_key() == other.secret_access_key()
            && self.session_token() == other.session_token()
            && self.region == other.region
            && self.expires_at == other.expires_at
    }
}

impl Eq for ResolvedCredential {}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[redacted]"),
            )
            .field("region", &self.region)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Identity returned by an identity check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

impl CallerIdentity {
    pub fn new(
        account: impl Into<String>,
        arn: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            arn: arn.into(),
            user_id: user_id.into(),
        }
    }
}
