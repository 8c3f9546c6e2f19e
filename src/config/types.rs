//! Credential configuration types.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// How the caller wants credentials obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Access keys supplied directly, or the default provider chain.
    Static,
    /// AWS IAM Identity Center through the local AWS CLI cache.
    Sso,
    /// Let the runtime environment decide.
    Auto,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Static => "static",
            AuthType::Sso => "sso",
            AuthType::Auto => "auto",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of a credential configuration.
///
/// Every field is optional here; [`CredentialConfig`] is the validated form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCredentialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso_start_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso_role_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl RawCredentialConfig {
    /// Drop blank values so that `""` behaves like an absent field.
    pub(crate) fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }

        Self {
            auth_type: self.auth_type,
            region: keep(self.region),
            profile: keep(self.profile),
            sso_start_url: keep(self.sso_start_url),
            sso_region: keep(self.sso_region),
            sso_account_id: keep(self.sso_account_id),
            sso_role_name: keep(self.sso_role_name),
            access_key_id: keep(self.access_key_id),
            secret_access_key: keep(self.secret_access_key),
            session_token: keep(self.session_token),
        }
    }
}

/// An access key pair with an optional session token.
#[derive(Clone)]
pub struct StaticKeys {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
}

impl StaticKeys {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(SecretString::from(token.into()));
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
}

impl PartialEq for StaticKeys {
    fn eq(&self, other: &Self) -> bool {
        self.access_key_id == other.access_key_id
            && self.secret_access_key() == other.secret_access_key()
            && self.session_token() == other.session_token()
    }
}

impl Eq for StaticKeys {}

impl fmt::Debug for StaticKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeys")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// IAM Identity Center portal parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SsoPortal {
    pub start_url: String,
    pub sso_region: String,
    pub account_id: Option<String>,
    pub role_name: Option<String>,
}

impl SsoPortal {
    pub fn new(start_url: impl Into<String>, sso_region: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            sso_region: sso_region.into(),
            account_id: None,
            role_name: None,
        }
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_role_name(mut self, role_name: impl Into<String>) -> Self {
        self.role_name = Some(role_name.into());
        self
    }
}

/// Where an SSO session comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SsoSource {
    /// A named profile in the AWS config file.
    Profile(String),
    /// Explicit portal parameters.
    Portal(SsoPortal),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticConfig {
    pub region: String,
    pub profile: Option<String>,
    pub keys: Option<StaticKeys>,
}

impl StaticConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
            keys: None,
        }
    }

    pub fn with_keys(mut self, keys: StaticKeys) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SsoConfig {
    pub region: String,
    pub source: SsoSource,
}

impl SsoConfig {
    pub fn with_profile(region: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            source: SsoSource::Profile(profile.into()),
        }
    }

    pub fn with_portal(region: impl Into<String>, portal: SsoPortal) -> Self {
        Self {
            region: region.into(),
            source: SsoSource::Portal(portal),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoConfig {
    pub region: String,
    pub profile: Option<String>,
    pub keys: Option<StaticKeys>,
}

impl AutoConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
            keys: None,
        }
    }

    pub fn with_keys(mut self, keys: StaticKeys) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

/// Validated credential configuration.
///
/// Serializes to the camelCase wire shape and deserializes through the same
/// validation as [`ConfigParser`](super::ConfigParser), minus the
/// environment region fallback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RawCredentialConfig", try_from = "RawCredentialConfig")]
pub enum CredentialConfig {
    Static(StaticConfig),
    Sso(SsoConfig),
    Auto(AutoConfig),
}

impl CredentialConfig {
    pub fn auth_type(&self) -> AuthType {
        match self {
            CredentialConfig::Static(_) => AuthType::Static,
            CredentialConfig::Sso(_) => AuthType::Sso,
            CredentialConfig::Auto(_) => AuthType::Auto,
        }
    }

    pub fn region(&self) -> &str {
        match self {
            CredentialConfig::Static(c) => &c.region,
            CredentialConfig::Sso(c) => &c.region,
            CredentialConfig::Auto(c) => &c.region,
        }
    }

    /// Named profile, for SSO profiles as well as default-chain lookups.
    pub fn profile(&self) -> Option<&str> {
        match self {
            CredentialConfig::Static(c) => c.profile.as_deref(),
            CredentialConfig::Sso(c) => match &c.source {
                SsoSource::Profile(p) => Some(p),
                SsoSource::Portal(_) => None,
            },
            CredentialConfig::Auto(c) => c.profile.as_deref(),
        }
    }

    pub fn static_keys(&self) -> Option<&StaticKeys> {
        match self {
            CredentialConfig::Static(c) => c.keys.as_ref(),
            CredentialConfig::Auto(c) => c.keys.as_ref(),
            CredentialConfig::Sso(_) => None,
        }
    }

    pub fn sso_source(&self) -> Option<&SsoSource> {
        match self {
            CredentialConfig::Sso(c) => Some(&c.source),
            _ => None,
        }
    }

    pub fn to_raw(&self) -> RawCredentialConfig {
        self.clone().into()
    }

    pub fn to_json(&self) -> String {
        // Plain strings and options only; serialization cannot fail.
        serde_json::to_string(&self.to_raw()).unwrap_or_default()
    }
}

impl From<StaticConfig> for CredentialConfig {
    fn from(config: StaticConfig) -> Self {
        CredentialConfig::Static(config)
    }
}

impl From<SsoConfig> for CredentialConfig {
    fn from(config: SsoConfig) -> Self {
        CredentialConfig::Sso(config)
    }
}

impl From<AutoConfig> for CredentialConfig {
    fn from(config: AutoConfig) -> Self {
        CredentialConfig::Auto(config)
    }
}

impl From<CredentialConfig> for RawCredentialConfig {
    fn from(config: CredentialConfig) -> Self {
        let mut raw = RawCredentialConfig {
            auth_type: Some(config.auth_type()),
            region: Some(config.region().to_string()),
            ..Default::default()
        };

        let (profile, keys) = match config {
            CredentialConfig::Static(c) => (c.profile, c.keys),
            CredentialConfig::Auto(c) => (c.profile, c.keys),
            CredentialConfig::Sso(c) => match c.source {
                SsoSource::Profile(p) => (Some(p), None),
                SsoSource::Portal(portal) => {
                    raw.sso_start_url = Some(portal.start_url);
                    raw.sso_region = Some(portal.sso_region);
                    raw.sso_account_id = portal.account_id;
                    raw.sso_role_name = portal.role_name;
                    (None, None)
                }
            },
        };

        raw.profile = profile;
        if let Some(keys) = keys {
            raw.access_key_id = Some(keys.access_key_id().to_string());
            raw.secret_access_key = Some(keys.secret_access_key().to_string());
            raw.session_token = keys.session_token().map(str::to_string);
        }
        raw
    }
}

impl TryFrom<RawCredentialConfig> for CredentialConfig {
    type Error = crate::Error;

    fn try_from(raw: RawCredentialConfig) -> crate::Result<Self> {
        super::parser::validate(raw, None)
    }
}
