//! Credential configuration parsing and validation.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::env::{EnvSource, ProcessEnv, REGION_VARS};
use super::types::{
    AuthType, AutoConfig, CredentialConfig, RawCredentialConfig, SsoConfig, SsoPortal, StaticConfig,
    StaticKeys,
};
use crate::{Error, Result};

const AUTH_TYPE_FIELD: &str = "authType";
const AUTH_TYPES: &[&str] = &["static", "sso", "auto"];

const STRING_FIELDS: &[&str] = &[
    AUTH_TYPE_FIELD,
    "region",
    "profile",
    "ssoStartUrl",
    "ssoRegion",
    "ssoAccountId",
    "ssoRoleName",
    "accessKeyId",
    "secretAccessKey",
    "sessionToken",
];

/// Parses user-supplied JSON into a [`CredentialConfig`].
///
/// The only input besides the JSON text is the environment lookup used for
/// the region fallback (`AWS_REGION`, then `AWS_DEFAULT_REGION`).
#[derive(Debug, Clone)]
pub struct ConfigParser {
    env: Arc<dyn EnvSource>,
}

impl ConfigParser {
    /// Parser that falls back to the process environment for the region.
    pub fn new() -> Self {
        Self {
            env: Arc::new(ProcessEnv),
        }
    }

    /// Parser with an explicit environment lookup table.
    pub fn with_env(env: impl EnvSource + 'static) -> Self {
        Self { env: Arc::new(env) }
    }

    pub fn parse(&self, raw: &str) -> Result<CredentialConfig> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::malformed(format!("not valid JSON: {}", e)))?;

        let Some(fields) = value.as_object() else {
            return Err(Error::malformed(format!(
                "expected a JSON object, got {}",
                value_kind(&value)
            )));
        };
        check_field_types(fields)?;

        let raw: RawCredentialConfig =
            serde_json::from_value(value).map_err(|e| Error::malformed(e.to_string()))?;

        validate(raw, Some(&*self.env))
    }
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a raw config into its typed form.
pub(crate) fn validate(
    raw: RawCredentialConfig,
    env: Option<&dyn EnvSource>,
) -> Result<CredentialConfig> {
    let raw = raw.normalized();

    let region = raw
        .region
        .clone()
        .or_else(|| env.and_then(|env| env.first_of(REGION_VARS)))
        .ok_or(Error::MissingRegion)?;

    match raw.auth_type {
        Some(AuthType::Sso) => {
            if let Some(profile) = raw.profile {
                return Ok(SsoConfig::with_profile(region, profile).into());
            }

            match (raw.sso_start_url, raw.sso_region) {
                (Some(start_url), Some(sso_region)) => {
                    let mut portal = SsoPortal::new(start_url, sso_region);
                    portal.account_id = raw.sso_account_id;
                    portal.role_name = raw.sso_role_name;
                    Ok(SsoConfig::with_portal(region, portal).into())
                }
                (Some(_), None) => Err(Error::incomplete_sso(
                    "\"ssoRegion\" is required when \"ssoStartUrl\" is set",
                )),
                (None, Some(_)) => Err(Error::incomplete_sso(
                    "\"ssoStartUrl\" is required when \"ssoRegion\" is set",
                )),
                (None, None) => Err(Error::incomplete_sso(
                    "set \"profile\", or both \"ssoStartUrl\" and \"ssoRegion\"",
                )),
            }
        }
        Some(AuthType::Auto) => {
            let keys = static_keys(&raw)?;
            Ok(CredentialConfig::Auto(AutoConfig {
                region,
                profile: raw.profile,
                keys,
            }))
        }
        Some(AuthType::Static) | None => {
            let keys = static_keys(&raw)?;
            Ok(CredentialConfig::Static(StaticConfig {
                region,
                profile: raw.profile,
                keys,
            }))
        }
    }
}

/// Name the offending key when a known field has the wrong type.
fn check_field_types(fields: &Map<String, Value>) -> Result<()> {
    for &key in STRING_FIELDS {
        match fields.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => {
                return Err(Error::malformed(format!(
                    "\"{}\" must be a string, got {}",
                    key,
                    value_kind(other)
                )));
            }
        }
    }

    if let Some(Value::String(auth_type)) = fields.get(AUTH_TYPE_FIELD)
        && !AUTH_TYPES.contains(&auth_type.as_str())
    {
        return Err(Error::malformed(format!(
            "\"{}\" must be one of {}, got \"{}\"",
            AUTH_TYPE_FIELD,
            AUTH_TYPES.join(", "),
            auth_type
        )));
    }
    Ok(())
}

fn static_keys(raw: &RawCredentialConfig) -> Result<Option<StaticKeys>> {
    match (&raw.access_key_id, &raw.secret_access_key) {
        (Some(access_key_id), Some(secret)) => {
            let keys = StaticKeys::new(access_key_id.clone(), secret.clone());
            Ok(Some(match &raw.session_token {
                Some(token) => keys.with_session_token(token.clone()),
                None => keys,
            }))
        }
        (Some(_), None) => Err(Error::IncompleteStaticCredentials {
            present: "accessKeyId",
            missing: "secretAccessKey",
        }),
        (None, Some(_)) => Err(Error::IncompleteStaticCredentials {
            present: "secretAccessKey",
            missing: "accessKeyId",
        }),
        (None, None) => Ok(None),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
