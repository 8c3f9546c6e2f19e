//! Strategy selection.
//!
//! Platform-native credentials outrank anything the caller supplies: a
//! container with an injected role always resolves through that role.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{AuthType, CredentialConfig};
use crate::environment::EnvironmentInfo;

/// Resolution strategy, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Role injected by ECS, EKS or the EC2 instance; validated.
    PlatformRole,
    /// SSO session cached by the local AWS CLI.
    LocalSso,
    /// Static keys, else the default provider chain.
    Fallback,
}

impl Strategy {
    /// First matching strategy for this environment and config.
    pub fn select(env: &EnvironmentInfo, config: &CredentialConfig) -> Self {
        if env.has_platform_role() {
            Strategy::PlatformRole
        } else if env.has_aws_cli && config.auth_type() == AuthType::Sso {
            Strategy::LocalSso
        } else {
            Strategy::Fallback
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::PlatformRole => "platform role",
            Strategy::LocalSso => "local SSO",
            Strategy::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential source as reported to diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMethod {
    /// ECS task role or EKS workload identity.
    OrchestratorRole,
    /// EC2 instance profile role.
    AttachedRole,
    Sso,
    StaticCreds,
    DefaultChain,
    None,
}

impl CredentialMethod {
    /// Reported method: role type first, then SSO, static keys, default chain.
    pub fn classify(env: &EnvironmentInfo, config: &CredentialConfig) -> Self {
        if env.has_orchestrator_role() {
            CredentialMethod::OrchestratorRole
        } else if env.has_platform_role() {
            CredentialMethod::AttachedRole
        } else if config.auth_type() == AuthType::Sso {
            CredentialMethod::Sso
        } else if config.static_keys().is_some() {
            CredentialMethod::StaticCreds
        } else {
            CredentialMethod::DefaultChain
        }
    }
}

impl fmt::Display for CredentialMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CredentialMethod::OrchestratorRole => "orchestrator role",
            CredentialMethod::AttachedRole => "attached role",
            CredentialMethod::Sso => "SSO",
            CredentialMethod::StaticCreds => "static credentials",
            CredentialMethod::DefaultChain => "default chain",
            CredentialMethod::None => "none",
        };
        f.write_str(name)
    }
}
