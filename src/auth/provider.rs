//! Identity provider trait.

use std::fmt;

use async_trait::async_trait;

use super::{CallerIdentity, ResolvedCredential};
use crate::ProviderError;
use crate::config::SsoPortal;

/// Which provider-specific source to obtain credentials from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderRequest {
    /// Platform chain: environment variables, web identity, container
    /// credential endpoint, then instance metadata.
    PlatformChain,
    /// The SDK's default chain, optionally pinned to a profile.
    DefaultChain { profile: Option<String> },
    /// SSO session referenced by a named profile.
    SsoProfile { profile: String },
    /// SSO session from explicit portal parameters.
    SsoPortal(SsoPortal),
}

impl fmt::Display for ProviderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderRequest::PlatformChain => f.write_str("platform credential chain"),
            ProviderRequest::DefaultChain { profile: None } => {
                f.write_str("default credential chain")
            }
            ProviderRequest::DefaultChain {
                profile: Some(profile),
            } => write!(f, "default credential chain (profile '{}')", profile),
            ProviderRequest::SsoProfile { profile } => write!(f, "SSO profile '{}'", profile),
            ProviderRequest::SsoPortal(portal) => write!(f, "SSO portal {}", portal.start_url),
        }
    }
}

/// External capability that obtains and verifies AWS credentials.
///
/// Implementations talk to the SDK credential providers and STS; the
/// resolver only decides which request to make.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name for debugging.
    fn name(&self) -> &str;

    /// Obtain credentials scoped to `region`.
    async fn credentials(
        &self,
        region: &str,
        request: &ProviderRequest,
    ) -> Result<ResolvedCredential, ProviderError>;

    /// Confirm the credential is currently valid.
    async fn caller_identity(
        &self,
        credential: &ResolvedCredential,
    ) -> Result<CallerIdentity, ProviderError>;
}
