//! Explicit identity provider.

use async_trait::async_trait;

use crate::ProviderError;
use crate::auth::{CallerIdentity, IdentityProvider, ProviderRequest, ResolvedCredential};
use crate::config::StaticKeys;

/// Provider with explicitly set credentials.
///
/// Every request, whatever its source, yields the same keys scoped to the
/// requested region.
pub struct ExplicitProvider {
    keys: Result<StaticKeys, String>,
    identity: Result<CallerIdentity, String>,
}

impl ExplicitProvider {
    /// Create with keys returned for every request.
    pub fn new(keys: StaticKeys) -> Self {
        Self {
            keys: Ok(keys),
            identity: Ok(CallerIdentity::new(
                "000000000000",
                "arn:aws:sts::000000000000:assumed-role/explicit/session",
                "AROAEXPLICIT:session",
            )),
        }
    }

    /// Create a provider whose credential requests all fail.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            keys: Err(message.into()),
            ..Self::new(StaticKeys::new("", ""))
        }
    }

    pub fn with_identity(mut self, identity: CallerIdentity) -> Self {
        self.identity = Ok(identity);
        self
    }

    /// Identity checks fail with `message`.
    pub fn with_identity_error(mut self, message: impl Into<String>) -> Self {
        self.identity = Err(message.into());
        self
    }
}

impl std::fmt::Debug for ExplicitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplicitProvider")
            .field("keys", &self.keys.as_ref().map(StaticKeys::access_key_id))
            .field("identity", &self.identity)
            .finish()
    }
}

#[async_trait]
impl IdentityProvider for ExplicitProvider {
    fn name(&self) -> &str {
        "explicit"
    }

    async fn credentials(
        &self,
        region: &str,
        _request: &ProviderRequest,
    ) -> Result<ResolvedCredential, ProviderError> {
        match &self.keys {
            Ok(keys) => Ok(ResolvedCredential::from_keys(keys, region)),
            Err(message) => Err(message.clone().into()),
        }
    }

    async fn caller_identity(
        &self,
        _credential: &ResolvedCredential,
    ) -> Result<CallerIdentity, ProviderError> {
        self.identity.clone().map_err(Into::into)
    }
}
