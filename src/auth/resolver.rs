//! Credential resolver.

use std::sync::Arc;
use std::time::Duration;

use super::{
    CallerIdentity, CredentialMethod, IdentityProvider, ProviderRequest, ResolvedCredential,
    Strategy,
};
use crate::config::{CredentialConfig, SsoSource};
use crate::environment::{EnvironmentInfo, EnvironmentProbe};
use crate::{Error, ProviderError, Result};

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolver policy.
#[derive(Clone, Debug)]
pub struct ResolverSettings {
    /// Run an identity check on platform role credentials and fail hard on
    /// rejection. Local SSO and fallback credentials are never checked.
    pub validate_platform_credentials: bool,
    /// Upper bound for a single provider call.
    pub provider_timeout: Duration,
    /// Upper bound for a single identity check.
    pub identity_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            validate_platform_credentials: true,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }
}

impl ResolverSettings {
    pub fn validate_platform_credentials(mut self, enable: bool) -> Self {
        self.validate_platform_credentials = enable;
        self
    }

    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn identity_timeout(mut self, timeout: Duration) -> Self {
        self.identity_timeout = timeout;
        self
    }
}

/// Outcome of a successful resolution.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub credential: ResolvedCredential,
    pub strategy: Strategy,
    pub method: CredentialMethod,
    /// Set when the strategy already ran an identity check.
    pub identity: Option<CallerIdentity>,
}

/// Picks a strategy for a config and obtains credentials through it.
pub struct CredentialResolver {
    probe: Arc<EnvironmentProbe>,
    provider: Arc<dyn IdentityProvider>,
    settings: ResolverSettings,
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("probe", &self.probe)
            .field("provider", &self.provider.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl CredentialResolver {
    pub fn new(probe: Arc<EnvironmentProbe>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            probe,
            provider,
            settings: ResolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn probe(&self) -> &EnvironmentProbe {
        &self.probe
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub async fn environment(&self) -> EnvironmentInfo {
        self.probe.detect().await
    }

    pub async fn resolve(&self, config: &CredentialConfig) -> Result<ResolvedCredential> {
        self.resolve_detailed(config).await.map(|r| r.credential)
    }

    pub async fn resolve_detailed(&self, config: &CredentialConfig) -> Result<Resolution> {
        let env = self.probe.detect().await;
        let strategy = Strategy::select(&env, config);
        let method = CredentialMethod::classify(&env, config);

        tracing::debug!(
            strategy = %strategy,
            auth_type = %config.auth_type(),
            platform = env.platform_name(),
            region = config.region(),
            "Resolving credentials"
        );

        let (credential, identity) = match strategy {
            Strategy::PlatformRole => self.platform_role(config).await?,
            Strategy::LocalSso => (self.local_sso(config).await?, None),
            Strategy::Fallback => (self.fallback(config).await?, None),
        };

        tracing::info!(
            strategy = %strategy,
            access_key_id = credential.access_key_id(),
            region = credential.region(),
            "Credentials resolved"
        );

        Ok(Resolution {
            credential,
            strategy,
            method,
            identity,
        })
    }

    /// Run an identity check bounded by the identity timeout.
    pub async fn verify(
        &self,
        credential: &ResolvedCredential,
    ) -> std::result::Result<CallerIdentity, ProviderError> {
        let timeout = self.settings.identity_timeout;
        match tokio::time::timeout(timeout, self.provider.caller_identity(credential)).await {
            Ok(result) => result,
            Err(_) => Err(format!("identity check timed out after {:?}", timeout).into()),
        }
    }

    async fn platform_role(
        &self,
        config: &CredentialConfig,
    ) -> Result<(ResolvedCredential, Option<CallerIdentity>)> {
        let credential = self
            .fetch(Strategy::PlatformRole, config.region(), ProviderRequest::PlatformChain)
            .await?;

        if !self.settings.validate_platform_credentials {
            return Ok((credential, None));
        }

        match self.verify(&credential).await {
            Ok(identity) => {
                tracing::debug!(arn = %identity.arn, "Platform role validated");
                Ok((credential, Some(identity)))
            }
            Err(source) => {
                tracing::warn!("Platform role credentials rejected: {}", source);
                Err(Error::CredentialValidationFailed {
                    strategy: Strategy::PlatformRole,
                    source,
                })
            }
        }
    }

    async fn local_sso(&self, config: &CredentialConfig) -> Result<ResolvedCredential> {
        // Constructors accept blank strings, so re-check what the parser checks.
        let request = match config.sso_source() {
            Some(SsoSource::Profile(profile)) if !profile.trim().is_empty() => {
                ProviderRequest::SsoProfile {
                    profile: profile.clone(),
                }
            }
            Some(SsoSource::Portal(portal))
                if !portal.start_url.trim().is_empty() && !portal.sso_region.trim().is_empty() =>
            {
                ProviderRequest::SsoPortal(portal.clone())
            }
            _ => {
                return Err(Error::incomplete_sso(
                    "local SSO needs \"profile\", or both \"ssoStartUrl\" and \"ssoRegion\"",
                ));
            }
        };

        self.fetch(Strategy::LocalSso, config.region(), request).await
    }

    async fn fallback(&self, config: &CredentialConfig) -> Result<ResolvedCredential> {
        if let Some(keys) = config.static_keys() {
            return Ok(ResolvedCredential::from_keys(keys, config.region()));
        }

        let request = ProviderRequest::DefaultChain {
            profile: config.profile().map(str::to_string),
        };
        self.fetch(Strategy::Fallback, config.region(), request).await
    }

    async fn fetch(
        &self,
        strategy: Strategy,
        region: &str,
        request: ProviderRequest,
    ) -> Result<ResolvedCredential> {
        let timeout = self.settings.provider_timeout;
        match tokio::time::timeout(timeout, self.provider.credentials(region, &request)).await {
            Ok(Ok(credential)) => Ok(credential),
            Ok(Err(source)) => {
                tracing::debug!("{} via {} failed: {}", strategy, request, source);
                Err(Error::CredentialResolutionFailed { strategy, source })
            }
            Err(_) => Err(Error::CredentialResolutionFailed {
                strategy,
                source: format!("{} timed out after {:?}", request, timeout).into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ExplicitProvider;
    use crate::auth::testing::helpers::RecordingProvider;
    use crate::config::{AutoConfig, ConfigParser, SsoConfig, SsoPortal, StaticConfig, StaticKeys};

    fn resolver(env: EnvironmentInfo, provider: Arc<RecordingProvider>) -> CredentialResolver {
        CredentialResolver::new(Arc::new(EnvironmentProbe::with_info(env)), provider)
    }

    fn ecs() -> EnvironmentInfo {
        EnvironmentInfo {
            is_container: true,
            is_ecs: true,
            ..Default::default()
        }
    }

    fn laptop_with_cli() -> EnvironmentInfo {
        EnvironmentInfo {
            has_aws_cli: true,
            ..Default::default()
        }
    }

    fn role_keys() -> StaticKeys {
        StaticKeys::new("ASIAROLE", "role-secret").with_session_token("role-token")
    }

    #[tokio::test]
    async fn test_static_keys_on_bare_host() {
        let provider = Arc::new(RecordingProvider::new(ExplicitProvider::new(role_keys())));
        let config = ConfigParser::with_env(std::collections::HashMap::<String, String>::new())
            .parse(r#"{"region":"us-east-1","accessKeyId":"AKIA1","secretAccessKey":"s1"}"#)
            .unwrap();

        let resolution = resolver(EnvironmentInfo::bare(), provider.clone())
            .resolve_detailed(&config)
            .await
            .unwrap();

        assert_eq!(resolution.strategy, Strategy::Fallback);
        assert_eq!(resolution.method, CredentialMethod::StaticCreds);
        assert_eq!(
            resolution.credential,
            ResolvedCredential::new("AKIA1", "s1", "us-east-1")
        );
        assert!(provider.requests().await.is_empty());
        assert_eq!(provider.identity_checks(), 0);
    }

    #[tokio::test]
    async fn test_platform_role_outranks_static_keys() {
        let provider = Arc::new(RecordingProvider::new(ExplicitProvider::new(role_keys())));
        let config: CredentialConfig = StaticConfig::new("us-east-1")
            .with_keys(StaticKeys::new("AKIA1", "s1"))
            .into();

        let resolution = resolver(ecs(), provider.clone())
            .resolve_detailed(&config)
            .await
            .unwrap();

        assert_eq!(resolution.strategy, Strategy::PlatformRole);
        assert_eq!(resolution.credential.access_key_id(), "ASIAROLE");
        assert!(resolution.identity.is_some());
        assert_eq!(
            provider.requests().await,
            vec![("us-east-1".to_string(), ProviderRequest::PlatformChain)]
        );
        assert_eq!(provider.identity_checks(), 1);
    }

    #[tokio::test]
    async fn test_platform_validation_failure_is_fatal() {
        let provider = Arc::new(RecordingProvider::new(
            ExplicitProvider::new(role_keys()).with_identity_error("ExpiredToken"),
        ));
        let config: CredentialConfig = StaticConfig::new("us-east-1")
            .with_keys(StaticKeys::new("AKIA1", "s1"))
            .into();

        let err = resolver(ecs(), provider.clone())
            .resolve(&config)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::CredentialValidationFailed {
                strategy: Strategy::PlatformRole,
                ..
            }
        ));
        assert!(err.to_string().contains("ExpiredToken"));
        assert_eq!(provider.requests().await.len(), 1, "no fallthrough");
    }

    #[tokio::test]
    async fn test_platform_validation_can_be_disabled() {
        let provider = Arc::new(RecordingProvider::new(
            ExplicitProvider::new(role_keys()).with_identity_error("ExpiredToken"),
        ));
        let resolver = resolver(ecs(), provider.clone())
            .with_settings(ResolverSettings::default().validate_platform_credentials(false));

        let resolution = resolver
            .resolve_detailed(&AutoConfig::new("us-east-1").into())
            .await
            .unwrap();
        assert!(resolution.identity.is_none());
        assert_eq!(provider.identity_checks(), 0);
    }

    #[tokio::test]
    async fn test_platform_chain_failure() {
        let provider = Arc::new(RecordingProvider::new(ExplicitProvider::failing(
            "no container credentials endpoint",
        )));
        let err = resolver(ecs(), provider)
            .resolve(&AutoConfig::new("us-east-1").into())
            .await
            .unwrap_err();

        assert_eq!(err.strategy(), Some(Strategy::PlatformRole));
        assert!(matches!(err, Error::CredentialResolutionFailed { .. }));
        assert!(err.to_string().contains("no container credentials endpoint"));
    }

    #[tokio::test]
    async fn test_local_sso_profile() {
        let provider = Arc::new(RecordingProvider::new(ExplicitProvider::new(role_keys())));
        let config: CredentialConfig = SsoConfig::with_profile("us-west-2", "bedrock-dev").into();

        let resolution = resolver(laptop_with_cli(), provider.clone())
            .resolve_detailed(&config)
            .await
            .unwrap();

        assert_eq!(resolution.strategy, Strategy::LocalSso);
        assert_eq!(resolution.credential.region(), "us-west-2");
        assert!(resolution.identity.is_none());
        assert_eq!(
            provider.requests().await,
            vec![(
                "us-west-2".to_string(),
                ProviderRequest::SsoProfile {
                    profile: "bedrock-dev".into()
                }
            )]
        );
        assert_eq!(provider.identity_checks(), 0);
    }

    #[tokio::test]
    async fn test_local_sso_portal() {
        let provider = Arc::new(RecordingProvider::new(ExplicitProvider::new(role_keys())));
        let portal = SsoPortal::new("https://x.awsapps.com/start", "us-east-1")
            .with_account_id("123456789012")
            .with_role_name("Dev");
        let config: CredentialConfig = SsoConfig::with_portal("us-west-2", portal.clone()).into();

        resolver(laptop_with_cli(), provider.clone())
            .resolve(&config)
            .await
            .unwrap();

        assert_eq!(
            provider.requests().await,
            vec![("us-west-2".to_string(), ProviderRequest::SsoPortal(portal))]
        );
    }

    #[tokio::test]
    async fn test_local_sso_rejects_blank_source() {
        let provider = Arc::new(RecordingProvider::new(ExplicitProvider::new(role_keys())));
        let config: CredentialConfig = SsoConfig::with_profile("us-west-2", " ").into();

        let err = resolver(laptop_with_cli(), provider.clone())
            .resolve(&config)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IncompleteSsoConfig { .. }));
        assert!(err.is_caller_error());
        assert!(provider.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_sso_without_cli_uses_default_chain_with_profile() {
        let provider = Arc::new(RecordingProvider::new(ExplicitProvider::new(role_keys())));
        let config: CredentialConfig = SsoConfig::with_profile("us-west-2", "dev").into();

        let resolution = resolver(EnvironmentInfo::bare(), provider.clone())
            .resolve_detailed(&config)
            .await
            .unwrap();

        assert_eq!(resolution.strategy, Strategy::Fallback);
        assert_eq!(
            provider.requests().await,
            vec![(
                "us-west-2".to_string(),
                ProviderRequest::DefaultChain {
                    profile: Some("dev".into())
                }
            )]
        );
    }

    #[tokio::test]
    async fn test_default_chain_failure_wrapped() {
        let provider = Arc::new(RecordingProvider::new(ExplicitProvider::failing(
            "no credentials in chain",
        )));
        let err = resolver(EnvironmentInfo::bare(), provider)
            .resolve(&AutoConfig::new("eu-west-1").into())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::CredentialResolutionFailed {
                strategy: Strategy::Fallback,
                ..
            }
        ));
        assert!(!err.is_caller_error());
    }

    #[tokio::test]
    async fn test_provider_timeout() {
        let provider = Arc::new(
            RecordingProvider::new(ExplicitProvider::new(role_keys()))
                .with_delay(Duration::from_millis(500)),
        );
        let resolver = resolver(EnvironmentInfo::bare(), provider)
            .with_settings(ResolverSettings::default().provider_timeout(Duration::from_millis(50)));

        let err = resolver
            .resolve(&AutoConfig::new("eu-west-1").into())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
