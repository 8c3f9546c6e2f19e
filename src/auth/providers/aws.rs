//! AWS SDK identity provider.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::ecs::EcsCredentialsProvider;
use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::provider_config::ProviderConfig;
use aws_config::sso::credentials::SsoCredentialsProvider;
use aws_config::web_identity_token::WebIdentityTokenCredentialsProvider;
use aws_credential_types::Credentials;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_sts::config::timeout::TimeoutConfig;
use aws_sdk_sts::config::{BehaviorVersion, Region};
use aws_sdk_sts::error::DisplayErrorContext;
use chrono::{DateTime, Utc};

use crate::ProviderError;
use crate::auth::{CallerIdentity, IdentityProvider, ProviderRequest, ResolvedCredential};
use crate::config::SsoPortal;

const PROVIDER_NAME: &str = "bedrock-credentials";
const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider backed by the AWS SDK credential providers and STS.
#[derive(Clone, Debug)]
pub struct AwsSdkProvider {
    identity_timeout: Duration,
}

impl AwsSdkProvider {
    pub fn new() -> Self {
        Self {
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }

    /// Operation timeout for `GetCallerIdentity`.
    pub fn with_identity_timeout(mut self, timeout: Duration) -> Self {
        self.identity_timeout = timeout;
        self
    }

    fn provider_config(region: &str) -> ProviderConfig {
        ProviderConfig::without_region().with_region(Some(Region::new(region.to_string())))
    }

    fn platform_chain(region: &str) -> CredentialsProviderChain {
        let conf = Self::provider_config(region);

        CredentialsProviderChain::first_try(
            "Environment",
            EnvironmentVariableCredentialsProvider::new(),
        )
        .or_else(
            "WebIdentityToken",
            WebIdentityTokenCredentialsProvider::builder()
                .configure(&conf)
                .build(),
        )
        .or_else(
            "EcsContainer",
            EcsCredentialsProvider::builder().configure(&conf).build(),
        )
        .or_else(
            "Ec2InstanceMetadata",
            ImdsCredentialsProvider::builder().configure(&conf).build(),
        )
    }

    async fn default_chain(region: &str, profile: Option<&str>) -> DefaultCredentialsChain {
        let mut builder =
            DefaultCredentialsChain::builder().region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            builder = builder.profile_name(profile);
        }
        builder.build().await
    }

    fn sso_profile(region: &str, profile: &str) -> ProfileFileCredentialsProvider {
        ProfileFileCredentialsProvider::builder()
            .configure(&Self::provider_config(region))
            .profile_name(profile)
            .build()
    }

    fn sso_portal(
        region: &str,
        portal: &SsoPortal,
    ) -> Result<SsoCredentialsProvider, ProviderError> {
        let (Some(account_id), Some(role_name)) = (&portal.account_id, &portal.role_name) else {
            return Err(format!(
                "SSO portal {} needs an account ID and role name to obtain role credentials",
                portal.start_url
            )
            .into());
        };

        Ok(SsoCredentialsProvider::builder()
            .configure(&Self::provider_config(region))
            .start_url(&portal.start_url)
            .region(Region::new(portal.sso_region.clone()))
            .account_id(account_id)
            .role_name(role_name)
            .build())
    }

    async fn provide(
        provider: impl ProvideCredentials,
        region: &str,
    ) -> Result<ResolvedCredential, ProviderError> {
        let credentials = provider
            .provide_credentials()
            .await
            .map_err(|e| DisplayErrorContext(e).to_string())?;
        Ok(convert(&credentials, region))
    }
}

impl Default for AwsSdkProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn convert(credentials: &Credentials, region: &str) -> ResolvedCredential {
    let mut resolved = ResolvedCredential::new(
        credentials.access_key_id(),
        credentials.secret_access_key(),
        region,
    );
    if let Some(token) = credentials.session_token() {
        resolved = resolved.with_session_token(token);
    }
    if let Some(expiry) = credentials.expiry() {
        resolved = resolved.with_expiry(DateTime::<Utc>::from(expiry));
    }
    resolved
}

#[async_trait]
impl IdentityProvider for AwsSdkProvider {
    fn name(&self) -> &str {
        "aws-sdk"
    }

    async fn credentials(
        &self,
        region: &str,
        request: &ProviderRequest,
    ) -> Result<ResolvedCredential, ProviderError> {
        match request {
            ProviderRequest::PlatformChain => {
                Self::provide(Self::platform_chain(region), region).await
            }
            ProviderRequest::DefaultChain { profile } => {
                let chain = Self::default_chain(region, profile.as_deref()).await;
                Self::provide(chain, region).await
            }
            ProviderRequest::SsoProfile { profile } => {
                Self::provide(Self::sso_profile(region, profile), region).await
            }
            ProviderRequest::SsoPortal(portal) => {
                Self::provide(Self::sso_portal(region, portal)?, region).await
            }
        }
    }

    async fn caller_identity(
        &self,
        credential: &ResolvedCredential,
    ) -> Result<CallerIdentity, ProviderError> {
        let credentials = Credentials::new(
            credential.access_key_id(),
            credential.secret_access_key(),
            credential.session_token().map(str::to_string),
            credential.expires_at().map(Into::into),
            PROVIDER_NAME,
        );

        let config = aws_sdk_sts::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(credential.region().to_string()))
            .credentials_provider(credentials)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(self.identity_timeout)
                    .build(),
            )
            .build();

        let output = aws_sdk_sts::Client::from_conf(config)
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| DisplayErrorContext(e).to_string())?;

        Ok(CallerIdentity::new(
            output.account().unwrap_or_default(),
            output.arn().unwrap_or_default(),
            output.user_id().unwrap_or_default(),
        ))
    }
}
