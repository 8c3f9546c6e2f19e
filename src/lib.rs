//! # bedrock-credentials
//!
//! Credential resolution for Amazon Bedrock model invocation across developer
//! machines (AWS CLI SSO sessions, profile files, static keys) and production
//! container platforms (ECS task roles, EKS workload identity, EC2 instance roles).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bedrock_credentials::{
//!     AwsSdkProvider, ConfigParser, CredentialResolver, EnvironmentProbe, StatusReporter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bedrock_credentials::Error> {
//!     let config = ConfigParser::new().parse(r#"{"authType":"auto","region":"us-east-1"}"#)?;
//!
//!     let probe = Arc::new(EnvironmentProbe::from_env());
//!     let resolver = Arc::new(CredentialResolver::new(probe, Arc::new(AwsSdkProvider::new())));
//!
//!     let credential = resolver.resolve(&config).await?;
//!     println!("resolved {} in {}", credential.access_key_id(), credential.region());
//!
//!     let status = StatusReporter::new(resolver).check_status(&config).await;
//!     println!("{}", serde_json::to_string_pretty(&status).unwrap_or_default());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod config;
pub mod environment;
pub mod status;

pub use auth::{
    CallerIdentity, CredentialMethod, CredentialResolver, ExplicitProvider, IdentityProvider,
    ProviderRequest, Resolution, ResolvedCredential, ResolverSettings, Strategy,
};
#[cfg(feature = "aws")]
pub use auth::AwsSdkProvider;
pub use config::{
    AuthType, AutoConfig, ConfigParser, CredentialConfig, EnvSource, ProcessEnv, SsoConfig,
    SsoPortal, SsoSource, StaticConfig, StaticKeys,
};
pub use environment::{EnvironmentInfo, EnvironmentProbe, ProbeSettings};
pub use status::{CredentialStatus, StatusReporter};

/// Boxed cause reported by an [`IdentityProvider`].
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for credential parsing and resolution.
///
/// Every message names the offending field or the strategy that failed so an
/// operator can act on it without reading logs.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is not a JSON object or has a field of the wrong type.
    #[error("Malformed credential configuration: {reason}")]
    MalformedConfig { reason: String },

    /// No region in the configuration nor in AWS_REGION / AWS_DEFAULT_REGION.
    #[error(
        "Missing region: set \"region\" in the configuration or AWS_REGION / AWS_DEFAULT_REGION"
    )]
    MissingRegion,

    /// Only one half of an access key pair was supplied.
    #[error(
        "Incomplete static credentials: \"{missing}\" is required when \"{present}\" is set"
    )]
    IncompleteStaticCredentials {
        present: &'static str,
        missing: &'static str,
    },

    /// SSO mode without a profile or a start URL + SSO region pair.
    #[error("Incomplete SSO configuration: {reason}")]
    IncompleteSsoConfig { reason: String },

    /// Credentials were obtained but the identity check rejected them.
    #[error("Credential validation failed ({strategy} strategy): {source}")]
    CredentialValidationFailed {
        strategy: auth::Strategy,
        #[source]
        source: ProviderError,
    },

    /// The underlying provider could not produce credentials.
    #[error("Credential resolution failed ({strategy} strategy): {source}")]
    CredentialResolutionFailed {
        strategy: auth::Strategy,
        #[source]
        source: ProviderError,
    },
}

/// Error category for mapping onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller supplied an invalid configuration (4xx).
    Input,
    /// Environment or upstream identity service failure (5xx).
    Dependency,
}

impl Error {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedConfig {
            reason: reason.into(),
        }
    }

    pub fn incomplete_sso(reason: impl Into<String>) -> Self {
        Error::IncompleteSsoConfig {
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MalformedConfig { .. }
            | Error::MissingRegion
            | Error::IncompleteStaticCredentials { .. }
            | Error::IncompleteSsoConfig { .. } => ErrorCategory::Input,

            Error::CredentialValidationFailed { .. } | Error::CredentialResolutionFailed { .. } => {
                ErrorCategory::Dependency
            }
        }
    }

    pub fn is_caller_error(&self) -> bool {
        self.category() == ErrorCategory::Input
    }

    /// Strategy that produced the error, if it came from resolution.
    pub fn strategy(&self) -> Option<auth::Strategy> {
        match self {
            Error::CredentialValidationFailed { strategy, .. }
            | Error::CredentialResolutionFailed { strategy, .. } => Some(*strategy),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
