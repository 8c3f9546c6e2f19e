//! Credential resolution for AWS Bedrock.
//!
//! Strategies, tried in priority order:
//! - **Platform role**: ECS task role, EKS workload identity or EC2
//!   instance role, when running in a container; validated before use
//! - **Local SSO**: a cached AWS CLI SSO session, for `sso` configs
//! - **Fallback**: static keys, else the SDK's default provider chain
//!
//! Exactly one strategy is attempted per resolution. A failure is reported
//! as-is; lower-priority strategies are never tried after it.

mod credential;
mod provider;
mod providers;
mod resolver;
mod strategy;
pub(crate) mod testing;

pub use credential::{CallerIdentity, ResolvedCredential};
pub use provider::{IdentityProvider, ProviderRequest};
#[cfg(feature = "aws")]
pub use providers::AwsSdkProvider;
pub use providers::ExplicitProvider;
pub use resolver::{CredentialResolver, Resolution, ResolverSettings};
pub use strategy::{CredentialMethod, Strategy};
