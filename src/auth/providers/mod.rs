//! Identity provider implementations.

#[cfg(feature = "aws")]
mod aws;
mod explicit;

#[cfg(feature = "aws")]
pub use aws::AwsSdkProvider;
pub use explicit::ExplicitProvider;
