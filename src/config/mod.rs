//! Credential configuration: wire shape, validated form, and parser.
//!
//! ```rust
//! use bedrock_credentials::config::{AuthType, ConfigParser};
//!
//! let parser = ConfigParser::new();
//! let config = parser
//!     .parse(r#"{"authType":"sso","region":"us-west-2","profile":"bedrock-dev"}"#)
//!     .unwrap();
//! assert_eq!(config.auth_type(), AuthType::Sso);
//! assert_eq!(config.profile(), Some("bedrock-dev"));
//! ```

pub mod env;
mod parser;
mod types;

pub use env::{EnvSource, ProcessEnv, env_table};
pub use parser::ConfigParser;
pub use types::{
    AuthType, AutoConfig, CredentialConfig, RawCredentialConfig, SsoConfig, SsoPortal, SsoSource,
    StaticConfig, StaticKeys,
};
