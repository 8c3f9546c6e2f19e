//! Credential status reporting.
//!
//! Read-only diagnostics for health checks and UIs. Nothing here returns an
//! error: failures are folded into [`CredentialStatus::error`].

mod profiles;

use std::path::PathBuf;
use std::sync::Arc;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::auth::{CallerIdentity, CredentialMethod, CredentialResolver};
use crate::config::{ConfigParser, CredentialConfig};
use crate::environment::EnvironmentInfo;

pub use profiles::parse_profile_names;

const AWS_DIR: &str = ".aws";
const CONFIG_FILE: &str = "config";
const CONFIG_FILE_VAR: &str = "AWS_CONFIG_FILE";

/// Snapshot of whether credentials can be obtained right now.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub available: bool,
    pub method: CredentialMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<CallerIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub environment: EnvironmentInfo,
}

impl CredentialStatus {
    fn available(method: CredentialMethod, identity: CallerIdentity, env: EnvironmentInfo) -> Self {
        Self {
            available: true,
            method,
            identity: Some(identity),
            error: None,
            environment: env,
        }
    }

    fn unavailable(method: CredentialMethod, error: String, env: EnvironmentInfo) -> Self {
        Self {
            available: false,
            method,
            identity: None,
            error: Some(error),
            environment: env,
        }
    }
}

/// Non-throwing facade over a [`CredentialResolver`].
#[derive(Debug)]
pub struct StatusReporter {
    resolver: Arc<CredentialResolver>,
    parser: ConfigParser,
    aws_config_file: Option<PathBuf>,
}

impl StatusReporter {
    /// Reporter whose raw-config parsing reads the probe's environment.
    pub fn new(resolver: Arc<CredentialResolver>) -> Self {
        let parser = ConfigParser::with_env(Arc::clone(&resolver.probe().settings().env));
        Self {
            resolver,
            parser,
            aws_config_file: None,
        }
    }

    pub fn with_parser(mut self, parser: ConfigParser) -> Self {
        self.parser = parser;
        self
    }

    /// Read profiles from `path` instead of `AWS_CONFIG_FILE` / `~/.aws/config`.
    pub fn with_aws_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.aws_config_file = Some(path.into());
        self
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// Resolve and verify credentials for `config`.
    pub async fn check_status(&self, config: &CredentialConfig) -> CredentialStatus {
        let env = self.resolver.environment().await;

        let resolution = match self.resolver.resolve_detailed(config).await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!("Credential status: unavailable: {}", e);
                let method = CredentialMethod::classify(&env, config);
                return CredentialStatus::unavailable(method, e.to_string(), env);
            }
        };

        if let Some(identity) = resolution.identity {
            return CredentialStatus::available(resolution.method, identity, env);
        }

        match self.resolver.verify(&resolution.credential).await {
            Ok(identity) => CredentialStatus::available(resolution.method, identity, env),
            Err(e) => {
                tracing::warn!(
                    strategy = %resolution.strategy,
                    "Credential status: identity check failed: {}",
                    e
                );
                CredentialStatus::unavailable(
                    resolution.method,
                    format!("Identity check failed ({} strategy): {}", resolution.strategy, e),
                    env,
                )
            }
        }
    }

    /// Parse `raw` and report its status; parse errors report method `none`.
    pub async fn check_raw_status(&self, raw: &str) -> CredentialStatus {
        match self.parser.parse(raw) {
            Ok(config) => self.check_status(&config).await,
            Err(e) => {
                let env = self.resolver.environment().await;
                CredentialStatus::unavailable(CredentialMethod::None, e.to_string(), env)
            }
        }
    }

    /// Profiles declared in the local AWS config file.
    ///
    /// Always empty inside a container.
    pub async fn list_local_profiles(&self) -> Vec<String> {
        if self.resolver.environment().await.is_container {
            return Vec::new();
        }

        let Some(path) = self.config_file_path() else {
            return Vec::new();
        };

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_profile_names(&content),
            Err(e) => {
                tracing::debug!("Cannot read AWS config file {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn config_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.aws_config_file {
            return Some(path.clone());
        }
        if let Some(path) = self.resolver.probe().settings().env.non_empty(CONFIG_FILE_VAR) {
            return Some(expand_home(&path));
        }
        BaseDirs::new().map(|dirs| dirs.home_dir().join(AWS_DIR).join(CONFIG_FILE))
    }
}

/// Expand a leading `~` to the home directory; other paths are kept as-is.
fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match BaseDirs::new() {
        Some(dirs) if rest.is_empty() => dirs.home_dir().to_path_buf(),
        Some(dirs) => dirs.home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;
    use crate::auth::ExplicitProvider;
    use crate::auth::testing::helpers::RecordingProvider;
    use crate::config::{AutoConfig, StaticKeys, env_table};
    use crate::environment::{EnvironmentProbe, ProbeSettings};

    fn reporter(env: EnvironmentInfo, provider: ExplicitProvider) -> StatusReporter {
        let resolver = CredentialResolver::new(
            Arc::new(EnvironmentProbe::with_info(env)),
            Arc::new(provider),
        );
        StatusReporter::new(Arc::new(resolver))
    }

    fn role_keys() -> StaticKeys {
        StaticKeys::new("ASIAROLE", "role-secret").with_session_token("role-token")
    }

    #[tokio::test]
    async fn test_available_with_identity() {
        let identity =
            CallerIdentity::new("123456789012", "arn:aws:iam::123456789012:user/dev", "AIDA1");
        let status = reporter(
            EnvironmentInfo::bare(),
            ExplicitProvider::new(role_keys()).with_identity(identity.clone()),
        )
        .check_status(&AutoConfig::new("us-east-1").into())
        .await;
        assert!(status.available);
        assert_eq!(status.method, CredentialMethod::DefaultChain);
        assert_eq!(status.identity, Some(identity));
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn test_identity_failure_is_unavailable() {
        let status = reporter(
            EnvironmentInfo::bare(),
            ExplicitProvider::new(role_keys()).with_identity_error("InvalidClientTokenId"),
        )
        .check_status(&AutoConfig::new("us-east-1").into())
        .await;
        assert!(!status.available);
        assert!(status.error.unwrap().contains("InvalidClientTokenId"));
    }

    #[tokio::test]
    async fn test_platform_identity_reused() {
        let env = EnvironmentInfo {
            is_container: true,
            is_eks: true,
            ..Default::default()
        };
        let provider = Arc::new(RecordingProvider::new(ExplicitProvider::new(role_keys())));
        let resolver = CredentialResolver::new(
            Arc::new(EnvironmentProbe::with_info(env)),
            provider.clone(),
        );
        let reporter = StatusReporter::new(Arc::new(resolver));

        let status = reporter
            .check_status(&AutoConfig::new("us-east-1").into())
            .await;
        assert!(status.available);
        assert_eq!(status.method, CredentialMethod::OrchestratorRole);
        assert_eq!(provider.identity_checks(), 1);
    }

    #[tokio::test]
    async fn test_raw_status_parse_error() {
        let status = reporter(EnvironmentInfo::bare(), ExplicitProvider::new(role_keys()))
            .with_parser(ConfigParser::with_env(HashMap::<String, String>::new()))
            .check_raw_status(r#"{"authType":"auto"}"#)
            .await;
        assert!(!status.available);
        assert_eq!(status.method, CredentialMethod::None);
        assert!(status.error.unwrap().contains("region"));
        assert_eq!(status.environment, EnvironmentInfo::bare());
    }

    #[tokio::test]
    async fn test_status_serialization() {
        let status = reporter(
            EnvironmentInfo::bare(),
            ExplicitProvider::failing("no credentials in chain"),
        )
        .check_status(&AutoConfig::new("us-east-1").into())
        .await;

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["available"], false);
        assert_eq!(json["method"], "default_chain");
        assert!(json.get("identity").is_none());
        assert_eq!(json["environment"]["isContainer"], false);
    }

    #[tokio::test]
    async fn test_list_profiles_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "[default]\n[profile dev]\n").unwrap();

        let local = reporter(EnvironmentInfo::bare(), ExplicitProvider::new(role_keys()))
            .with_aws_config_file(&path);
        assert_eq!(local.list_local_profiles().await, vec!["default", "dev"]);
    }

    #[test]
    fn test_config_file_from_env_var() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom-config");
        std::fs::write(&path, "[profile ci]\n").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let settings = ProbeSettings::default()
            .with_env(env_table([("AWS_CONFIG_FILE", path_str.as_str())]))
            .disable_metadata();
        let resolver = CredentialResolver::new(
            Arc::new(EnvironmentProbe::new(settings)),
            Arc::new(ExplicitProvider::new(role_keys())),
        );
        let reporter = StatusReporter::new(Arc::new(resolver));

        assert_eq!(reporter.config_file_path(), Some(path));
    }

    #[test]
    fn test_config_file_env_var_expands_home() {
        let settings = ProbeSettings::default()
            .with_env(env_table([("AWS_CONFIG_FILE", "~/custom/config")]))
            .disable_metadata();
        let resolver = CredentialResolver::new(
            Arc::new(EnvironmentProbe::new(settings)),
            Arc::new(ExplicitProvider::new(role_keys())),
        );
        let reporter = StatusReporter::new(Arc::new(resolver));

        let expected = BaseDirs::new().map(|dirs| dirs.home_dir().join("custom/config"));
        assert_eq!(reporter.config_file_path(), expected);
    }

    #[test]
    fn test_expand_home() {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        if let Some(home) = home {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/.aws/config"), home.join(".aws/config"));
        }
        assert_eq!(expand_home("/etc/aws/config"), PathBuf::from("/etc/aws/config"));
        assert_eq!(expand_home("~other/config"), PathBuf::from("~other/config"));
        assert_eq!(expand_home("config~"), PathBuf::from("config~"));
    }

    #[tokio::test]
    async fn test_list_profiles_missing_file_or_container() {
        let dir = TempDir::new().unwrap();
        let missing = reporter(EnvironmentInfo::bare(), ExplicitProvider::new(role_keys()))
            .with_aws_config_file(dir.path().join("missing"));
        assert!(missing.list_local_profiles().await.is_empty());

        let path = dir.path().join("config");
        std::fs::write(&path, "[default]\n").unwrap();
        let container = EnvironmentInfo {
            is_container: true,
            ..Default::default()
        };
        let in_container = reporter(container, ExplicitProvider::new(role_keys()))
            .with_aws_config_file(&path);
        assert!(in_container.list_local_profiles().await.is_empty());
    }
}
