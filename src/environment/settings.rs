//! Probe settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{EnvSource, ProcessEnv};

pub const DEFAULT_METADATA_ENDPOINT: &str = "http://169.254.169.254";
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_CLI_TIMEOUT: Duration = Duration::from_secs(5);

const CONTAINER_MARKERS: &[&str] = &["/.dockerenv", "/run/.containerenv"];
const CGROUP_PATH: &str = "/proc/1/cgroup";
const SERVICE_ACCOUNT_TOKEN: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const CLI_PROGRAM: &str = "aws";

/// Where and how the environment probe looks.
#[derive(Clone, Debug)]
pub struct ProbeSettings {
    pub container_markers: Vec<PathBuf>,
    pub cgroup_path: PathBuf,
    pub service_account_token: PathBuf,
    pub cli_program: String,
    pub cli_timeout: Duration,
    pub metadata_endpoint: String,
    pub metadata_timeout: Duration,
    /// Skip the instance metadata probe entirely.
    pub metadata_disabled: bool,
    pub env: Arc<dyn EnvSource>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            container_markers: CONTAINER_MARKERS.iter().map(PathBuf::from).collect(),
            cgroup_path: PathBuf::from(CGROUP_PATH),
            service_account_token: PathBuf::from(SERVICE_ACCOUNT_TOKEN),
            cli_program: CLI_PROGRAM.to_string(),
            cli_timeout: DEFAULT_CLI_TIMEOUT,
            metadata_endpoint: DEFAULT_METADATA_ENDPOINT.to_string(),
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            metadata_disabled: false,
            env: Arc::new(ProcessEnv),
        }
    }
}

impl ProbeSettings {
    /// Defaults, honoring `AWS_EC2_METADATA_SERVICE_ENDPOINT` and
    /// `AWS_EC2_METADATA_DISABLED`.
    pub fn from_env() -> Self {
        Self::default().apply_env_overrides()
    }

    /// Replace the environment lookup and re-apply its overrides.
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self.apply_env_overrides()
    }

    fn apply_env_overrides(mut self) -> Self {
        if let Some(endpoint) = self.env.non_empty("AWS_EC2_METADATA_SERVICE_ENDPOINT") {
            self.metadata_endpoint = endpoint;
        }
        if self.env.flag("AWS_EC2_METADATA_DISABLED") {
            self.metadata_disabled = true;
        }
        self
    }

    pub fn with_container_markers(mut self, markers: impl IntoIterator<Item = PathBuf>) -> Self {
        self.container_markers = markers.into_iter().collect();
        self
    }

    pub fn with_cgroup_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cgroup_path = path.into();
        self
    }

    pub fn with_service_account_token(mut self, path: impl Into<PathBuf>) -> Self {
        self.service_account_token = path.into();
        self
    }

    pub fn with_cli_program(mut self, program: impl Into<String>) -> Self {
        self.cli_program = program.into();
        self
    }

    pub fn with_cli_timeout(mut self, timeout: Duration) -> Self {
        self.cli_timeout = timeout;
        self
    }

    pub fn with_metadata_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.metadata_endpoint = endpoint.into();
        self
    }

    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }

    pub fn disable_metadata(mut self) -> Self {
        self.metadata_disabled = true;
        self
    }

    pub(crate) fn metadata_url(&self, path: &str) -> String {
        format!("{}{}", self.metadata_endpoint.trim_end_matches('/'), path)
    }
}
