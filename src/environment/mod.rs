//! Runtime platform detection.
//!
//! Signals gathered:
//! - **Container**: marker files or a container runtime in `/proc/1/cgroup`
//! - **ECS**: task metadata / container credential variables
//! - **EKS**: mounted service-account token plus `KUBERNETES_SERVICE_HOST`
//! - **AWS CLI**: `aws --version` succeeds
//! - **Instance role**: the EC2 metadata service lists a role
//!
//! The platform does not change during a process's life, so a probe
//! computes its [`EnvironmentInfo`] once and returns the same value afterward.

mod detect;
mod settings;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

pub use settings::{
    DEFAULT_CLI_TIMEOUT, DEFAULT_METADATA_ENDPOINT, DEFAULT_METADATA_TIMEOUT, ProbeSettings,
};

/// Detected platform facts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    pub is_container: bool,
    pub is_ecs: bool,
    pub is_eks: bool,
    pub has_aws_cli: bool,
    pub has_instance_role: bool,
}

impl EnvironmentInfo {
    /// A local machine with nothing detected.
    pub fn bare() -> Self {
        Self::default()
    }

    /// Running in a container whose platform injects a role.
    pub fn has_platform_role(&self) -> bool {
        self.is_container && (self.is_ecs || self.is_eks || self.has_instance_role)
    }

    /// Running in a container under ECS or EKS.
    pub fn has_orchestrator_role(&self) -> bool {
        self.is_container && (self.is_ecs || self.is_eks)
    }

    pub fn platform_name(&self) -> &'static str {
        match (self.is_container, self.is_ecs, self.is_eks) {
            (true, true, _) => "ecs",
            (true, _, true) => "eks",
            (true, _, _) => "container",
            (false, _, _) => "host",
        }
    }
}

/// Detects the runtime platform once per instance.
#[derive(Debug)]
pub struct EnvironmentProbe {
    settings: ProbeSettings,
    info: OnceCell<EnvironmentInfo>,
}

impl EnvironmentProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            settings,
            info: OnceCell::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ProbeSettings::from_env())
    }

    /// Probe pre-seeded with known facts; [`detect`](Self::detect) never probes.
    pub fn with_info(info: EnvironmentInfo) -> Self {
        Self {
            settings: ProbeSettings::default(),
            info: OnceCell::new_with(Some(info)),
        }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Detected facts, probing on the first call only.
    ///
    /// Concurrent first callers share a single probe run.
    pub async fn detect(&self) -> EnvironmentInfo {
        *self
            .info
            .get_or_init(|| Self::probe(&self.settings))
            .await
    }

    /// Facts from a completed probe, without probing.
    pub fn cached(&self) -> Option<EnvironmentInfo> {
        self.info.get().copied()
    }

    async fn probe(settings: &ProbeSettings) -> EnvironmentInfo {
        let (is_container, is_eks, has_aws_cli, has_instance_role) = tokio::join!(
            detect::is_container(settings),
            detect::is_eks(settings),
            detect::has_cli(settings),
            detect::has_instance_role(settings),
        );

        let info = EnvironmentInfo {
            is_container,
            is_ecs: detect::is_ecs(settings),
            is_eks,
            has_aws_cli,
            has_instance_role,
        };

        tracing::debug!(
            platform = info.platform_name(),
            is_container = info.is_container,
            is_ecs = info.is_ecs,
            is_eks = info.is_eks,
            has_aws_cli = info.has_aws_cli,
            has_instance_role = info.has_instance_role,
            "Environment detected"
        );
        info
    }
}

impl Default for EnvironmentProbe {
    fn default() -> Self {
        Self::from_env()
    }
}
