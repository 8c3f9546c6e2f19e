//! Individual platform signals.
//!
//! Each check is best-effort: any failure reads as `false`.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use super::ProbeSettings;

const CGROUP_MARKERS: &[&str] = &["docker", "kubepods", "containerd", "/ecs/"];

const ECS_VARS: &[&str] = &[
    "ECS_CONTAINER_METADATA_URI_V4",
    "ECS_CONTAINER_METADATA_URI",
    "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI",
    "AWS_CONTAINER_CREDENTIALS_FULL_URI",
];

const KUBERNETES_HOST_VAR: &str = "KUBERNETES_SERVICE_HOST";

const IMDS_TOKEN_PATH: &str = "/latest/api/token";
const IMDS_ROLE_PATH: &str = "/latest/meta-data/iam/security-credentials/";
const IMDS_TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const IMDS_TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

pub(super) async fn is_container(settings: &ProbeSettings) -> bool {
    for marker in &settings.container_markers {
        if exists(marker).await {
            tracing::debug!("Container marker found: {}", marker.display());
            return true;
        }
    }

    match tokio::fs::read_to_string(&settings.cgroup_path).await {
        Ok(content) => CGROUP_MARKERS.iter().any(|m| content.contains(m)),
        Err(e) => {
            tracing::debug!("cgroup file unreadable ({}): {}", settings.cgroup_path.display(), e);
            false
        }
    }
}

pub(super) fn is_ecs(settings: &ProbeSettings) -> bool {
    settings.env.any_set(ECS_VARS)
}

pub(super) async fn is_eks(settings: &ProbeSettings) -> bool {
    settings.env.non_empty(KUBERNETES_HOST_VAR).is_some()
        && exists(&settings.service_account_token).await
}

pub(super) async fn has_cli(settings: &ProbeSettings) -> bool {
    let status = Command::new(&settings.cli_program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();

    match tokio::time::timeout(settings.cli_timeout, status).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(e)) => {
            tracing::debug!("{} --version failed: {}", settings.cli_program, e);
            false
        }
        Err(_) => {
            tracing::debug!(
                "{} --version timed out after {:?}",
                settings.cli_program,
                settings.cli_timeout
            );
            false
        }
    }
}

pub(super) async fn has_instance_role(settings: &ProbeSettings) -> bool {
    if settings.metadata_disabled {
        return false;
    }

    match tokio::time::timeout(settings.metadata_timeout, query_instance_role(settings)).await {
        Ok(Ok(found)) => found,
        Ok(Err(e)) => {
            tracing::debug!("Instance metadata probe failed: {}", e);
            false
        }
        Err(_) => {
            tracing::debug!(
                "Instance metadata probe timed out after {:?}",
                settings.metadata_timeout
            );
            false
        }
    }
}

async fn query_instance_role(settings: &ProbeSettings) -> Result<bool, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(settings.metadata_timeout)
        .no_proxy()
        .build()?;

    // IMDSv2 session token; IMDSv1-only hosts answer the role listing without one.
    let token = match client
        .put(settings.metadata_url(IMDS_TOKEN_PATH))
        .header(IMDS_TOKEN_TTL_HEADER, "60")
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => resp.text().await.ok(),
        _ => None,
    };

    let mut request = client.get(settings.metadata_url(IMDS_ROLE_PATH));
    if let Some(token) = token.as_deref() {
        request = request.header(IMDS_TOKEN_HEADER, token);
    }

    let response = request.send().await?;
    Ok(response.status().is_success())
}
