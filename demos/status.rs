//! Credential status example - report which credential source applies here.
//!
//! Run with: cargo run --example status -- '{"authType":"auto","region":"us-east-1"}'
//!
//! With no argument, an `auto` config in the ambient region is checked.

use std::sync::Arc;

use bedrock_credentials::{AwsSdkProvider, CredentialResolver, EnvironmentProbe, StatusReporter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bedrock_credentials=info,warn".into()),
        )
        .init();

    let raw = std::env::args()
        .nth(1)
        .unwrap_or_else(|| r#"{"authType":"auto"}"#.to_string());

    let probe = Arc::new(EnvironmentProbe::from_env());
    let resolver = Arc::new(CredentialResolver::new(probe, Arc::new(AwsSdkProvider::new())));
    let reporter = StatusReporter::new(resolver);

    let status = reporter.check_raw_status(&raw).await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    let profiles = reporter.list_local_profiles().await;
    if profiles.is_empty() {
        println!("No local AWS profiles");
    } else {
        println!("Local AWS profiles: {}", profiles.join(", "));
    }

    Ok(())
}
