use ec2ops_gateway::config::{GatewayConfig, ProviderKind};
use ec2ops_gateway::features::deferred_delivery::repo::ReqwestCallbackRepository;
use ec2ops_gateway::server::{self, AppState};
use ec2ops_providers::sigv4::AwsCredentials;
use ec2ops_providers::{ComputeProvider, Ec2ComputeProvider, InMemoryComputeProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const EC2_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        region = %config.region,
        command = %config.slash_command,
        provider = ?config.provider,
        "Starting ec2ops gateway"
    );

    let provider: Arc<dyn ComputeProvider> = match config.provider {
        ProviderKind::Ec2 => {
            let credentials = AwsCredentials::from_env()?;
            Arc::new(Ec2ComputeProvider::new(
                credentials,
                &config.region,
                config.ec2_endpoint.as_deref(),
                EC2_REQUEST_TIMEOUT,
            )?)
        }
        ProviderKind::Memory => {
            warn!("Using in-memory compute provider; no real instances are managed");
            Arc::new(InMemoryComputeProvider::new())
        }
    };

    let callbacks = Arc::new(ReqwestCallbackRepository::new(config.callback_timeout)?);
    let state = AppState::build(provider, &config.region, &config.slash_command, callbacks)?;

    server::serve(config.bind_addr, state).await?;
    Ok(())
}
