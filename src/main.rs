use kakao_local_mcp::{Config, KakaoLocalServer, LocalClient};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // stdout carries the MCP stream
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::from_env()?;
    let client = LocalClient::new(&config)?;

    tracing::info!(api_base = %config.api_base, "starting kakao-local-mcp on stdio");

    let service = KakaoLocalServer::new(client).serve(stdio()).await?;
    service.waiting().await?;

    tracing::info!("kakao-local-mcp stopped");
    Ok(())
}
