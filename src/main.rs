use clap::Parser;
use std::net::SocketAddr;
use swagtomock::adapters::document_loader::DocumentLoader;
use swagtomock::cli::Cli;
use swagtomock::config::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    // Load description documents
    let documents = DocumentLoader::new(&settings.folder).load()?;

    // Create application using the library function
    let app = swagtomock::create_app(&settings, documents)?;

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Server running on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
