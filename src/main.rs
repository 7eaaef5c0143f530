use anyhow::Result;
use clap::Parser;
use omnilogic_exporter::{config::Config, server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// OmniLogic API URL (overrides config)
    #[arg(long, env = "OMNILOGIC_URL")]
    omnilogic_url: Option<String>,

    /// OmniLogic username (overrides config)
    #[arg(long, env = "OMNILOGIC_USERNAME")]
    omnilogic_username: Option<String>,

    /// OmniLogic password (overrides config)
    #[arg(long, env = "OMNILOGIC_PASSWORD")]
    omnilogic_password: Option<String>,

    /// Timeout in seconds for OmniLogic API calls
    #[arg(long, env = "OMNILOGIC_TIMEOUT")]
    omnilogic_timeout: Option<u64>,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT", default_value = "9190")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "EXPORTER_ADDR", default_value = "0.0.0.0")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting OmniLogic Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(url) = args.omnilogic_url {
        config.omnilogic.url = url;
    }
    if let Some(username) = args.omnilogic_username {
        config.omnilogic.username = username;
    }
    if let Some(password) = args.omnilogic_password {
        config.omnilogic.password = secrecy::SecretString::new(password.into());
    }
    if let Some(timeout) = args.omnilogic_timeout {
        config.omnilogic.timeout_seconds = timeout;
    }
    config.server.port = args.port;
    config.server.addr = args.addr;

    info!("Configuration loaded successfully");
    info!("OmniLogic endpoint: {}", config.omnilogic.url);
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
