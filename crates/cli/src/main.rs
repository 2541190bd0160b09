use clap::Parser;
use ferrous_doh_api::AppState;
use ferrous_doh_domain::{CliOverrides, UpstreamProtocol};
use tracing::info;

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "ferrous-doh")]
#[command(version)]
#[command(about = "Ferrous DoH - DNS-over-HTTPS stub proxy with EDNS Client-Subnet")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// HTTP listen address, e.g. 127.0.0.1:8053
    #[arg(short = 'l', long, value_name = "ADDR")]
    listen: Option<String>,

    /// Upstream resolver address, e.g. 8.8.8.8:53
    #[arg(short = 'u', long, value_name = "ADDR")]
    upstream: Option<String>,

    /// Upstream protocol (udp, tcp)
    #[arg(short = 'p', long)]
    protocol: Option<UpstreamProtocol>,

    /// Disable the response cache
    #[arg(long)]
    no_cache: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        listen_address: cli.listen,
        upstream_address: cli.upstream,
        upstream_protocol: cli.protocol,
        disable_cache: cli.no_cache,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Ferrous DoH v{}", env!("CARGO_PKG_VERSION"));

    let listen_addr = config.listen_addr()?;
    let services = di::DohServices::new(&config)?;
    let app_state = AppState::new(services.resolve.clone());

    server::start_web_server(listen_addr, app_state, services.link.clone()).await?;

    info!("Server shutdown complete");
    Ok(())
}
