use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use chain_dashboard::config::Settings;
use chain_dashboard::{logging, server, AsyncDashboard, Dashboard};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Listen address, overriding `server.address`.
    #[arg(long, value_name = "ADDR")]
    address: Option<SocketAddr>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(address) = args.address {
        settings.server.address = address;
    }

    if args.print_config {
        let mut shown = settings.clone();
        shown.booking_api.password = redact(&shown.booking_api.password);
        shown.auth.password = redact(&shown.auth.password);
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    logging::init_tracing(&settings.logging);
    let address = settings.server.address;
    info!(version = env!("CARGO_PKG_VERSION"), "starting chain-dashboard");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;

    runtime.block_on(async move {
        let dashboard = AsyncDashboard::build(Dashboard::builder(settings))
            .await
            .context("initializing dashboard")?;
        server::serve(dashboard, address)
            .await
            .context("serving HTTP")?;
        Ok::<(), anyhow::Error>(())
    })
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
