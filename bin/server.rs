// Subscription Calendar - Web Server

use anyhow::{Context, Result};
use flexi_logger::Logger;
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;
use subscription_calendar::load_suitable_config;
use subscription_calendar::server::{app, AppState};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "subcal-server",
    about = "Subscription Calendar web server (in-memory, one session per process)."
)]
struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    configfile: Option<PathBuf>,

    #[structopt(long = "addr", help = "bind address, overrides server_addr from the config")]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::from_args();

    let config = load_suitable_config(args.configfile.as_deref())
        .context("Failed to load configuration")?;
    let _logger = Logger::try_with_env_or_str(&config.log_level)?.start()?;

    println!("🌐 Subscription Calendar - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let addr = args.addr.unwrap_or_else(|| config.server_addr.clone());
    let state = AppState::new(config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on {}", addr);

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/events", addr);
    println!("   Subscriptions are kept in memory and lost on exit");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app(state))
        .await
        .context("Server failed")?;

    Ok(())
}
