use anyhow::Context;
use clap::Parser;
use sgb_core::{network, SettingsLoader};
use sgb_server::data::prepare_data_dir;
use sgb_server::logging::init_logging;
use sgb_server::{CommandRouter, CommandTable, ConnectionListener, ListenerConfig, ShellLauncher};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "sgb-server")]
#[command(about = "Run the mapped command for messages from whitelisted hosts")]
struct Args {
    /// Address to bind (default: first local IPv4 address)
    #[arg(short = 'i', long)]
    ip: Option<Ipv4Addr>,

    /// Port to listen on
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Directory holding the command table, whitelist and logs
    #[arg(short = 'd', long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(short = 'c', long, env = "SGB_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = SettingsLoader::load_or_default(args.config.as_deref())
        .context("Failed to load settings")?
        .server;
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }
    anyhow::ensure!(settings.port != 0, "Port must be in range 1-65535");

    init_logging(args.verbose, Some(&settings.logs_dir()));
    prepare_data_dir(&settings).context("Failed to prepare data directory")?;

    let ip = match args.ip {
        Some(ip) => ip,
        None => network::first_local_ipv4().map_err(|e| {
            error!("{}", e);
            e
        })?,
    };
    let addr = SocketAddr::from((ip, settings.port));

    let router = CommandRouter::new(settings.commands_path(), Arc::new(ShellLauncher));
    let listener = ConnectionListener::bind(addr, ListenerConfig::from_settings(&settings), router)
        .await
        .map_err(|e| {
            error!("{}", e);
            e
        })?;

    println!("SGB Server");
    println!("-------------------------");
    println!("Listening on: {}", listener.local_addr()?);
    println!("Commands: {}", settings.commands_path().display());
    match CommandTable::load(settings.commands_path()) {
        Ok(table) if table.is_empty() => println!("  (no triggers configured)"),
        Ok(table) => {
            for (trigger, command) in table.iter() {
                println!("  {trigger} -=> {command}");
            }
        }
        Err(e) => warn!("{}", e),
    }
    println!("Whitelist: {}", settings.whitelist_path().display());
    println!("-------------------------");

    tokio::select! {
        result = listener.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    Ok(())
}
