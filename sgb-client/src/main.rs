use anyhow::Context;
use clap::Parser;
use sgb_client::interactive::prompt_inputs;
use sgb_client::{BroadcastDispatcher, ConsoleObserver, RawInputs};
use sgb_core::SettingsLoader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "sgb-client")]
#[command(about = "Send a short text command to one host or every host of a local subnet")]
struct Args {
    /// Port the listeners are bound to
    #[arg(short = 'p', long)]
    port: Option<String>,

    /// Subnet template, wildcard octets set to 0 (e.g. 192.168.1.0)
    #[arg(short = 's', long)]
    subnet: Option<String>,

    /// Single host to message instead of a subnet
    #[arg(short = 'i', long)]
    ip: Option<String>,

    /// Message to send
    #[arg(short = 'm', long)]
    message: Option<String>,

    /// Settings file (TOML)
    #[arg(short = 'c', long, env = "SGB_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Any command-line argument at all switches to console mode
fn console_mode<I, T>(argv: I) -> bool
where
    I: IntoIterator<Item = T>,
{
    argv.into_iter().nth(1).is_some()
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let console = console_mode(std::env::args_os());

    // Initialize logging - SGB_LOG overrides, verbose raises to debug
    let filter = std::env::var("SGB_LOG")
        .unwrap_or_else(|_| if args.verbose { "debug" } else { "warn" }.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = SettingsLoader::load_or_default(args.config.as_deref())
        .context("Failed to load settings")?;
    let defaults = settings.client;

    let raw = if console {
        RawInputs {
            port: args
                .port
                .clone()
                .unwrap_or_else(|| defaults.default_port.to_string()),
            subnet: Some(
                args.subnet
                    .clone()
                    .unwrap_or_else(|| defaults.default_subnet.clone()),
            ),
            ip: args.ip.clone(),
            message: args.message.clone().unwrap_or_default(),
        }
    } else {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        prompt_inputs(&mut input, &mut output, &defaults).context("Failed to read input")?
    };

    if console {
        println!("SGB Client - Console Mode");
    }
    println!("-------------------------");
    println!(
        "Message: {}\nSubnet: {}\nPort: {}",
        raw.message,
        raw.ip.as_deref().or(raw.subnet.as_deref()).unwrap_or(""),
        raw.port
    );
    println!("-------------------------");

    let inputs = match raw.validate() {
        Ok(inputs) => inputs,
        Err(e) => {
            tracing::debug!("{}", e);
            println!("Status: Messaging Failed");
            println!("One or more of the inputs are invalid. Please try again.");
            println!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("Status: Messaging OK");

    tracing::info!(
        "Messaging {} host(s) at {} on port {}",
        inputs.target.host_count(),
        inputs.target,
        inputs.port
    );

    // Ctrl-C stops new sends; attempts already started still finish
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let dispatcher = BroadcastDispatcher::new(defaults.max_in_flight, Arc::new(ConsoleObserver));
    dispatcher
        .dispatch(inputs.target.addresses(), inputs.port, &inputs.message, &cancel)
        .await;

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_argument_selects_console_mode() {
        assert!(!console_mode(["sgb-client"]));
        assert!(console_mode(["sgb-client", "-v"]));
        assert!(console_mode(["sgb-client", "-c", "sgb.toml"]));
        assert!(console_mode(["sgb-client", "-m", "restart"]));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["sgb-client", "-s", "10.0.0.0", "-m", "hi"]).unwrap();
        assert_eq!(args.subnet.as_deref(), Some("10.0.0.0"));
        assert_eq!(args.message.as_deref(), Some("hi"));
        assert!(args.port.is_none());
    }
}
