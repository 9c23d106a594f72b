mod check_command;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "beacon", about = "Beacon: keep Telegram accounts online on command")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (beacon.toml / .yaml / .json). Discovered when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Connect the accounts and serve control commands (default).
    Run,
    /// Validate configuration and list usable account slots.
    Check,
}

/// `RUST_LOG` wins over `--log-level`.
fn init_telemetry(log_level: &str, json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(false).compact()).init();
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = match &cli.config {
        Some(path) => beacon_config::load_config(path)?,
        None => beacon_config::discover_and_load(),
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let resolved = beacon_config::resolve_from_env(settings)?;
            beacon_telegram::serve(resolved).await
        },
        Commands::Check => check_command::handle_check(settings),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli.log_level, cli.json_logs);

    info!(version = env!("CARGO_PKG_VERSION"), "beacon starting");

    let result = run(&cli).await;
    if let Err(e) = &result {
        error!(error = %e, "fatal error, exiting");
    }
    result
}
