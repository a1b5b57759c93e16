mod config_commands;
mod eval_commands;
mod record_commands;
mod run_commands;

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    std::path::{Path, PathBuf},
    tooby_config::ToobyConfig,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "tooby", about = "Tooby: chat-command interpreter and Twitch bot", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of ./tooby.toml and ~/.config/tooby/).
    #[arg(long, global = true, env = "TOOBY_CONFIG")]
    config: Option<PathBuf>,

    /// Record store URL (overrides `store.database_url`).
    #[arg(long, global = true, env = "TOOBY_DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Twitch and answer commands until interrupted.
    Run,
    /// Resolve a script once and print the response.
    Eval(eval_commands::EvalArgs),
    /// Read and write stored commands, variables, quotes and settings.
    Record {
        #[command(subcommand)]
        action: record_commands::RecordAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load the explicit config file, or discover one.
fn load_config(path: Option<&Path>, database_url: Option<String>) -> anyhow::Result<ToobyConfig> {
    let mut config = match path {
        Some(path) => tooby_config::load_config(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => tooby_config::discover_and_load(),
    };
    if let Some(url) = database_url {
        config.store.database_url = url;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "tooby starting");

    let config = load_config(cli.config.as_deref(), cli.database_url)?;

    match cli.command {
        Commands::Run => run_commands::run(config).await,
        Commands::Eval(args) => eval_commands::handle_eval(args, &config).await,
        Commands::Record { action } => record_commands::handle_record(action, &config).await,
        Commands::Config { action } => config_commands::handle_config(action, cli.config.as_deref()),
    }
}
