mod config;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use palaver_auth::CredentialStore;
use palaver_relay::{RelayState, server};

#[derive(Parser)]
#[command(name = "palaver", about = "Palaver — multiuser text-chat relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server.
    Serve {
        /// Listen address; overrides the config file.
        #[arg(long, env = "PALAVER_BIND")]
        bind: Option<String>,
        /// Listen port; overrides the config file.
        #[arg(long, env = "PALAVER_PORT")]
        port: Option<u16>,
        /// Credential file (`username:password` lines); overrides the
        /// config file.
        #[arg(long, env = "PALAVER_USERS")]
        users: Option<PathBuf>,
    },
    /// Validate a credential file and report what it contains.
    CheckUsers {
        #[arg(default_value = "users.txt")]
        path: PathBuf,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    match cli.command {
        Commands::Serve { bind, port, users } => {
            let config = config::discover_and_load();
            let bind = bind.unwrap_or(config.server.bind);
            let port = port.unwrap_or(config.server.port);
            let users = users.unwrap_or(config.server.users_file);

            let credentials = CredentialStore::load(&users)?;
            if credentials.is_empty() {
                anyhow::bail!("no usable credentials in {}", users.display());
            }
            info!(
                users = credentials.len(),
                path = %users.display(),
                "credentials loaded"
            );

            let state = RelayState::new(credentials);
            server::start(&bind, port, state).await
        },
        Commands::CheckUsers { path } => {
            let credentials = CredentialStore::load(&path)?;
            println!("{}: {} user(s)", path.display(), credentials.len());
            Ok(())
        },
    }
}
