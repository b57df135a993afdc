//! Variant Tracker - Clinical variant tracking API with a redacted audit trail.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use variant_tracker::config::{AppConfig, ConfigLoader};
use variant_tracker::redact::Redactor;
use variant_tracker::server::{ApiServer, AppState};
use variant_tracker::store::Database;

#[derive(Parser)]
#[command(
    name = "variant-tracker",
    about = "Clinical variant tracking API with a redacted audit trail",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a config file (defaults to the standard search paths).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve {
        /// Host address to bind to.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print a redacted copy of a JSON document.
    Redact {
        /// JSON file to read; reads stdin when omitted.
        file: Option<PathBuf>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn load_config(path: Option<PathBuf>) -> Result<AppConfig, BoxError> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    Ok(loader.load()?)
}

async fn serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<(), BoxError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let db = Database::open(&config.database.path).await?;
    let state = AppState::new(db, &config)?;
    let server = ApiServer::new(state, config.server.clone());

    let cancel = server.cancel_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        tracing::info!("Received Ctrl-C");
        cancel.cancel();
    });

    server.run().await?;
    Ok(())
}

fn redact(config: &AppConfig, file: Option<PathBuf>) -> Result<(), BoxError> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let value: serde_json::Value = serde_json::from_str(&input)?;
    let redacted = Redactor::new(&config.redaction).redact_owned(&value);
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match load_config(cli.config) {
        Ok(config) => match cli.command {
            Commands::Serve { host, port } => serve(config, host, port).await,
            Commands::Redact { file } => redact(&config, file),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "variant-tracker failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
