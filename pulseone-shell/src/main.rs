//! Pulse One shell
//!
//! Mounts the client core the way the dashboard shell does (session check
//! plus branding load), runs one command and unmounts.
//!
//! Usage:
//!   pulseone status
//!   pulseone login admin@pulseone.com admin123
//!   pulseone visit /documents
//!   pulseone branding css
//!   pulseone branding save branding.json

mod commands;

use clap::{Parser, Subcommand};
use log::{error, info};
use pulseone_core::api::HttpApiClient;
use pulseone_core::{AppContext, ClientConfig, CredentialStore, MemoryCredentialStore};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "pulseone")]
#[command(about = "Pulse One client shell - session and branding")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides config and PULSE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keep credentials in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the resolved session
    Status,
    /// Sign in with email and password
    Login { email: String, password: String },
    /// Sign out and clear stored credentials
    Logout,
    /// Ask the route guard about a path
    Visit { path: String },
    /// Inspect or change branding
    Branding {
        #[command(subcommand)]
        action: BrandingAction,
    },
}

#[derive(Subcommand, Debug)]
enum BrandingAction {
    /// Print the applied settings and style variables
    Show,
    /// Print the applied theme as CSS
    Css,
    /// Save settings from a JSON file
    Save { file: PathBuf },
    /// Restore server-side defaults
    Reset,
}

/// Set up env_logger, writing to the data directory when possible
fn init_logging(config: &ClientConfig, verbose: bool) -> Option<PathBuf> {
    let log_level = if verbose || std::env::var("RUST_LOG").is_ok() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let log_path = config
        .data_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .map(|dir| dir.join("pulseone.log"));

    let log_file = log_path.as_ref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match log_file {
        Some(file) => {
            env_logger::Builder::from_default_env()
                .filter_level(log_level)
                .format_timestamp_millis()
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
            log_path
        }
        None => {
            // Fallback to stderr if file logging fails
            env_logger::Builder::from_default_env()
                .filter_level(log_level)
                .format_timestamp_millis()
                .init();
            None
        }
    }
}

fn build_context(config: ClientConfig, ephemeral: bool) -> Result<AppContext, String> {
    if ephemeral {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        let api = HttpApiClient::new(&config, store.clone())
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;
        Ok(AppContext::with_parts(config, store, Arc::new(api)))
    } else {
        AppContext::new(config).map_err(|e| format!("Failed to initialize: {}", e))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("Serialize error: {}", e))?;
    println!("{}", json);
    Ok(())
}

async fn run(app: &AppContext, command: Command) -> Result<(), String> {
    app.mount().await;

    match command {
        Command::Status => print_json(&commands::status(app)?),
        Command::Login { email, password } => {
            let response = commands::login(app, &email, &password).await?;
            print_json(&response)?;
            if response.success {
                Ok(())
            } else {
                Err(response.error.unwrap_or_default())
            }
        }
        Command::Logout => print_json(&commands::logout(app)?),
        Command::Visit { path } => print_json(&commands::visit(app, &path)?),
        Command::Branding { action } => match action {
            BrandingAction::Show => print_json(&commands::branding_show(app)?),
            BrandingAction::Css => {
                print!("{}", commands::branding_css(app)?);
                Ok(())
            }
            BrandingAction::Save { file } => {
                print_json(&commands::branding_save(app, &file).await?)
            }
            BrandingAction::Reset => print_json(&commands::branding_reset(app).await?),
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = pulseone_core::load_config().with_env_overrides();
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let log_path = init_logging(&config, cli.verbose);
    info!("========================================");
    info!("Starting Pulse One shell v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &log_path {
        info!("Log file: {}", path.display());
    }
    info!("API: {}", config.api_base_url);

    let app = match build_context(config, cli.ephemeral) {
        Ok(app) => app,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&app, cli.command).await;
    app.unmount();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
