use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    AdminCommand, ConfigCommand, ImageCommand, RecordsCommand, SeedCommand, SubmitCommand,
};
use zentra_site::config::Config;
use zentra_site::email::EmailSender;
use zentra_site::local::{seed_defaults, SqliteStore};
use zentra_site::store::DataStore;
use zentra_site::submit::SubmissionService;

#[derive(Parser)]
#[command(name = "zentra")]
#[command(version)]
#[command(about = "Manage the Zentra Holdings website data", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage site records
    Records(RecordsCommand),

    /// Submit bookings and reviews as a site visitor would
    Submit(SubmitCommand),

    /// Admin account operations
    Admin(AdminCommand),

    /// Upload images
    Image(ImageCommand),

    /// Fill empty collections with demo content
    Seed(SeedCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zentra_site=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Opens the local store, seeding demo content into empty collections.
async fn open_local(config: &Config) -> Result<Arc<SqliteStore>, Box<dyn std::error::Error>> {
    let local = Arc::new(SqliteStore::open(&config.database_path.value).await?);
    seed_defaults(local.as_ref()).await?;
    Ok(local)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Records(cmd)) => {
            let store = DataStore::from_config(&config.firebase, open_local(&config).await?);
            cmd.run(&store).await?;
        }
        Some(Commands::Submit(cmd)) => {
            let store = DataStore::from_config(&config.firebase, open_local(&config).await?);
            let service = SubmissionService::new(store, EmailSender::new(config.email.clone()));
            cmd.run(&service).await?;
        }
        Some(Commands::Admin(cmd)) => {
            let store = DataStore::from_config(&config.firebase, open_local(&config).await?);
            cmd.run(&store).await?;
        }
        Some(Commands::Image(cmd)) => {
            let store = DataStore::from_config(&config.firebase, open_local(&config).await?);
            cmd.run(&store).await?;
        }
        Some(Commands::Seed(cmd)) => {
            let local = SqliteStore::open(&config.database_path.value).await?;
            cmd.run(&local).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
