use anyhow::Result;
use clap::{Parser, Subcommand};

/// pensum - course access and completion gating
#[derive(Parser)]
#[command(name = "pensum")]
#[command(about = "Course catalog, chapter access and progress tracking", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = pensum::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    pensum::observability::init_observability("pensum", env!("CARGO_PKG_VERSION"), &config.log)?;

    match cli.command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
    }
}

#[tracing::instrument(skip(config))]
async fn serve_command(
    config: pensum::config::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    pensum::cli::serve(config, host_override, port_override).await
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: pensum::config::Config) -> Result<()> {
    pensum::cli::migrate(config).await
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: pensum::config::Config) -> Result<()> {
    pensum::cli::reset(config).await
}
