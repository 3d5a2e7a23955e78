//! Point d'entrée CLI pour cadastre-intelligent

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use cadastre_intelligent::ServiceConfig;

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Résolution de parcelle cadastrale sous un point GPS
#[derive(Parser)]
#[command(name = "cadastre-intelligent")]
#[command(author, version)]
#[command(about = "Retrouver la parcelle cadastrale d'un point GPS (API Carto + OpenStreetMap)")]
#[command(long_about = "Service HTTP de résolution de parcelle.\n\nPar défaut, lance l'API. Utilisez 'resolve' pour une résolution ponctuelle.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Fichier de configuration JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sous-commande (défaut: serve)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let config = ServiceConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Resolve { lon, lat }) => {
            info!(lon, lat, "Résolution ponctuelle");
            cli::cmd_resolve(config, lon, lat).await?;
        }
        Some(Commands::Serve { listen }) => {
            cli::cmd_serve(config, listen).await?;
        }
        None => {
            cli::cmd_serve(config, None).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
