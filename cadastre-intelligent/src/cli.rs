//! Définition et implémentation des commandes CLI
//!
//! - `serve` (défaut) : API HTTP
//! - `resolve` : une résolution, réponse JSON sur stdout

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use cadastre_intelligent::resolve::{ResolveSettings, Resolver};
use cadastre_intelligent::response::ResolveResponse;
use cadastre_intelligent::upstream::{ApiCartoClient, OverpassClient};
use cadastre_intelligent::{server, ServiceConfig};

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address (défaut : env LISTEN_ADDR / 0.0.0.0:8000)
        #[arg(long)]
        listen: Option<String>,
    },

    /// Resolve the parcel under a GPS point and print the JSON response
    Resolve {
        /// Longitude (WGS84)
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Latitude (WGS84)
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },
}

/// Exécute la commande serve
pub async fn cmd_serve(mut config: ServiceConfig, listen: Option<String>) -> Result<()> {
    if let Some(listen) = listen {
        config.listen_addr = listen;
    }

    server::serve(&config).await
}

/// Exécute la commande resolve
pub async fn cmd_resolve(config: ServiceConfig, lon: f64, lat: f64) -> Result<()> {
    let resolver = Resolver::new(
        ApiCartoClient::new(&config)?,
        OverpassClient::new(&config)?,
        ResolveSettings::from(&config),
    );

    let resolution = resolver.resolve(lon, lat).await?;
    let body = serde_json::to_string_pretty(&ResolveResponse::from(&resolution))
        .context("Failed to serialize response")?;

    info!(lon, lat, "Resolution done");
    println!("{}", body);

    Ok(())
}
