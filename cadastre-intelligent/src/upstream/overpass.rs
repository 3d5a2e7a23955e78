//! Client Overpass (bâtiments OpenStreetMap)

use std::time::Duration;

use anyhow::{Context, Result};
use parcelle::overpass::{building_query, reconstruct_buildings, OverpassResponse};
use parcelle::{BoundingBox, BuildingFeature};
use tracing::{debug, warn};

use super::{snippet, BuildingLookup, USER_AGENT};
use crate::config::ServiceConfig;

/// Client HTTP vers l'interpréteur Overpass
#[derive(Debug, Clone)]
pub struct OverpassClient {
    http: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

impl OverpassClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        // marge côté client au-delà du timeout serveur annoncé dans la requête
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.building_timeout() + Duration::from_secs(5))
            .build()
            .context("Failed to build Overpass HTTP client")?;

        Ok(Self {
            http,
            url: config.overpass_url.clone(),
            timeout_secs: config.building_timeout_secs,
        })
    }

    async fn fetch(&self, bbox: &BoundingBox) -> Result<OverpassResponse> {
        let query = building_query(bbox, self.timeout_secs);
        debug!(url = %self.url, bbox = %bbox.to_overpass(), "Querying Overpass");

        let response = self
            .http
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .context("Overpass request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Overpass HTTP {}: {}", status, snippet(&body));
        }

        response
            .json::<OverpassResponse>()
            .await
            .context("Failed to decode Overpass response")
    }
}

impl BuildingLookup for OverpassClient {
    async fn buildings(&self, bbox: &BoundingBox) -> Vec<BuildingFeature> {
        match self.fetch(bbox).await {
            Ok(response) => {
                let buildings = reconstruct_buildings(&response);
                debug!(
                    elements = response.elements.len(),
                    buildings = buildings.len(),
                    "Overpass response decoded"
                );
                buildings
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Building lookup failed, continuing without buildings");
                Vec::new()
            }
        }
    }
}
