//! Client API Carto (module cadastre de l'IGN)

use std::time::Duration;

use anyhow::{Context, Result};
use parcelle::ParcelCollection;
use serde_json::Value;
use tracing::debug;

use super::{snippet, ParcelLookup, USER_AGENT};
use crate::config::ServiceConfig;
use crate::ServiceError;

const SERVICE: &str = "API Carto";

/// Client HTTP vers `/api/cadastre/parcelle`
#[derive(Debug, Clone)]
pub struct ApiCartoClient {
    http: reqwest::Client,
    endpoint: String,
    commune_endpoint: String,
    timeout: Duration,
    zone_timeout: Duration,
}

impl ApiCartoClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build API Carto HTTP client")?;

        let base = config.apicarto_url.trim_end_matches('/');

        Ok(Self {
            http,
            endpoint: format!("{}/api/cadastre/parcelle", base),
            commune_endpoint: format!("{}/api/cadastre/commune", base),
            timeout: config.parcel_timeout(),
            zone_timeout: config.zone_timeout(),
        })
    }

    /// Requête `?geom=<GeoJSON>` avec un timeout donné
    pub async fn fetch(&self, geom: &Value, timeout: Duration) -> Result<ParcelCollection, ServiceError> {
        let geom = serde_json::to_string(geom).map_err(|e| ServiceError::Internal(e.into()))?;

        debug!(endpoint = %self.endpoint, geom = %geom, "Querying parcels");

        let body = self.get(&self.endpoint, &[("geom", geom.as_str())], timeout).await?;

        // Corps 2xx illisible : erreur serveur, pas indisponibilité amont
        ParcelCollection::from_slice(&body)
            .map_err(|e| ServiceError::Internal(anyhow::Error::new(e).context("Invalid API Carto response")))
    }

    /// GET brut, statut non 2xx → `Upstream`
    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<bytes::Bytes, ServiceError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ServiceError::upstream(SERVICE, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::upstream(SERVICE, e))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(ServiceError::upstream(
                SERVICE,
                format!("HTTP {}: {}", status, snippet(&text)),
            ));
        }

        Ok(body)
    }
}

impl ParcelLookup for ApiCartoClient {
    async fn parcels(&self, geom: &Value) -> Result<ParcelCollection, ServiceError> {
        self.fetch(geom, self.timeout).await
    }

    async fn parcels_in_zone(&self, geom: &Value) -> Result<ParcelCollection, ServiceError> {
        self.fetch(geom, self.zone_timeout).await
    }

    async fn commune(&self, code_insee: &str) -> Result<Value, ServiceError> {
        debug!(endpoint = %self.commune_endpoint, code_insee, "Querying commune boundary");

        let body = self
            .get(&self.commune_endpoint, &[("code_insee", code_insee)], self.timeout)
            .await?;

        serde_json::from_slice(&body)
            .map_err(|e| ServiceError::Internal(anyhow::Error::new(e).context("Invalid API Carto response")))
    }
}
