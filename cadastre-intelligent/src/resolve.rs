//! Orchestration d'une résolution de parcelle
//!
//! ```text
//! requête point ─┬─ 0 parcelle  → élargissement 15 m ─┬─ 0 → NotFound
//!                │                                    └─ ≥1 → enrichissement
//!                ├─ 1 parcelle  → élargissement 6 m → fusion → enrichissement
//!                └─ ≥2 parcelles → enrichissement
//!
//! enrichissement : emprise → bâtiments → intersection → mode → sélection
//! ```

use geo::Point;
use parcelle::{
    build_candidates, circle_geojson, dedupe, point_geojson, union_bounds, ParcelCollection,
    Resolution, ResolutionOutcome,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::upstream::{BuildingLookup, ParcelLookup};
use crate::ServiceError;

/// Rayons d'élargissement, en mètres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveSettings {
    pub widen_empty_radius_m: f64,
    pub widen_single_radius_m: f64,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self::from(&ServiceConfig::default())
    }
}

impl From<&ServiceConfig> for ResolveSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            widen_empty_radius_m: config.widen_empty_radius_m,
            widen_single_radius_m: config.widen_single_radius_m,
        }
    }
}

/// Parcelles d'une recherche par zone
#[derive(Debug, Clone)]
pub struct ZoneResult {
    pub center: Point<f64>,
    pub radius_m: f64,
    pub collection: ParcelCollection,
}

/// Résolveur générique sur les services amont
#[derive(Debug, Clone)]
pub struct Resolver<P, B> {
    parcels: P,
    buildings: B,
    settings: ResolveSettings,
}

impl<P, B> Resolver<P, B>
where
    P: ParcelLookup + Sync,
    B: BuildingLookup + Sync,
{
    pub fn new(parcels: P, buildings: B, settings: ResolveSettings) -> Self {
        Self {
            parcels,
            buildings,
            settings,
        }
    }

    /// Résout la parcelle sous le point (lon, lat)
    pub async fn resolve(&self, lon: f64, lat: f64) -> Result<Resolution, ServiceError> {
        let query = Point::new(lon, lat);

        // La requête initiale est la seule dont l'échec est fatal
        let initial = self.parcels.parcels(&point_geojson(lon, lat)).await?;
        debug!(lon, lat, features = initial.len(), "Initial parcel query");

        let (parcels, primary_collection) = match initial.len() {
            0 => {
                let radius = self.settings.widen_empty_radius_m;
                let widened = self.widen(lon, lat, radius).await;
                match widened {
                    Some(collection) if !collection.is_empty() => {
                        debug!(radius_m = radius, features = collection.len(), "Widened query found parcels");
                        (collection.features, collection.raw)
                    }
                    _ => {
                        info!(lon, lat, "No parcel found");
                        return Ok(Resolution::NotFound);
                    }
                }
            }
            1 => {
                let radius = self.settings.widen_single_radius_m;
                let merged = match self.widen(lon, lat, radius).await {
                    Some(widened) => dedupe(&initial.features, &widened.features),
                    None => initial.features.clone(),
                };
                debug!(radius_m = radius, features = merged.len(), "Merged widened parcels");
                (merged, initial.raw)
            }
            _ => (initial.features, initial.raw),
        };

        let candidates = build_candidates(&parcels);
        let buildings = match union_bounds(candidates.iter().map(|c| &c.shape)) {
            Some(bbox) => {
                debug!(bbox = %bbox.to_overpass(), candidates = candidates.len(), "Fetching buildings");
                self.buildings.buildings(&bbox).await
            }
            None => {
                debug!("No usable parcel geometry, skipping building lookup");
                Vec::new()
            }
        };

        let outcome =
            ResolutionOutcome::assemble(&query, parcels, &candidates, buildings, primary_collection);

        info!(
            lon,
            lat,
            mode = %outcome.mode,
            selected = ?outcome.selected_parcel_id,
            parcels = outcome.parcels.len(),
            buildings = outcome.buildings.len(),
            "Parcel resolved"
        );

        Ok(Resolution::Found(outcome))
    }

    /// Toutes les parcelles dans un rayon autour du point
    pub async fn parcels_around(
        &self,
        lon: f64,
        lat: f64,
        radius_m: f64,
    ) -> Result<ZoneResult, ServiceError> {
        let collection = self
            .parcels
            .parcels_in_zone(&circle_geojson(lon, lat, radius_m))
            .await?;

        info!(lon, lat, radius_m, count = collection.len(), "Zone parcels fetched");

        Ok(ZoneResult {
            center: Point::new(lon, lat),
            radius_m,
            collection,
        })
    }

    /// Limites de la commune, relayées telles quelles
    pub async fn commune_boundary(&self, code_insee: &str) -> Result<Value, ServiceError> {
        let boundary = self.parcels.commune(code_insee).await?;
        info!(code_insee, "Commune boundary fetched");
        Ok(boundary)
    }

    /// Requête élargie. Un échec est journalisé et donne `None`.
    async fn widen(&self, lon: f64, lat: f64, radius_m: f64) -> Option<ParcelCollection> {
        match self.parcels.parcels(&circle_geojson(lon, lat, radius_m)).await {
            Ok(collection) => Some(collection),
            Err(e) => {
                warn!(radius_m, error = %e, "Widened parcel query failed, keeping previous result");
                None
            }
        }
    }
}
