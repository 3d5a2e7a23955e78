//! Services amont (API Carto, Overpass)
//!
//! Les traits [`ParcelLookup`] et [`BuildingLookup`] isolent le transport :
//! l'orchestration ne connaît que ces deux points d'entrée.

pub mod apicarto;
pub mod overpass;

use std::future::Future;

use parcelle::{BoundingBox, BuildingFeature, ParcelCollection};
use serde_json::Value;

use crate::ServiceError;

pub use apicarto::ApiCartoClient;
pub use overpass::OverpassClient;

/// User-Agent envoyé aux services amont
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Recherche cadastrale : parcelles par filtre géométrique (Point ou Polygon
/// GeoJSON), limites de commune
pub trait ParcelLookup {
    /// Parcelles intersectant la géométrie. Une erreur de transport est remontée.
    fn parcels(
        &self,
        geom: &Value,
    ) -> impl Future<Output = Result<ParcelCollection, ServiceError>> + Send;

    /// Variante pour les recherches par zone (potentiellement plus lentes)
    fn parcels_in_zone(
        &self,
        geom: &Value,
    ) -> impl Future<Output = Result<ParcelCollection, ServiceError>> + Send {
        self.parcels(geom)
    }

    /// Limites d'une commune (FeatureCollection brute)
    fn commune(
        &self,
        code_insee: &str,
    ) -> impl Future<Output = Result<Value, ServiceError>> + Send;
}

/// Recherche d'empreintes de bâtiments.
///
/// Ne remonte jamais d'erreur : un service indisponible donne une liste vide.
pub trait BuildingLookup {
    fn buildings(&self, bbox: &BoundingBox) -> impl Future<Output = Vec<BuildingFeature>> + Send;
}

/// Tronque un corps d'erreur pour les logs
pub(crate) fn snippet(body: &str) -> String {
    const MAX: usize = 256;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
