//! Résultat d'une résolution de parcelle

use geo::Point;
use serde_json::Value;

use crate::classify::{classify_result, filter_buildings, Candidate};
use crate::select::select_parcel;
use crate::{BuildingFeature, Mode, ParcelFeature};

/// Issue d'une résolution
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Au moins une parcelle trouvée
    Found(ResolutionOutcome),
    /// Aucune parcelle, même après élargissement
    NotFound,
}

/// Résolution complète, construite une fois et jamais modifiée
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub mode: Mode,

    /// IDU retenu (peut être absent si la parcelle n'a pas d'IDU)
    pub selected_parcel_id: Option<String>,

    /// Toutes les parcelles récupérées, géométrie invalide comprise
    pub parcels: Vec<ParcelFeature>,

    /// Bâtiments touchant au moins une parcelle candidate
    pub buildings: Vec<BuildingFeature>,

    /// Première parcelle trouvée (compatibilité des champs historiques)
    pub primary: Option<ParcelFeature>,

    /// FeatureCollection brute de la requête ayant fourni `primary`
    pub primary_collection: Value,
}

impl ResolutionOutcome {
    /// Filtre les bâtiments, classifie et sélectionne la parcelle
    pub fn assemble(
        query: &Point<f64>,
        parcels: Vec<ParcelFeature>,
        candidates: &[Candidate],
        buildings: Vec<BuildingFeature>,
        primary_collection: Value,
    ) -> Self {
        let intersection = filter_buildings(buildings, candidates);
        let mode = classify_result(candidates, &intersection);
        let primary = parcels.first().cloned();
        let selected_parcel_id =
            select_parcel(query, candidates, &intersection, primary.as_ref());

        tracing::debug!(
            parcels = parcels.len(),
            candidates = candidates.len(),
            buildings = intersection.buildings.len(),
            touched = intersection.touched_count(),
            mode = %mode,
            "Classified parcel candidates"
        );

        Self {
            mode,
            selected_parcel_id,
            parcels,
            buildings: intersection.buildings,
            primary,
            primary_collection,
        }
    }
}
