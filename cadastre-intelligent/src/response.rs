//! Corps JSON exposés par l'API

use parcelle::{
    BuildingFeature, Mode, ParcelAttributes, ParcelFeature, Resolution, ResolutionOutcome,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::resolve::ZoneResult;

/// Message renvoyé quand aucune parcelle n'est trouvée
pub const NOT_FOUND_MESSAGE: &str = "Aucune parcelle trouvée à ces coordonnées";

/// Réponse de `/api/cadastre/parcelle`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResolveResponse {
    Found(Box<FoundResponse>),
    NotFound(NotFoundResponse),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundResponse {
    pub success: bool,
    pub mode: Mode,
    pub selected_parcel_id: Option<String>,
    pub parcelles: Vec<ParcelEntry>,
    pub parcelles_geojson: Value,
    pub buildings: Vec<BuildingEntry>,

    // Champs historiques : première parcelle trouvée
    pub parcelle: Option<ParcelSummary>,
    pub geometry: Option<Value>,
    pub bbox: Option<Vec<f64>>,
    pub geojson: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotFoundResponse {
    pub success: bool,
    pub message: String,
}

/// Attributs d'une parcelle avec son IDU
#[derive(Debug, Clone, Serialize)]
pub struct ParcelSummary {
    pub idu: Option<String>,
    #[serde(flatten)]
    pub attributes: ParcelAttributes,
}

/// Parcelle du listing complet
#[derive(Debug, Clone, Serialize)]
pub struct ParcelEntry {
    #[serde(flatten)]
    pub summary: ParcelSummary,
    pub geometry: Option<Value>,
}

/// Bâtiment conservé
#[derive(Debug, Clone, Serialize)]
pub struct BuildingEntry {
    pub id: i64,
    pub source: String,
    pub geometry: geojson::Geometry,
}

/// Réponse de `/api/cadastre/parcelles-zone`
#[derive(Debug, Clone, Serialize)]
pub struct ZoneResponse {
    pub success: bool,
    pub count: usize,
    pub radius_m: f64,
    pub center: [f64; 2],
    pub parcelles: Vec<ZoneParcel>,
    pub geojson: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneParcel {
    pub idu: Option<String>,
    pub numero: Option<String>,
    pub section: Option<String>,
    pub contenance: Option<f64>,
    pub geometry: Option<Value>,
}

impl From<&ParcelFeature> for ParcelSummary {
    fn from(parcel: &ParcelFeature) -> Self {
        Self {
            idu: parcel.idu.clone(),
            attributes: parcel.attributes.clone(),
        }
    }
}

impl From<&ParcelFeature> for ParcelEntry {
    fn from(parcel: &ParcelFeature) -> Self {
        Self {
            summary: ParcelSummary::from(parcel),
            geometry: parcel.geometry.clone(),
        }
    }
}

impl From<&BuildingFeature> for BuildingEntry {
    fn from(building: &BuildingFeature) -> Self {
        Self {
            id: building.id,
            source: building.source.clone(),
            geometry: geojson::Geometry::new(geojson::Value::from(&building.polygon)),
        }
    }
}

impl From<&ParcelFeature> for ZoneParcel {
    fn from(parcel: &ParcelFeature) -> Self {
        Self {
            idu: parcel.idu.clone(),
            numero: parcel.attributes.numero.clone(),
            section: parcel.attributes.section.clone(),
            contenance: parcel.attributes.contenance,
            geometry: parcel.geometry.clone(),
        }
    }
}

impl From<&ResolutionOutcome> for FoundResponse {
    fn from(outcome: &ResolutionOutcome) -> Self {
        let primary = outcome.primary.as_ref();

        Self {
            success: true,
            mode: outcome.mode,
            selected_parcel_id: outcome.selected_parcel_id.clone(),
            parcelles: outcome.parcels.iter().map(ParcelEntry::from).collect(),
            parcelles_geojson: feature_collection(&outcome.parcels),
            buildings: outcome.buildings.iter().map(BuildingEntry::from).collect(),
            parcelle: primary.map(ParcelSummary::from),
            geometry: primary.and_then(|p| p.geometry.clone()),
            bbox: primary.and_then(|p| p.bbox.clone()),
            geojson: outcome.primary_collection.clone(),
        }
    }
}

impl From<&Resolution> for ResolveResponse {
    fn from(resolution: &Resolution) -> Self {
        match resolution {
            Resolution::Found(outcome) => {
                ResolveResponse::Found(Box::new(FoundResponse::from(outcome)))
            }
            Resolution::NotFound => ResolveResponse::NotFound(NotFoundResponse {
                success: false,
                message: NOT_FOUND_MESSAGE.to_string(),
            }),
        }
    }
}

impl From<&ZoneResult> for ZoneResponse {
    fn from(zone: &ZoneResult) -> Self {
        Self {
            success: true,
            count: zone.collection.len(),
            radius_m: zone.radius_m,
            center: [zone.center.x(), zone.center.y()],
            parcelles: zone.collection.features.iter().map(ZoneParcel::from).collect(),
            geojson: zone.collection.raw.clone(),
        }
    }
}

/// FeatureCollection des features brutes
fn feature_collection(parcels: &[ParcelFeature]) -> Value {
    let features: Vec<&Value> = parcels.iter().map(|p| &p.raw).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
