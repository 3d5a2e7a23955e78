//! Types de données pour le crate parcelle

use geo::Polygon;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ParcelleError;

/// Collection de parcelles telle que renvoyée par le service cadastral
#[derive(Debug, Clone, Default)]
pub struct ParcelCollection {
    /// Parcelles décodées, dans l'ordre de la réponse
    pub features: Vec<ParcelFeature>,

    /// Corps JSON brut (réémis tel quel dans les réponses)
    pub raw: Value,
}

impl ParcelCollection {
    /// Décode un corps de réponse FeatureCollection.
    ///
    /// Un corps sans tableau `features` est une collection vide. Les entrées
    /// qui ne sont pas des objets JSON sont ignorées.
    pub fn from_value(raw: Value) -> Result<Self, ParcelleError> {
        let features = match raw.get("features") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().filter_map(ParcelFeature::from_json).collect(),
            Some(other) => {
                return Err(ParcelleError::InvalidCollection(format!(
                    "`features` should be an array, got {}",
                    json_kind(other)
                )))
            }
        };

        Ok(Self { features, raw })
    }

    /// Décode depuis des bytes JSON
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParcelleError> {
        let raw: Value = serde_json::from_slice(bytes)?;
        Self::from_value(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }
}

/// Une parcelle cadastrale avec ses attributs et sa géométrie brute
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelFeature {
    /// Identifiant unique de parcelle (IDU), absent si vide ou manquant
    pub idu: Option<String>,

    /// Attributs cadastraux
    pub attributes: ParcelAttributes,

    /// Géométrie GeoJSON brute (peut être absente ou invalide)
    pub geometry: Option<Value>,

    /// Emprise fournie par le service, si présente
    pub bbox: Option<Vec<f64>>,

    /// Feature JSON brute
    pub raw: Value,
}

impl ParcelFeature {
    /// Construit une parcelle depuis une feature GeoJSON brute.
    ///
    /// Retourne `None` si la valeur n'est pas un objet.
    pub fn from_json(raw: &Value) -> Option<Self> {
        let object = raw.as_object()?;
        let empty = Map::new();
        let props = object
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let idu = prop_string(props, "idu").filter(|s| !s.is_empty());

        let attributes = ParcelAttributes {
            numero: prop_string(props, "numero"),
            section: prop_string(props, "section"),
            feuille: prop_i64(props, "feuille"),
            contenance: prop_f64(props, "contenance"),
            code_insee: prop_string(props, "code_insee"),
            nom_commune: prop_string(props, "nom_com"),
            code_departement: prop_string(props, "code_dep"),
        };

        let geometry = object.get("geometry").filter(|g| !g.is_null()).cloned();

        let bbox = object.get("bbox").and_then(Value::as_array).and_then(|values| {
            values.iter().map(Value::as_f64).collect::<Option<Vec<f64>>>()
        });

        Some(Self {
            idu,
            attributes,
            geometry,
            bbox,
            raw: raw.clone(),
        })
    }
}

/// Attributs d'une parcelle, nommés comme dans les réponses exposées
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelAttributes {
    pub numero: Option<String>,
    pub section: Option<String>,
    pub feuille: Option<i64>,
    /// Surface cadastrale en m²
    pub contenance: Option<f64>,
    pub code_insee: Option<String>,
    pub nom_commune: Option<String>,
    pub code_departement: Option<String>,
}

/// Empreinte de bâtiment reconstruite depuis le graphe Overpass
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingFeature {
    /// Identifiant du way OSM
    pub id: i64,

    /// Jeu de données d'origine
    pub source: String,

    /// Polygone fermé (au moins 4 coordonnées)
    pub polygon: Polygon<f64>,
}

/// Emprise géographique en degrés
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Union de deux emprises
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }

    /// Format `S,W,N,E` attendu par Overpass
    pub fn to_overpass(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

/// Niveau de confiance de la résolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Un seul bâtiment, une seule parcelle touchée
    SingleConfirmed,
    /// Plusieurs parcelles, bâtiments, ou un bâtiment à cheval
    MultiParcel,
    /// Pas assez d'information (typiquement aucun bâtiment)
    Uncertain,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::SingleConfirmed => "SINGLE_CONFIRMED",
            Mode::MultiParcel => "MULTI_PARCEL",
            Mode::Uncertain => "UNCERTAIN",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn prop_string(props: &Map<String, Value>, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn prop_f64(props: &Map<String, Value>, key: &str) -> Option<f64> {
    match props.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn prop_i64(props: &Map<String, Value>, key: &str) -> Option<i64> {
    match props.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
