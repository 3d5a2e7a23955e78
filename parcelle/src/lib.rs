//! # parcelle
//!
//! Résolution de la parcelle cadastrale occupée par un bâtiment, à partir
//! d'un point GPS et des empreintes de bâtiments voisines.
//!
//! ## Features
//!
//! - Cercle de recherche approximatif (32 sommets) pour les requêtes par rayon
//! - Fusion sans doublon des résultats de requêtes élargies (IDU ou hash de géométrie)
//! - Reconstruction des bâtiments depuis le graphe nodes/ways d'Overpass
//! - Intersection bâtiments × parcelles, classification de confiance
//! - Sélection d'une parcelle unique
//!
//! Aucun appel réseau ici : les réponses des services sont passées en entrée.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parcelle::{build_candidates, ParcelCollection, ResolutionOutcome};
//!
//! let collection = ParcelCollection::from_slice(&body)?;
//! let candidates = build_candidates(&collection.features);
//! let bbox = parcelle::union_bounds(candidates.iter().map(|c| &c.shape));
//! // ... requête Overpass sur `bbox` ...
//! let outcome = ResolutionOutcome::assemble(&point, collection.features, &candidates, buildings, collection.raw);
//! println!("{} -> {:?}", outcome.mode, outcome.selected_parcel_id);
//! ```

pub mod bbox;
pub mod circle;
pub mod classify;
pub mod dedup;
pub mod error;
pub mod outcome;
pub mod overpass;
pub mod select;
pub mod shape;
pub mod types;

pub use bbox::union_bounds;
pub use circle::{circle_geojson, circle_polygon, point_geojson};
pub use classify::{build_candidates, classify, filter_buildings, Candidate, IntersectionResult};
pub use dedup::dedupe;
pub use error::ParcelleError;
pub use outcome::{Resolution, ResolutionOutcome};
pub use select::select_parcel;
pub use shape::Shape;
pub use types::{BoundingBox, BuildingFeature, Mode, ParcelAttributes, ParcelCollection, ParcelFeature};
