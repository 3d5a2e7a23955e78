//! Intersection bâtiments × parcelles et classification de confiance

use std::collections::HashSet;

use crate::dedup::parcel_key;
use crate::{BuildingFeature, Mode, ParcelFeature, Shape};

/// Parcelle candidate avec sa forme exploitable
#[derive(Debug, Clone)]
pub struct Candidate {
    pub parcel: ParcelFeature,
    pub shape: Shape,
}

/// Construit l'ensemble candidat.
///
/// Seules les parcelles surfaciques (Polygon, MultiPolygon) sont retenues.
/// Une géométrie absente, invalide ou ponctuelle est écartée (la parcelle
/// reste dans le listing brut). L'identité est unique : le premier vu l'emporte.
pub fn build_candidates(parcels: &[ParcelFeature]) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(parcels.len());

    for parcel in parcels {
        let shape = Shape::from_geojson(parcel.geometry.as_ref());
        if !shape.is_area() {
            tracing::debug!(idu = ?parcel.idu, empty = shape.is_empty(), "Parcel excluded from geometric processing");
            continue;
        }
        if !seen.insert(parcel_key(parcel)) {
            continue;
        }
        candidates.push(Candidate {
            parcel: parcel.clone(),
            shape,
        });
    }

    candidates
}

/// Résultat du filtrage par intersection
#[derive(Debug, Clone, Default)]
pub struct IntersectionResult {
    /// Nombre de bâtiments conservés touchant chaque candidat (même ordre)
    pub touch_counts: Vec<usize>,

    /// Bâtiments intersectant au moins une parcelle candidate
    pub buildings: Vec<BuildingFeature>,
}

impl IntersectionResult {
    /// Indices des candidats touchés, dans l'ordre des candidats
    pub fn touched(&self) -> Vec<usize> {
        self.touch_counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn touched_count(&self) -> usize {
        self.touch_counts.iter().filter(|&&count| count > 0).count()
    }
}

/// Garde les bâtiments qui touchent au moins un candidat et compte les
/// parcelles touchées. Un bâtiment qui ne touche rien est hors zone.
pub fn filter_buildings(
    buildings: Vec<BuildingFeature>,
    candidates: &[Candidate],
) -> IntersectionResult {
    let mut touch_counts = vec![0usize; candidates.len()];
    let mut kept = Vec::new();

    for building in buildings {
        let mut hit = false;
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate.shape.intersects_polygon(&building.polygon) {
                touch_counts[i] += 1;
                hit = true;
            }
        }
        if hit {
            kept.push(building);
        }
    }

    IntersectionResult {
        touch_counts,
        buildings: kept,
    }
}

/// Classification, première règle satisfaite
pub fn classify(parcel_count: usize, building_count: usize, touched_count: usize) -> Mode {
    if building_count == 1 && touched_count == 1 {
        Mode::SingleConfirmed
    } else if parcel_count > 1 || building_count > 1 || touched_count > 1 {
        Mode::MultiParcel
    } else {
        Mode::Uncertain
    }
}

/// Classifie un résultat d'intersection
pub fn classify_result(candidates: &[Candidate], result: &IntersectionResult) -> Mode {
    classify(
        candidates.len(),
        result.buildings.len(),
        result.touched_count(),
    )
}
