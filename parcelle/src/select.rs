//! Choix de la parcelle retenue
//!
//! Un identifiant est toujours proposé, quel que soit le mode : l'appelant
//! calibre sa confiance avec le mode.

use geo::Point;

use crate::classify::{Candidate, IntersectionResult};
use crate::ParcelFeature;

/// Sélectionne l'IDU de la parcelle la plus probable.
///
/// 1. une seule parcelle touchée → celle-ci ;
/// 2. sinon, centroïde le plus proche du point parmi les parcelles touchées
///    (ou tous les candidats si aucune n'est touchée), à égalité le premier ;
/// 3. ensemble candidat vide → première parcelle brute (`fallback`).
pub fn select_parcel(
    query: &Point<f64>,
    candidates: &[Candidate],
    intersection: &IntersectionResult,
    fallback: Option<&ParcelFeature>,
) -> Option<String> {
    let touched = intersection.touched();

    if let [only] = touched.as_slice() {
        return candidates.get(*only).and_then(|c| c.parcel.idu.clone());
    }

    let pool: Vec<&Candidate> = if touched.is_empty() {
        candidates.iter().collect()
    } else {
        touched.iter().filter_map(|&i| candidates.get(i)).collect()
    };

    match nearest(query, &pool) {
        Some(candidate) => candidate.parcel.idu.clone(),
        None => fallback.and_then(|f| f.idu.clone()),
    }
}

/// Candidat au centroïde le plus proche, le premier à égalité
fn nearest<'a>(query: &Point<f64>, pool: &[&'a Candidate]) -> Option<&'a Candidate> {
    let (first, rest) = pool.split_first()?;
    let mut best = *first;
    let mut best_distance = first.shape.distance_to(query);

    for &candidate in rest {
        let distance = candidate.shape.distance_to(query);
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }

    Some(best)
}
