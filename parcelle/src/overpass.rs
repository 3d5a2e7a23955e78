//! Reconstruction des empreintes de bâtiments depuis une réponse Overpass
//!
//! Overpass renvoie un graphe : les nodes portent les coordonnées, les ways
//! référencent des nodes dans l'ordre. Chaque way est résolu en anneau,
//! fermé automatiquement si besoin.

use std::collections::HashMap;

use geo::{Coord, LineString, Polygon};
use serde::Deserialize;

use crate::BuildingFeature;

/// Tag de source des bâtiments issus d'OpenStreetMap
pub const OSM_SOURCE: &str = "osm";

/// Nombre minimal de coordonnées d'un anneau fermé
pub const MIN_RING_COORDS: usize = 4;

/// Réponse JSON Overpass
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// Élément Overpass (node ou way)
#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub nodes: Vec<i64>,
}

/// Requête Overpass QL des ways `building` dans l'emprise (S,W,N,E)
pub fn building_query(bbox: &crate::BoundingBox, timeout_secs: u64) -> String {
    format!(
        "[out:json][timeout:{}];(way[\"building\"]({}););out body;>;out skel qt;",
        timeout_secs,
        bbox.to_overpass()
    )
}

/// Reconstruit les polygones de bâtiments, dans l'ordre de la réponse
pub fn reconstruct_buildings(response: &OverpassResponse) -> Vec<BuildingFeature> {
    let nodes: HashMap<i64, Coord> = response
        .elements
        .iter()
        .filter(|e| e.element_type == "node")
        .filter_map(|e| {
            let lon = e.lon.filter(|v| v.is_finite())?;
            let lat = e.lat.filter(|v| v.is_finite())?;
            Some((e.id, Coord { x: lon, y: lat }))
        })
        .collect();

    let mut buildings = Vec::new();
    let mut dropped = 0usize;

    for way in response.elements.iter().filter(|e| e.element_type == "way") {
        match resolve_ring(&way.nodes, &nodes) {
            Some(ring) => buildings.push(BuildingFeature {
                id: way.id,
                source: OSM_SOURCE.to_string(),
                polygon: Polygon::new(LineString::new(ring), vec![]),
            }),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, kept = buildings.len(), "Dropped degenerate building ways");
    }

    buildings
}

/// Résout les références de nodes en anneau fermé, `None` si dégénéré
fn resolve_ring(node_refs: &[i64], nodes: &HashMap<i64, Coord>) -> Option<Vec<Coord>> {
    let mut ring: Vec<Coord> = node_refs
        .iter()
        .filter_map(|id| nodes.get(id).copied())
        .collect();

    let first = *ring.first()?;
    let last = *ring.last()?;
    if first != last {
        ring.push(first);
    }

    (ring.len() >= MIN_RING_COORDS).then_some(ring)
}
