//! Cercle approximatif pour les requêtes par rayon
//!
//! Approximation plate : 1 degré de latitude ≈ 111 km, l'écart en longitude
//! est corrigé par cos(latitude). Suffisant pour des rayons de quelques
//! dizaines de mètres, pas géodésiquement exact.

use std::f64::consts::PI;

use geo::{Coord, LineString, Polygon};
use serde_json::Value;

/// Nombre de sommets distincts du cercle
pub const CIRCLE_SEGMENTS: usize = 32;

/// Mètres par degré de latitude
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Plancher de cos(lat) pour ne jamais diviser par ~0 aux pôles
const MIN_COS_LAT: f64 = 1e-6;

/// Construit un anneau fermé de 33 sommets (32 + le premier répété)
pub fn circle_ring(lon: f64, lat: f64, radius_m: f64) -> Vec<Coord> {
    // NaN et rayons négatifs → cercle dégénéré sur le centre
    let radius = if radius_m > 0.0 { radius_m } else { 0.0 };
    let r_deg = radius / METERS_PER_DEGREE;
    let cos_lat = lat.to_radians().cos().abs().max(MIN_COS_LAT);

    let mut ring: Vec<Coord> = (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = (i as f64 / CIRCLE_SEGMENTS as f64) * 2.0 * PI;
            Coord {
                x: lon + r_deg * angle.cos() / cos_lat,
                y: lat + r_deg * angle.sin(),
            }
        })
        .collect();

    let first = ring[0];
    ring.push(first);
    ring
}

/// Cercle sous forme de polygone `geo`
pub fn circle_polygon(lon: f64, lat: f64, radius_m: f64) -> Polygon<f64> {
    Polygon::new(LineString::new(circle_ring(lon, lat, radius_m)), vec![])
}

/// Cercle sous forme de géométrie GeoJSON, utilisable comme filtre `geom`
pub fn circle_geojson(lon: f64, lat: f64, radius_m: f64) -> Value {
    let coordinates: Vec<Value> = circle_ring(lon, lat, radius_m)
        .into_iter()
        .map(|c| Value::from(vec![c.x, c.y]))
        .collect();

    serde_json::json!({
        "type": "Polygon",
        "coordinates": [coordinates],
    })
}

/// Point sous forme de géométrie GeoJSON
pub fn point_geojson(lon: f64, lat: f64) -> Value {
    serde_json::json!({
        "type": "Point",
        "coordinates": [lon, lat],
    })
}
