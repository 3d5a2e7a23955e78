//! Fusion de deux jeux de parcelles sans doublons
//!
//! L'identité d'une parcelle est son IDU. À défaut, c'est un hash de la
//! géométrie sérialisée de façon canonique (clés triées, aucun espace) : deux
//! parcelles sans IDU mais de même contour sont la même parcelle.

use std::collections::HashSet;

use blake3::Hasher;
use serde_json::Value;

use crate::ParcelFeature;

/// Clé d'identité d'une parcelle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParcelKey {
    /// Identifiant cadastral
    Idu(String),
    /// Hash BLAKE3 de la géométrie canonique
    Geometry([u8; 32]),
}

impl std::fmt::Display for ParcelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParcelKey::Idu(idu) => f.write_str(idu),
            ParcelKey::Geometry(hash) => write!(f, "geom:{}", hex::encode(hash)),
        }
    }
}

/// Calcule la clé d'identité d'une parcelle
pub fn parcel_key(feature: &ParcelFeature) -> ParcelKey {
    match feature.idu.as_deref() {
        Some(idu) if !idu.is_empty() => ParcelKey::Idu(idu.to_string()),
        _ => ParcelKey::Geometry(geometry_hash(feature.geometry.as_ref())),
    }
}

/// Hash stable d'une géométrie brute (`null` si absente)
pub fn geometry_hash(geometry: Option<&Value>) -> [u8; 32] {
    let mut canonical = String::new();
    write_canonical(&mut canonical, geometry.unwrap_or(&Value::Null));

    let mut hasher = Hasher::new();
    hasher.update(canonical.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Fusionne `first` puis `second` en conservant le premier vu
pub fn dedupe(first: &[ParcelFeature], second: &[ParcelFeature]) -> Vec<ParcelFeature> {
    let mut seen: HashSet<ParcelKey> = HashSet::with_capacity(first.len() + second.len());
    let mut merged = Vec::with_capacity(first.len() + second.len());

    for feature in first.iter().chain(second) {
        let key = parcel_key(feature);
        if seen.contains(&key) {
            tracing::trace!(key = %key, "Duplicate parcel skipped");
            continue;
        }
        seen.insert(key);
        merged.push(feature.clone());
    }

    merged
}

/// Sérialise une valeur JSON avec les clés d'objet triées
fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(out, &map[key]);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
