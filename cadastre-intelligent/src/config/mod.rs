//! Configuration du service

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration principale
///
/// Priorité croissante : défauts → fichier JSON → variables d'environnement →
/// options CLI.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Adresse d'écoute du serveur HTTP
    pub listen_addr: String,

    /// URL de base d'API Carto (IGN)
    pub apicarto_url: String,

    /// Endpoint Overpass (interpréteur)
    pub overpass_url: String,

    /// Timeout de la requête parcelle sous le point (et des élargissements)
    pub parcel_timeout_secs: u64,

    /// Timeout de la requête parcelles par zone
    pub zone_timeout_secs: u64,

    /// Timeout de la requête bâtiments
    pub building_timeout_secs: u64,

    /// Rayon d'élargissement quand le point ne trouve aucune parcelle
    pub widen_empty_radius_m: f64,

    /// Rayon d'élargissement quand le point trouve une seule parcelle
    pub widen_single_radius_m: f64,

    /// Rayon par défaut de la recherche par zone
    pub zone_default_radius_m: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".into(),
            apicarto_url: "https://apicarto.ign.fr".into(),
            overpass_url: "https://overpass-api.de/api/interpreter".into(),
            parcel_timeout_secs: 15,
            zone_timeout_secs: 30,
            building_timeout_secs: 25,
            widen_empty_radius_m: 15.0,
            widen_single_radius_m: 6.0,
            zone_default_radius_m: 100.0,
        }
    }
}

impl ServiceConfig {
    /// Charge une configuration depuis un fichier JSON (champs manquants = défauts)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Défauts, fichier optionnel, puis environnement
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applique les variables d'environnement. Une valeur illisible est ignorée.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("LISTEN_ADDR") {
            self.listen_addr = v;
        }
        if let Some(v) = var("APICARTO_URL") {
            self.apicarto_url = v;
        }
        if let Some(v) = var("OVERPASS_URL") {
            self.overpass_url = v;
        }
        if let Some(v) = parsed(&var, "PARCEL_TIMEOUT_SECS") {
            self.parcel_timeout_secs = v;
        }
        if let Some(v) = parsed(&var, "ZONE_TIMEOUT_SECS") {
            self.zone_timeout_secs = v;
        }
        if let Some(v) = parsed(&var, "BUILDING_TIMEOUT_SECS") {
            self.building_timeout_secs = v;
        }
        if let Some(v) = parsed(&var, "WIDEN_EMPTY_RADIUS_M") {
            self.widen_empty_radius_m = v;
        }
        if let Some(v) = parsed(&var, "WIDEN_SINGLE_RADIUS_M") {
            self.widen_single_radius_m = v;
        }
    }

    pub fn parcel_timeout(&self) -> Duration {
        Duration::from_secs(self.parcel_timeout_secs)
    }

    pub fn zone_timeout(&self) -> Duration {
        Duration::from_secs(self.zone_timeout_secs)
    }

    pub fn building_timeout(&self) -> Duration {
        Duration::from_secs(self.building_timeout_secs)
    }
}

fn parsed<F, T>(var: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    var(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.widen_empty_radius_m, 15.0);
        assert_eq!(config.widen_single_radius_m, 6.0);
        assert_eq!(config.parcel_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"widen_single_radius_m": 8.5}"#).unwrap();
        assert_eq!(config.widen_single_radius_m, 8.5);
        assert_eq!(config.widen_empty_radius_m, 15.0);
        assert_eq!(config.apicarto_url, "https://apicarto.ign.fr");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("APICARTO_URL", "http://localhost:9000"),
            ("BUILDING_TIMEOUT_SECS", "5"),
            ("WIDEN_EMPTY_RADIUS_M", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.apicarto_url, "http://localhost:9000");
        assert_eq!(config.building_timeout_secs, 5);
        assert_eq!(config.widen_empty_radius_m, 15.0);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ServiceConfig::load(Path::new("/nonexistent/config.json")).is_err());
    }
}
