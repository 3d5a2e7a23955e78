//! Types d'erreurs pour le crate parcelle

use thiserror::Error;

/// Erreurs pouvant survenir lors du décodage des réponses cadastrales
#[derive(Debug, Error)]
pub enum ParcelleError {
    /// Corps de réponse JSON illisible
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Réponse structurellement invalide (ex: `features` n'est pas un tableau)
    #[error("Invalid collection: {0}")]
    InvalidCollection(String),

    /// Géométrie invalide
    #[error("Invalid geometry for {entity_id}: {reason}")]
    InvalidGeometry { entity_id: String, reason: String },
}

impl ParcelleError {
    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(entity_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            entity_id: entity_id.into(),
            reason: reason.into(),
        }
    }
}
