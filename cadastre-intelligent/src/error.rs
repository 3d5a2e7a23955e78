//! Erreurs du service

use thiserror::Error;

/// Erreurs remontées à l'appelant HTTP
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Service amont injoignable (timeout, DNS, statut non 2xx, corps illisible)
    #[error("{service} error: {reason}")]
    Upstream {
        service: &'static str,
        reason: String,
    },

    /// Erreur interne inattendue
    #[error("Server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Crée une erreur de service amont
    pub fn upstream(service: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service,
            reason: reason.to_string(),
        }
    }

    /// Statut HTTP correspondant
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Upstream { .. } => 502,
            ServiceError::Internal(_) => 500,
        }
    }
}
