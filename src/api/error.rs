// ============================================================================
// Erreurs typées de l'API
// ============================================================================
// La plupart des erreurs passent par anyhow. Celles-ci existent parce que
// l'UI doit distinguer "coin introuvable" d'une panne réseau.
// ============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// L'API a répondu 404 pour cet identifiant
    #[error("coin introuvable : {0}")]
    NotFound(String),

    /// Réponse HTTP non-succès (rate limit, erreur serveur, ...)
    #[error("{endpoint} a retourné HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },
}

/// Vérifie si une erreur anyhow est un "coin introuvable"
pub fn is_not_found(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_)))
}
