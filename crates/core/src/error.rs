use crate::grail::GrailConfiguration;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The stored grail configuration is locked and the caller tried to change it.
    ///
    /// Carries the locked values so the client can reconcile its local settings.
    #[error("Grail configuration is locked ({})", locked.describe())]
    ConfigurationLocked { locked: GrailConfiguration },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
