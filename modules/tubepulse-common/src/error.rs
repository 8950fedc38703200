use thiserror::Error;

/// Errors surfaced on the REST paths. `Upstream` keeps the upstream response
/// body as its display text so clients see what the API actually said.
#[derive(Debug, Error)]
pub enum TubePulseError {
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    NotFound(String),
}

impl TubePulseError {
    /// HTTP status of the upstream response, if this came from one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            TubePulseError::Upstream { status, .. } => Some(*status),
            TubePulseError::NotFound(_) => None,
        }
    }
}
