use thiserror::Error;

/// Failure signals produced by the lookup clients.
///
/// Clients never panic or leak transport errors past this type; the session
/// layer turns each variant into a short user-facing notice.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The request was valid but matched nothing.
    #[error("location not found: {0}")]
    NotFound(String),

    /// Network error, timeout, non-success status or unreadable body.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Coordinates were resolved but the forecast could not be retrieved.
    #[error("weather data unavailable: {0}")]
    DataUnavailable(String),
}

impl LookupError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn data_unavailable(err: impl std::fmt::Display) -> Self {
        Self::DataUnavailable(err.to_string())
    }
}
