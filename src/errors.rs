//! Error types for the embedder
//!
//! `ConfigurationError` is the only failure that crosses the widget boundary.
//! Everything raised during the load sequence is rendered in place as a
//! failure panel and never reaches the host.

use thiserror::Error;

/// Top-level embedder error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedderError {
    /// Rejected widget configuration (missing fields or malformed tag)
    #[error("{0}")]
    Configuration(String),

    /// No card in the dashboard carries the requested tag
    #[error("Card with embed ID #{tag} not found in dashboard '{dashboard}'")]
    CardNotFound { tag: String, dashboard: String },

    /// The transport reported the dashboard path itself as missing
    #[error("Dashboard '{dashboard}' not found or inaccessible")]
    DashboardAccess { dashboard: String },

    /// Any other failure during the load sequence
    #[error("Search error: {0}")]
    Search(String),
}

impl EmbedderError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        EmbedderError::Configuration(msg.into())
    }

    /// Remap a failure raised while fetching or searching the dashboard.
    ///
    /// Transport "Not found" becomes a dashboard access error, other host
    /// failures are wrapped as search errors. Errors already classified by
    /// the embedder pass through untouched.
    pub fn from_load_failure(err: LoadFailure, dashboard: &str) -> Self {
        match err {
            LoadFailure::Host(e) if e.is_not_found() => EmbedderError::DashboardAccess {
                dashboard: dashboard.to_string(),
            },
            LoadFailure::Host(e) => EmbedderError::Search(e.message),
            LoadFailure::Embedder(e) => e,
        }
    }

    /// True for errors produced by `configure`
    pub fn is_configuration(&self) -> bool {
        matches!(self, EmbedderError::Configuration(_))
    }
}

/// Error reported by the host transport or card factory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// The host signals an unknown dashboard path with a literal "Not found"
    pub fn is_not_found(&self) -> bool {
        self.message.contains("Not found")
    }
}

/// Raw failure inside the load sequence, before remapping
#[derive(Debug, Clone, Error)]
pub enum LoadFailure {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Embedder(#[from] EmbedderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_not_found_maps_to_dashboard_access() {
        let err = EmbedderError::from_load_failure(
            HostError::new("Not found").into(),
            "climate",
        );
        assert_eq!(err.to_string(), "Dashboard 'climate' not found or inaccessible");
    }

    #[test]
    fn test_other_host_errors_are_wrapped() {
        let err = EmbedderError::from_load_failure(
            HostError::new("Connection lost").into(),
            "climate",
        );
        assert_eq!(err.to_string(), "Search error: Connection lost");
    }

    #[test]
    fn test_card_not_found_passes_through() {
        let missing = EmbedderError::CardNotFound {
            tag: "099".to_string(),
            dashboard: "lovelace".to_string(),
        };
        let err = EmbedderError::from_load_failure(missing.into(), "lovelace");
        assert!(matches!(err, EmbedderError::CardNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "Card with embed ID #099 not found in dashboard 'lovelace'"
        );
    }
}
