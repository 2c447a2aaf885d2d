use thiserror::Error;

/// Result type for state resolution
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that can occur while resolving backend configuration into a [`crate::State`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No resolver is registered for the backend type
    #[error("unsupported backend: {backend:?}, supported backends: [{}]", supported.join(", "))]
    UnsupportedBackend {
        backend: String,
        supported: Vec<String>,
    },

    /// A required attribute is absent from the configuration
    #[error("backend {backend:?}: missing required attribute {attribute:?}")]
    MissingAttribute { backend: String, attribute: String },

    /// An attribute is present but has the wrong shape
    #[error("backend {backend:?}: attribute {attribute:?} must be {expected}, got {found}")]
    InvalidAttribute {
        backend: String,
        attribute: String,
        expected: &'static str,
        found: String,
    },
}

impl ResolveError {
    pub fn missing(backend: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            backend: backend.into(),
            attribute: attribute.into(),
        }
    }

    pub fn invalid(
        backend: impl Into<String>,
        attribute: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            backend: backend.into(),
            attribute: attribute.into(),
            expected,
            found: found.into(),
        }
    }
}
