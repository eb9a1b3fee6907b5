use thiserror::Error;

/// Errors raised while parsing value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid version {input:?}: {reason}")]
    Version { input: String, reason: String },

    #[error("invalid architecture {input:?}: {reason}")]
    Arch { input: String, reason: String },

    #[error("invalid dependency {input:?}: {reason}")]
    Dependency { input: String, reason: String },
}

/// Result type for value parsing.
pub type Result<T> = std::result::Result<T, ValueError>;
