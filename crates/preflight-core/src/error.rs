//! Error taxonomy for preflight.
//!
//! Suite failures are not errors: they are recorded as
//! [`SuiteOutcome::Fail`](crate::suite::SuiteOutcome) and never propagated.
//! The variants here describe what can go wrong while *trying* to run a suite,
//! and each is folded into that suite's failure at the suite boundary.

/// Preflight errors.
#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("git error: {0}")]
    Git(String),

    #[error("failed to start `{program}`: {source}")]
    ToolInvocation {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    RuntimePrecondition(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for preflight operations.
pub type Result<T> = std::result::Result<T, PreflightError>;
