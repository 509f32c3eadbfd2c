//! Error types for the server binary.
//!
//! [`LaunchError`] wraps every failure that can stop startup. Once the
//! server is listening nothing is fatal.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: drishti_core::ConfigError,
    },

    /// The HTTP server failed to bind.
    #[error("server error: {source}")]
    Server {
        /// The underlying startup error.
        #[from]
        source: drishti_observer::StartupError,
    },

    /// Logging could not be initialised.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
