//! Error types for the `parliament` binary.
//!
//! [`CliError`] wraps every failure mode of startup and play so `main` can
//! propagate with `?`.

/// Top-level error for the `parliament` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: parliament_core::ConfigError,
    },

    /// The starting position could not be parsed.
    #[error("board error: {source}")]
    Board {
        /// The underlying board error.
        #[from]
        source: parliament_board::BoardError,
    },

    /// The moderator failed.
    #[error("debate error: {source}")]
    Core {
        /// The underlying moderator error.
        #[from]
        source: parliament_core::CoreError,
    },

    /// The report file could not be opened.
    #[error("report file {path}: {source}")]
    Report {
        /// Path of the report file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Logging could not be initialised.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
