use std::path::PathBuf;

/// fleetreport error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A named report, column template, or device does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Report definition or request is malformed
    #[error("validation failed: {0}")]
    Validation(String),

    /// Writing report output failed
    #[error("render failed: {0}")]
    Render(String),

    /// Configuration file not found or invalid
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid command-line arguments
    #[error("argument error: {0}")]
    Argument(String),

    /// File I/O error
    #[error("io error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fleet data store failure
    #[error("store error: {0}")]
    Store(String),

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap an output sink failure.
    pub fn render(err: std::io::Error) -> Self {
        Error::Render(err.to_string())
    }
}

/// Result type using fleetreport Error
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Report rendered (or command completed)
    Success = 0,
    /// The report could not be produced
    ReportFailed = 1,
    /// Configuration, definition or argument error
    ConfigError = 2,
    /// Internal error
    InternalError = 3,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config { .. } | Error::Argument(_) | Error::Validation(_) => {
                ExitCode::ConfigError
            }
            Error::NotFound(_) | Error::Render(_) | Error::Store(_) | Error::Io { .. } => {
                ExitCode::ReportFailed
            }
            Error::Internal(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
