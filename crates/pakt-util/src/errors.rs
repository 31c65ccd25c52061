use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Pakt operations.
#[derive(Debug, Error, Diagnostic)]
pub enum PaktError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid project configuration (dangling targets, bad import entries).
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check the [targets] and [imports] tables of your pakt.toml"))]
    Config { message: String },

    /// A graph invariant was violated (duplicate edge, unknown vertex, cycle).
    #[error("Graph error: {message}")]
    Graph { message: String },

    /// Malformed version, specifier, requirement or URL.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Package resolution failed (missing collection, no usable version, etc.).
    #[error("Dependency resolution failed: {message}")]
    Resolution { message: String },

    /// Network request failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// One or more requested packages could not be downloaded.
    #[error("Download failed: {message}")]
    #[diagnostic(help("Re-run with RUST_LOG=debug to see which package URLs failed"))]
    Download { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type PaktResult<T> = miette::Result<T>;
