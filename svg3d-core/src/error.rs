//! Error types for the core library.
//!
//! Rendering itself never fails: degenerate input is dropped or passed through.
//! Errors only come from building buffers, parsing colours and models, and I/O.

use thiserror::Error;

/// Main error type for svg3d.
#[derive(Error, Debug)]
pub enum Error {
    /// Attribute buffer whose length does not fit its item size
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Colour string that is neither hex nor `rgb(r,g,b)`
    #[error("invalid color {0:?}")]
    InvalidColor(String),

    /// STL parsing errors
    #[error("STL error: {0}")]
    Stl(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;
