//! Error types for turnaround-core (WASM-compatible)

use thiserror::Error;

/// Result type alias for turnaround-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that work in both native and WASM environments
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid series key '{0}': expected 'PRIMARY|SECONDARY' with no '|' inside either part")]
    InvalidKeyError(String),
}
