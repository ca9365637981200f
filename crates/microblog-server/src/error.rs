//! Server runtime errors.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors starting or running the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Could not bind or serve on the listen address
    #[error("network error on {address}: {source}")]
    Io {
        /// Listen address
        address: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Storage could not be opened
    #[error(transparent)]
    Storage(#[from] StorageError),
}
