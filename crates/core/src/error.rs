use crate::store::StoreError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("bundle directory not found: {}", .0.display())]
    BundleDirNotFound(PathBuf),
    #[error("failed to list bundle directory {}: {source}", path.display())]
    BundleDirRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read bundle file {}: {source}", path.display())]
    BundleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse bundle file {}: {source}", path.display())]
    BundleParse {
        path: PathBuf,
        #[source]
        source: fhir::FhirError,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;
