//! Bundle Reader.
//!
//! Enumerates the `*.json` files of a bundle directory and parses each into a [`Bundle`].
//! Whether a bundle has an `entry` list is left to the caller to decide; the reader only
//! fails on conditions that abort a whole ingestion run.

use crate::constants::BUNDLE_FILE_EXTENSION;
use crate::{IngestError, IngestResult};
use fhir::Bundle;
use std::fs;
use std::path::{Path, PathBuf};

/// One parsed bundle file.
#[derive(Clone, Debug)]
pub struct SourceBundle {
    /// File name (without directory), used as fragment provenance.
    pub file_name: String,
    pub bundle: Bundle,
}

/// Reader over a directory of bundle files.
#[derive(Debug)]
pub struct BundleReader {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl BundleReader {
    /// Open a bundle directory and list its bundle files, sorted by file name.
    ///
    /// Only regular files with a `.json` extension directly inside `dir` are considered.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::BundleDirNotFound`] if `dir` does not exist or is not a
    /// directory, and [`IngestError::BundleDirRead`] if it cannot be listed.
    pub fn open(dir: &Path) -> IngestResult<Self> {
        if !dir.is_dir() {
            return Err(IngestError::BundleDirNotFound(dir.to_path_buf()));
        }

        let read_dir = fs::read_dir(dir).map_err(|source| IngestError::BundleDirRead {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| IngestError::BundleDirRead {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let is_bundle = path
                .extension()
                .is_some_and(|ext| ext == BUNDLE_FILE_EXTENSION);
            if is_bundle && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(Self {
            dir: dir.to_path_buf(),
            files,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Bundle files found in the directory.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Read and parse every bundle file, in file name order.
    pub fn bundles(&self) -> impl Iterator<Item = IngestResult<SourceBundle>> + '_ {
        self.files.iter().map(|path| read_bundle(path))
    }
}

/// Read and parse a single bundle file.
///
/// # Errors
///
/// Returns [`IngestError::BundleRead`] if the file cannot be read and
/// [`IngestError::BundleParse`] if it is not a JSON bundle.
pub fn read_bundle(path: &Path) -> IngestResult<SourceBundle> {
    let contents = fs::read_to_string(path).map_err(|source| IngestError::BundleRead {
        path: path.to_path_buf(),
        source,
    })?;
    let bundle = Bundle::parse(&contents).map_err(|source| IngestError::BundleParse {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(SourceBundle { file_name, bundle })
}
