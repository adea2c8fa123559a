use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Source directory does not exist or is not a directory: {}", .0.display())]
    InvalidSource(PathBuf),
    #[error("No removable drive detected")]
    NoDriveFound,
    #[error("Failed to copy {}: {source}", .path.display())]
    CopyFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot copy source into its own subdirectory: {} -> {}", .source_dir.display(), .destination.display())]
    DestinationInsideSource {
        source_dir: PathBuf,
        destination: PathBuf,
    },
    #[error("Symbolic link loops back to one of its parents: {}", .0.display())]
    SymlinkCycle(PathBuf),
    #[error("Failed to write report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, CopyError>;

/// Attaches the offending path to an I/O error.
pub(crate) trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| CopyError::CopyFailure {
            path: path.to_path_buf(),
            source,
        })
    }
}
