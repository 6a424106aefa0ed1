use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::assets::normalize::VariantStrategy;
use crate::assets::types::EntityKind;

/// Reasons a single asset ends up in the failed bucket.
///
/// None of these abort a run: the pipeline turns each one into a `Failed` outcome
/// and continues with the next staged file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("Unrecognized asset name: '{name}'")]
    InvalidAssetName { name: String },

    #[error("Unsupported file type: '{extension}'")]
    UnsupportedFileType { extension: String },

    #[error("Library directory unavailable: {} ({reason})", root.display())]
    DirectoryUnavailable { root: PathBuf, reason: String },

    #[error("Match not found, please double check file and directory naming")]
    NotFound,

    #[error("Ambiguous match using {strategy}: {}", directories.join(", "))]
    Ambiguous {
        strategy: VariantStrategy,
        directories: Vec<String>,
    },

    #[error("{kind} assets are not supported by {service}")]
    Unsupported { kind: EntityKind, service: String },

    #[error("Season zero naming is not configured, set 'season_zero' to \"numeric\" or \"specials\"")]
    SeasonZeroNamingUnset,

    #[error(transparent)]
    FileOperation(#[from] FileOpError),
}

/// Typed failure from a file operation collaborator.
///
/// Every variant is terminal for the asset being processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileOpError {
    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },

    #[error("Source file missing: {}", path.display())]
    SourceMissing { path: PathBuf },

    #[error("Failed to access {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl FileOpError {
    /// Map an IO error for the given path to a typed failure.
    #[must_use]
    pub fn from_io(error: &io::Error, path: &Path) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::SourceMissing {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            io::ErrorKind::AlreadyExists => Self::DestinationExists {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        }
    }
}
