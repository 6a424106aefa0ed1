//! Filesystem side effects behind a trait so the pipeline can be driven with stubs.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::assets::error::FileOpError;

/// File operations used to realize pipeline decisions.
///
/// Every failure is typed and non-retryable.
pub trait FileOperations {
    /// Atomically move a file, replacing an existing destination only if `overwrite` is set.
    ///
    /// # Errors
    /// `SourceMissing`, `DestinationExists`, `PermissionDenied` or `Io`.
    fn move_file(&self, source: &Path, destination: &Path, overwrite: bool) -> Result<(), FileOpError>;

    /// Copy a file, replacing any existing destination.
    ///
    /// # Errors
    /// `SourceMissing`, `PermissionDenied` or `Io`.
    fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), FileOpError>;

    /// Remove a file.
    ///
    /// Part of the collaborator interface for callers that discard assets.
    /// The pipeline itself never deletes: failed assets go to the failed bucket.
    ///
    /// # Errors
    /// `SourceMissing`, `PermissionDenied` or `Io`.
    fn delete_file(&self, path: &Path) -> Result<(), FileOpError>;

    /// Copy a file into `backup_dir` without overwriting earlier backups.
    /// Returns the backup path.
    ///
    /// # Errors
    /// `SourceMissing`, `PermissionDenied` or `Io`.
    fn backup_file(&self, path: &Path, backup_dir: &Path) -> Result<PathBuf, FileOpError>;

    /// # Errors
    /// `PermissionDenied` or `Io`.
    fn create_dir_all(&self, path: &Path) -> Result<(), FileOpError>;
}

/// Local filesystem implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileOperations;

impl FsFileOperations {
    /// Copy through a temp file in the destination directory, remove the source,
    /// then rename the temp file over the destination.
    /// Used when a rename is not possible across filesystems.
    ///
    /// The existing destination is only replaced after the source is gone,
    /// so a failed source removal leaves the previous destination untouched.
    fn move_across_devices(source: &Path, destination: &Path, overwrite: bool) -> Result<(), FileOpError> {
        if !overwrite && destination.exists() {
            return Err(FileOpError::DestinationExists {
                path: destination.to_path_buf(),
            });
        }

        let parent = destination.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(parent).map_err(|e| FileOpError::from_io(&e, parent))?;
        let mut reader = File::open(source).map_err(|e| FileOpError::from_io(&e, source))?;
        io::copy(&mut reader, temp.as_file_mut()).map_err(|e| FileOpError::from_io(&e, destination))?;
        drop(reader);

        let staged = temp.into_temp_path();
        fs::remove_file(source).map_err(|e| FileOpError::from_io(&e, source))?;

        let persisted = if overwrite {
            staged.persist(destination)
        } else {
            staged.persist_noclobber(destination)
        };
        if let Err(error) = persisted {
            // The temp file is now the only copy of the asset.
            let kept = error
                .path
                .keep()
                .map_or_else(|_| "-".to_string(), |path| path.display().to_string());
            return Err(FileOpError::Io {
                path: destination.to_path_buf(),
                message: format!("{}, asset kept at {kept}", error.error),
            });
        }
        Ok(())
    }
}

impl FileOperations for FsFileOperations {
    fn move_file(&self, source: &Path, destination: &Path, overwrite: bool) -> Result<(), FileOpError> {
        if !source.is_file() {
            return Err(FileOpError::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        if !overwrite && destination.exists() {
            return Err(FileOpError::DestinationExists {
                path: destination.to_path_buf(),
            });
        }

        match fs::rename(source, destination) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
                Self::move_across_devices(source, destination, overwrite)
            }
            Err(error) => Err(FileOpError::from_io(&error, destination)),
        }
    }

    fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), FileOpError> {
        if !source.is_file() {
            return Err(FileOpError::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        fs::copy(source, destination)
            .map(|_| ())
            .map_err(|e| FileOpError::from_io(&e, destination))
    }

    fn delete_file(&self, path: &Path) -> Result<(), FileOpError> {
        fs::remove_file(path).map_err(|e| FileOpError::from_io(&e, path))
    }

    fn backup_file(&self, path: &Path, backup_dir: &Path) -> Result<PathBuf, FileOpError> {
        self.create_dir_all(backup_dir)?;
        let target = unique_path(&backup_dir.join(crate::path_to_filename_string(path)));
        self.copy_file(path, &target)?;
        Ok(target)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FileOpError> {
        fs::create_dir_all(path).map_err(|e| FileOpError::from_io(&e, path))
    }
}

/// Return `path` if it is free, otherwise the first free `name (N).ext` next to it.
#[must_use]
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = crate::path_to_file_stem_string(path);
    let extension = crate::os_str_to_string(path.extension().unwrap_or_default());
    let mut index: usize = 1;
    loop {
        let name = if extension.is_empty() {
            format!("{stem} ({index})")
        } else {
            format!("{stem} ({index}).{extension}")
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}
