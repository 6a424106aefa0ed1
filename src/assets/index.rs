//! Cached directory listings for library roots.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use itertools::Itertools;

use crate::assets::error::AssetError;
use crate::assets::normalize::{self, KeySpace, NameVariant, VariantStrategy};

/// Snapshot of the immediate child directories of one library root.
///
/// Directory names are indexed under every key space so each matching strategy
/// is a single hash lookup. The snapshot is never refreshed during a run.
#[derive(Debug)]
pub struct DirectoryIndex {
    root: PathBuf,
    built_at: DateTime<Local>,
    /// Original on-disk directory names, sorted.
    names: Vec<String>,
    keys: HashMap<(KeySpace, String), Vec<usize>>,
}

/// Lazily built indices, at most one per root for the lifetime of a run.
///
/// Build failures are cached too so an unavailable root is only probed once.
#[derive(Debug, Default)]
pub struct IndexCache {
    indices: HashMap<PathBuf, Result<DirectoryIndex, AssetError>>,
}

impl DirectoryIndex {
    /// Scan the immediate children of `root`. Hidden directories are skipped.
    ///
    /// # Errors
    /// Returns `DirectoryUnavailable` if the root does not exist, is not a directory,
    /// or cannot be listed.
    pub fn build(root: &Path) -> Result<Self, AssetError> {
        let unavailable = |reason: String| AssetError::DirectoryUnavailable {
            root: root.to_path_buf(),
            reason,
        };

        if !root.exists() {
            return Err(unavailable("does not exist".to_string()));
        }
        if !root.is_dir() {
            return Err(unavailable("not a directory".to_string()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(root).map_err(|e| unavailable(e.to_string()))? {
            let entry = entry.map_err(|e| unavailable(e.to_string()))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Ok(name) = crate::get_normalized_dir_name(&path) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }

        Ok(Self::from_names(root, names))
    }

    /// Create an index from an already known set of directory names.
    pub fn from_names<I, S>(root: &Path, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).sorted().dedup().collect();
        let mut keys: HashMap<(KeySpace, String), Vec<usize>> = HashMap::new();
        for (index, name) in names.iter().enumerate() {
            for (space, key) in Self::directory_keys(name) {
                let entry = keys.entry((space, key)).or_default();
                if !entry.contains(&index) {
                    entry.push(index);
                }
            }
        }

        Self {
            root: root.to_path_buf(),
            built_at: Local::now(),
            names,
            keys,
        }
    }

    /// Case-insensitive exact lookup of a directory name.
    ///
    /// When several directories fold to the same name, the one with identical casing wins.
    /// Returns `None` if there is no such directory or the match is not unique.
    #[must_use]
    pub fn lookup(&self, candidate_name: &str) -> Option<&str> {
        let indices = self.keys.get(&(KeySpace::FullName, normalize::case_fold(candidate_name)))?;
        match indices.as_slice() {
            [index] => Some(self.names[*index].as_str()),
            _ => indices
                .iter()
                .map(|&index| self.names[index].as_str())
                .find(|name| *name == candidate_name),
        }
    }

    /// All directory names matching a name variant in any key space it applies to.
    #[must_use]
    pub fn matches(&self, variant: &NameVariant) -> Vec<&str> {
        variant
            .lookups()
            .flat_map(|strategy| self.matches_as(variant, strategy))
            .unique()
            .collect()
    }

    /// Directory names matching the variant value used as one specific strategy.
    #[must_use]
    pub fn matches_as(&self, variant: &NameVariant, strategy: VariantStrategy) -> Vec<&str> {
        self.keys
            .get(&(strategy.key_space(), variant.key_as(strategy)))
            .map(|indices| indices.iter().map(|&index| self.names[index].as_str()).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn built_at(&self) -> DateTime<Local> {
        self.built_at
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn directory_keys(name: &str) -> [(KeySpace, String); 4] {
        [
            (KeySpace::FullName, normalize::case_fold(name)),
            (KeySpace::YearStripped, normalize::case_fold(&normalize::strip_year(name))),
            (KeySpace::PrimaryTitle, normalize::case_fold(&normalize::primary_title(name))),
            (KeySpace::TokenSet, normalize::token_set(name)),
        ]
    }
}

impl IndexCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the index for a root, building it on first use.
    ///
    /// # Errors
    /// Returns the cached `DirectoryUnavailable` error if the root could not be indexed.
    pub fn get_or_build(&mut self, root: &Path) -> Result<&DirectoryIndex, AssetError> {
        self.indices
            .entry(root.to_path_buf())
            .or_insert_with(|| DirectoryIndex::build(root))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Index for a root that was already built successfully.
    #[must_use]
    pub fn get(&self, root: &Path) -> Option<&DirectoryIndex> {
        self.indices.get(root).and_then(|result| result.as_ref().ok())
    }

    /// Insert a prebuilt index, replacing any cached entry for its root.
    pub fn insert(&mut self, index: DirectoryIndex) {
        self.indices.insert(index.root.clone(), Ok(index));
    }

    /// Number of roots that have been indexed or attempted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
