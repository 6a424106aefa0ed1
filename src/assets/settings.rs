//! User config file section and the resolved settings consumed by the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use itertools::Itertools;
use serde::Deserialize;

use crate::assets::matcher::LibraryRoots;
use crate::assets::normalize::DashSpacing;
use crate::assets::types::{SeasonZero, Service};

/// Image extensions accepted by default.
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Title suffix marking collection art by default.
pub const DEFAULT_COLLECTION_SUFFIX: &str = "Collection";

/// Config from the user config file.
#[derive(Debug, Deserialize)]
pub struct AssistConfig {
    #[serde(default)]
    pub staging: Option<PathBuf>,
    #[serde(default)]
    pub movies: Option<PathBuf>,
    #[serde(default)]
    pub shows: Option<PathBuf>,
    #[serde(default)]
    pub collections: Option<PathBuf>,
    #[serde(default)]
    pub failed: Option<PathBuf>,
    #[serde(default)]
    pub backup: Option<PathBuf>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub service: Option<Service>,
    #[serde(default)]
    pub season_zero: Option<SeasonZero>,
    #[serde(default)]
    pub dash_spacing: DashSpacing,
    #[serde(default = "default_collection_suffixes")]
    pub collection_suffixes: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub backup_source: bool,
    #[serde(default)]
    pub backup_destination: bool,
    #[serde(default = "default_true")]
    pub overwrite: bool,
    #[serde(default = "default_true")]
    pub flatten: bool,
    #[serde(default)]
    pub dryrun: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub log: bool,
}

/// Wrapper needed for parsing the user config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    assist: AssistConfig,
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub staging: PathBuf,
    pub roots: LibraryRoots,
    pub failed: PathBuf,
    pub backup: PathBuf,
    pub service: Option<Service>,
    pub season_zero: Option<SeasonZero>,
    pub dash_spacing: DashSpacing,
    pub collection_suffixes: Vec<String>,
    /// Lowercase, without the leading dot.
    pub extensions: Vec<String>,
    pub backup_source: bool,
    pub backup_destination: bool,
    pub overwrite: bool,
    pub dryrun: bool,
    pub verbose: bool,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            staging: None,
            movies: None,
            shows: None,
            collections: None,
            failed: None,
            backup: None,
            log_dir: None,
            service: None,
            season_zero: None,
            dash_spacing: DashSpacing::default(),
            collection_suffixes: default_collection_suffixes(),
            extensions: default_extensions(),
            backup_source: false,
            backup_destination: false,
            overwrite: true,
            flatten: true,
            dryrun: false,
            verbose: false,
            debug: false,
            log: false,
        }
    }
}

impl AssistConfig {
    /// Read the user config file if it exists, otherwise use defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn get_user_config(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!("Failed to read config file {}: {error}", path.display())),
        }
    }

    /// Parse config from a TOML string. Other sections are ignored.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.assist)
            .with_context(|| "Failed to parse config TOML")
    }
}

impl Settings {
    /// Settings with defaults for the given staging directory.
    #[must_use]
    pub fn new(staging: PathBuf) -> Self {
        Self {
            failed: staging.join("failed"),
            backup: staging.join("backup"),
            staging,
            roots: LibraryRoots::default(),
            service: None,
            season_zero: None,
            dash_spacing: DashSpacing::default(),
            collection_suffixes: default_collection_suffixes(),
            extensions: default_extensions(),
            backup_source: false,
            backup_destination: false,
            overwrite: true,
            dryrun: false,
            verbose: false,
        }
    }

    /// Check the directory layout before a run.
    ///
    /// Returns warnings for configured library roots that do not exist.
    ///
    /// # Errors
    /// Returns an error if staging is missing, or if library roots overlap with each other or staging.
    pub fn validate(&self) -> anyhow::Result<Vec<String>> {
        if !self.staging.is_dir() {
            anyhow::bail!("Staging directory does not exist: {}", self.staging.display());
        }

        let roots = self.configured_roots();
        if roots.is_empty() {
            anyhow::bail!("No library directories configured, set at least one of movies, shows or collections");
        }

        for (name, root) in &roots {
            if *root == self.staging.as_path() {
                anyhow::bail!("The {name} directory cannot be the staging directory: {}", root.display());
            }
        }
        for ((first_name, first), (second_name, second)) in roots.iter().tuple_combinations() {
            if first == second {
                anyhow::bail!(
                    "The {first_name} and {second_name} directories must be different: {}",
                    first.display()
                );
            }
        }

        Ok(roots
            .iter()
            .filter(|(_, root)| !root.is_dir())
            .map(|(name, root)| format!("The {name} directory does not exist: {}", root.display()))
            .collect())
    }

    /// True if the extension is one of the accepted image types.
    #[must_use]
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.extensions.iter().any(|accepted| *accepted == extension)
    }

    fn configured_roots(&self) -> Vec<(&'static str, &Path)> {
        [
            ("movies", self.roots.movies.as_deref()),
            ("shows", self.roots.shows.as_deref()),
            ("collections", self.roots.collections.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, root)| root.map(|root| (name, root)))
        .collect()
    }
}

/// Lowercase and de-duplicate extensions, dropping any leading dot.
#[must_use]
pub fn normalize_extensions<I: IntoIterator<Item = String>>(extensions: I) -> Vec<String> {
    extensions
        .into_iter()
        .map(|extension| extension.trim().trim_start_matches('.').to_lowercase())
        .filter(|extension| !extension.is_empty())
        .unique()
        .collect()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

fn default_collection_suffixes() -> Vec<String> {
    vec![DEFAULT_COLLECTION_SUFFIX.to_string()]
}

const fn default_true() -> bool {
    true
}
