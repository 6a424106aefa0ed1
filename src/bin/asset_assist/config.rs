use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use itertools::Itertools;

use asset_assistant::assets::settings::{AssistConfig, Settings, normalize_extensions};
use asset_assistant::assets::{LibraryRoots, SeasonZero};

use crate::AssistArgs;

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) settings: Settings,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) debug: bool,
    pub(crate) flatten: bool,
    pub(crate) log: bool,
    pub(crate) log_dir: Option<PathBuf>,
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// CLI values win over the config file.
    pub fn from_args(args: AssistArgs) -> Result<Self> {
        let config_path = args
            .config
            .clone()
            .or_else(|| asset_assistant::config::CONFIG_PATH.clone());
        let user_config = AssistConfig::get_user_config(config_path.as_deref())?;
        Self::from_parts(args, user_config, config_path)
    }

    fn from_parts(args: AssistArgs, user_config: AssistConfig, config_path: Option<PathBuf>) -> Result<Self> {
        let staging = asset_assistant::resolve_input_path(args.path.as_deref().or(user_config.staging.as_deref()))?;

        let roots = LibraryRoots {
            movies: resolve_optional(args.movies.or(user_config.movies))?,
            shows: resolve_optional(args.shows.or(user_config.shows))?,
            collections: resolve_optional(args.collections.or(user_config.collections))?,
        };

        let failed = resolve_optional(args.failed.or(user_config.failed))?.unwrap_or_else(|| staging.join("failed"));
        let backup = resolve_optional(args.backup.or(user_config.backup))?.unwrap_or_else(|| staging.join("backup"));

        let season_zero = if args.specials {
            Some(SeasonZero::Specials)
        } else if args.numeric_specials {
            Some(SeasonZero::Numeric)
        } else {
            user_config.season_zero
        };

        let collection_suffixes: Vec<String> = user_config
            .collection_suffixes
            .into_iter()
            .map(|suffix| suffix.trim().to_string())
            .filter(|suffix| !suffix.is_empty())
            .unique()
            .collect();

        let settings = Settings {
            staging,
            roots,
            failed,
            backup,
            service: args.service.or(user_config.service),
            season_zero,
            dash_spacing: user_config.dash_spacing,
            collection_suffixes,
            extensions: normalize_extensions(user_config.extensions),
            backup_source: args.backup_source || user_config.backup_source,
            backup_destination: args.backup_destination || user_config.backup_destination,
            overwrite: !args.keep && user_config.overwrite,
            dryrun: args.print || user_config.dryrun,
            verbose: args.verbose || user_config.verbose,
        };

        Ok(Self {
            settings,
            config_path,
            debug: args.debug || user_config.debug,
            flatten: !args.no_flatten && user_config.flatten,
            log: args.log || user_config.log,
            log_dir: user_config.log_dir,
        })
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = &self.settings;
        let display = |path: Option<&Path>| path.map_or_else(|| "-".to_string(), |p| p.display().to_string());
        writeln!(f, "Config:")?;
        writeln!(f, "  config:       {}", display(self.config_path.as_deref()))?;
        writeln!(f, "  staging:      {}", settings.staging.display())?;
        writeln!(f, "  movies:       {}", display(settings.roots.movies.as_deref()))?;
        writeln!(f, "  shows:        {}", display(settings.roots.shows.as_deref()))?;
        writeln!(f, "  collections:  {}", display(settings.roots.collections.as_deref()))?;
        writeln!(f, "  failed:       {}", settings.failed.display())?;
        writeln!(f, "  backup:       {}", settings.backup.display())?;
        writeln!(
            f,
            "  service:      {}",
            settings.service.map_or_else(|| "-".to_string(), |s| s.to_string())
        )?;
        writeln!(f, "  season zero:  {:?}", settings.season_zero)?;
        writeln!(f, "  dash spacing: {:?}", settings.dash_spacing)?;
        writeln!(f, "  suffixes:     {}", settings.collection_suffixes.join(", "))?;
        writeln!(f, "  extensions:   {}", settings.extensions.join(", "))?;
        writeln!(f, "  backup src:   {}", asset_assistant::colorize_bool(settings.backup_source))?;
        writeln!(f, "  backup dst:   {}", asset_assistant::colorize_bool(settings.backup_destination))?;
        writeln!(f, "  overwrite:    {}", asset_assistant::colorize_bool(settings.overwrite))?;
        writeln!(f, "  flatten:      {}", asset_assistant::colorize_bool(self.flatten))?;
        writeln!(f, "  dryrun:       {}", asset_assistant::colorize_bool(settings.dryrun))?;
        writeln!(f, "  log:          {}", asset_assistant::colorize_bool(self.log))?;
        writeln!(f, "  verbose:      {}", asset_assistant::colorize_bool(settings.verbose))
    }
}

fn resolve_optional(path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    path.as_deref().map(asset_assistant::absolute_path).transpose()
}
