use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use asset_assistant::assets::{AssetOutcome, AssetReport, ReportSink, RunStatistics};

use crate::config::Config;

/// Run log with buffered writes.
pub struct FileLogger {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileLogger {
    /// Create a new file logger, writing to `<log_dir>/assist_<timestamp>.log`.
    /// Defaults to `~/logs/asset-assistant`.
    pub(crate) fn new(log_dir: Option<&Path>) -> Result<Self> {
        let log_dir = match log_dir {
            Some(dir) => dir.to_path_buf(),
            None => asset_assistant::config::LOG_DIR
                .clone()
                .context("Failed to get home directory")?,
        };

        if !log_dir.exists() {
            fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
        }

        let log_path = log_dir.join(format!("assist_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path: log_path,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting the program
    pub(crate) fn log_init(&mut self, config: &Config) {
        let settings = &config.settings;
        let display = |path: Option<&Path>| path.map_or_else(|| "-".to_string(), |p| p.display().to_string());
        let _ = writeln!(
            self.writer,
            "[{}] INIT \"{}\"",
            Self::timestamp(),
            settings.staging.display()
        );
        let _ = writeln!(self.writer, "  config: {}", display(config.config_path.as_deref()));
        let _ = writeln!(self.writer, "  movies: {}", display(settings.roots.movies.as_deref()));
        let _ = writeln!(self.writer, "  shows: {}", display(settings.roots.shows.as_deref()));
        let _ = writeln!(
            self.writer,
            "  collections: {}",
            display(settings.roots.collections.as_deref())
        );
        let _ = writeln!(self.writer, "  failed: {}", settings.failed.display());
        let _ = writeln!(self.writer, "  backup: {}", settings.backup.display());
        let _ = writeln!(
            self.writer,
            "  service: {}",
            settings.service.map_or_else(|| "-".to_string(), |s| s.to_string())
        );
        let _ = writeln!(self.writer, "  season_zero: {:?}", settings.season_zero);
        let _ = writeln!(self.writer, "  dash_spacing: {:?}", settings.dash_spacing);
        let _ = writeln!(self.writer, "  extensions: {:?}", settings.extensions);
        let _ = writeln!(self.writer, "  backup_source: {}", settings.backup_source);
        let _ = writeln!(self.writer, "  backup_destination: {}", settings.backup_destination);
        let _ = writeln!(self.writer, "  overwrite: {}", settings.overwrite);
        let _ = writeln!(self.writer, "  flatten: {}", config.flatten);
        let _ = writeln!(self.writer, "  dryrun: {}", settings.dryrun);
        let _ = self.writer.flush();
    }

    /// Log when the run was interrupted
    pub(crate) fn log_abort(&mut self) {
        let _ = writeln!(self.writer, "[{}] ABORTED", Self::timestamp());
        let _ = self.writer.flush();
    }
}

impl ReportSink for FileLogger {
    fn asset_processed(&mut self, report: &AssetReport) {
        let label = if report.dryrun {
            "DRYRUN"
        } else if report.is_failed() {
            "FAILED"
        } else {
            "MOVED "
        };
        let detail = match &report.outcome {
            AssetOutcome::Moved {
                kind,
                destination,
                variant,
            } => format!("{kind} -> \"{}\" | {}", destination.display(), variant.strategy),
            AssetOutcome::Failed { error, failed_path } => match failed_path {
                Some(path) => format!("{error} | \"{}\"", path.display()),
                None if report.left_in_place() => format!("{error} | left in place"),
                None => error.to_string(),
            },
        };
        let _ = writeln!(
            self.writer,
            "[{}] {label} \"{}\" | {detail}",
            Self::timestamp(),
            report.source.display()
        );
        let _ = self.writer.flush();
    }

    fn run_finished(&mut self, stats: &RunStatistics) {
        let _ = writeln!(self.writer, "[{}] STATISTICS", Self::timestamp());
        let _ = writeln!(self.writer, "  Movies:      {}", stats.movies);
        let _ = writeln!(self.writer, "  Shows:       {}", stats.shows);
        let _ = writeln!(self.writer, "  Seasons:     {}", stats.seasons);
        let _ = writeln!(self.writer, "  Episodes:    {}", stats.episodes);
        let _ = writeln!(self.writer, "  Collections: {}", stats.collections);
        let _ = writeln!(self.writer, "  Failed:      {}", stats.failed);
        let _ = writeln!(self.writer, "  Backed up:   {}", stats.backed_up);
        let _ = writeln!(
            self.writer,
            "  Total time:  {}",
            asset_assistant::format_duration(stats.duration)
        );
        let _ = self.writer.flush();
    }
}
