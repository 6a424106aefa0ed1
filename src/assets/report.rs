//! Per-asset outcomes and the sinks that receive them.

use std::path::PathBuf;

use colored::Colorize;

use crate::assets::error::{AssetError, FileOpError};
use crate::assets::normalize::NameVariant;
use crate::assets::stats::RunStatistics;
use crate::assets::types::EntityKind;

/// Terminal outcome of one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Moved {
        kind: EntityKind,
        destination: PathBuf,
        /// Variant that resolved the directory.
        variant: NameVariant,
    },
    Failed {
        error: AssetError,
        /// Location in the failed bucket, `None` if the file could not be moved there.
        failed_path: Option<PathBuf>,
    },
}

/// Diagnostic record emitted for every processed asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReport {
    pub source: PathBuf,
    pub outcome: AssetOutcome,
    /// Decision only, nothing was changed on disk.
    pub dryrun: bool,
}

/// Receives pipeline results.
pub trait ReportSink {
    fn asset_processed(&mut self, report: &AssetReport);
    fn run_finished(&mut self, stats: &RunStatistics);
}

/// Prints asset results and the final summary to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl AssetReport {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.outcome, AssetOutcome::Failed { .. })
    }

    /// A failed asset that could not be moved to the failed bucket and is still at its source path.
    #[must_use]
    pub fn left_in_place(&self) -> bool {
        match &self.outcome {
            AssetOutcome::Failed {
                error,
                failed_path: None,
            } => !self.dryrun && !matches!(error, AssetError::FileOperation(FileOpError::SourceMissing { .. })),
            AssetOutcome::Failed { .. } | AssetOutcome::Moved { .. } => false,
        }
    }
}

impl ConsoleReporter {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ReportSink for ConsoleReporter {
    fn asset_processed(&mut self, report: &AssetReport) {
        let name = crate::path_to_filename_string(&report.source);
        let prefix = if report.dryrun { "DRYRUN " } else { "" };
        match &report.outcome {
            AssetOutcome::Moved {
                kind,
                destination,
                variant,
            } => {
                println!("{prefix}{}", name.bold());
                println!("  {}: {}", kind.to_string().cyan(), destination.display());
                if self.verbose {
                    println!("  Matched {variant}");
                }
            }
            AssetOutcome::Failed { error, failed_path } => {
                println!("{prefix}{}", name.bold().red());
                println!("  {}", error.to_string().red());
                if report.left_in_place() {
                    println!("  {}", "Could not move to failed directory, file left in place".yellow());
                } else if self.verbose
                    && let Some(path) = failed_path
                {
                    println!("  Moved to {}", path.display());
                }
            }
        }
    }

    fn run_finished(&mut self, stats: &RunStatistics) {
        stats.print_summary();
    }
}

impl<T: ReportSink + ?Sized> ReportSink for &mut T {
    fn asset_processed(&mut self, report: &AssetReport) {
        (**self).asset_processed(report);
    }

    fn run_finished(&mut self, stats: &RunStatistics) {
        (**self).run_finished(stats);
    }
}

impl<T: ReportSink> ReportSink for Option<T> {
    fn asset_processed(&mut self, report: &AssetReport) {
        if let Some(sink) = self {
            sink.asset_processed(report);
        }
    }

    fn run_finished(&mut self, stats: &RunStatistics) {
        if let Some(sink) = self {
            sink.run_finished(stats);
        }
    }
}

/// Forward to both sinks in order.
impl<A: ReportSink, B: ReportSink> ReportSink for (A, B) {
    fn asset_processed(&mut self, report: &AssetReport) {
        self.0.asset_processed(report);
        self.1.asset_processed(report);
    }

    fn run_finished(&mut self, stats: &RunStatistics) {
        self.0.run_finished(stats);
        self.1.run_finished(stats);
    }
}
