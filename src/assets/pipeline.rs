//! Drives one staged asset at a time from receipt to a terminal outcome.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::assets::candidate::AssetCandidate;
use crate::assets::classify::{AssetClassifier, ClassificationResult};
use crate::assets::error::{AssetError, FileOpError};
use crate::assets::file_ops::{FileOperations, unique_path};
use crate::assets::index::IndexCache;
use crate::assets::matcher::{MatchedDirectory, MediaMatcher};
use crate::assets::probe::DimensionProbe;
use crate::assets::report::{AssetOutcome, AssetReport, ReportSink};
use crate::assets::settings::Settings;
use crate::assets::stats::RunStatistics;
use crate::assets::types::{ArtRole, EntityKind};

/// Processing state of a single asset.
///
/// Every asset goes `Received -> Classified -> Resolved -> Moved`
/// and may drop to `Failed` from any non-terminal state.
#[derive(Debug)]
enum AssetState {
    Received(PathBuf),
    /// Entity kind decided and library directory found.
    Classified {
        candidate: AssetCandidate,
        kind: EntityKind,
        matched: MatchedDirectory,
    },
    /// Destination computed.
    Resolved {
        candidate: AssetCandidate,
        matched: MatchedDirectory,
        classification: ClassificationResult,
    },
    Moved {
        source: PathBuf,
        kind: EntityKind,
        destination: PathBuf,
        matched: MatchedDirectory,
    },
    Failed {
        source: PathBuf,
        error: AssetError,
    },
}

/// Sequential asset processor.
///
/// Holds the directory index cache for the whole run,
/// so each library root is listed at most once.
pub struct AssetPipeline<F: FileOperations, P: DimensionProbe, S: ReportSink> {
    settings: Settings,
    matcher: MediaMatcher,
    classifier: AssetClassifier,
    indices: IndexCache,
    file_ops: F,
    probe: P,
    sink: S,
    stats: RunStatistics,
    started: Instant,
}

impl<F: FileOperations, P: DimensionProbe, S: ReportSink> AssetPipeline<F, P, S> {
    pub fn new(settings: Settings, file_ops: F, probe: P, sink: S) -> Self {
        let matcher = MediaMatcher::new(
            settings.roots.clone(),
            settings.collection_suffixes.clone(),
            settings.dash_spacing,
        );
        let classifier = AssetClassifier::new(settings.service, settings.season_zero);
        Self {
            settings,
            matcher,
            classifier,
            indices: IndexCache::new(),
            file_ops,
            probe,
            sink,
            stats: RunStatistics::default(),
            started: Instant::now(),
        }
    }

    /// Process one staged file to a terminal outcome.
    ///
    /// Failures never propagate: they are recorded, reported, and the file is moved to the failed bucket.
    pub fn process(&mut self, source: &Path) -> AssetReport {
        let mut state = AssetState::Received(source.to_path_buf());
        let report = loop {
            state = match state {
                AssetState::Moved {
                    source,
                    kind,
                    destination,
                    matched,
                } => break self.record_moved(source, kind, destination, matched),
                AssetState::Failed { source, error } => break self.record_failed(source, error),
                other => self.step(other),
            };
        };

        self.sink.asset_processed(&report);
        report
    }

    /// Report final statistics to the sink and return them.
    pub fn finish(mut self) -> RunStatistics {
        self.stats.duration = self.started.elapsed();
        self.sink.run_finished(&self.stats);
        self.stats
    }

    #[must_use]
    pub const fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Advance a non-terminal state by one transition.
    fn step(&mut self, state: AssetState) -> AssetState {
        match state {
            AssetState::Received(source) => match self.receive(&source) {
                Ok((candidate, kind, matched)) => AssetState::Classified {
                    candidate,
                    kind,
                    matched,
                },
                Err(error) => AssetState::Failed { source, error },
            },
            AssetState::Classified {
                candidate,
                kind,
                matched,
            } => {
                let role = self.art_role(&candidate, kind);
                match self.classifier.classify(&candidate, kind, &matched, role) {
                    Ok(classification) => AssetState::Resolved {
                        candidate,
                        matched,
                        classification,
                    },
                    Err(error) => AssetState::Failed {
                        source: candidate.source().to_path_buf(),
                        error,
                    },
                }
            }
            AssetState::Resolved {
                candidate,
                matched,
                classification,
            } => {
                let source = candidate.source().to_path_buf();
                match self.realize(&source, &matched, &classification) {
                    Ok(()) => AssetState::Moved {
                        source,
                        kind: classification.kind,
                        destination: classification.destination(),
                        matched,
                    },
                    Err(error) => AssetState::Failed {
                        source,
                        error: error.into(),
                    },
                }
            }
            terminal @ (AssetState::Moved { .. } | AssetState::Failed { .. }) => terminal,
        }
    }

    /// Parse the filename, decide the entity kind and find the library directory.
    fn receive(&mut self, source: &Path) -> Result<(AssetCandidate, EntityKind, MatchedDirectory), AssetError> {
        let extension = crate::path_to_file_extension_string(source);
        if !self.settings.accepts_extension(&extension) {
            return Err(AssetError::UnsupportedFileType { extension });
        }

        let candidate = if self.is_in_library(source) {
            AssetCandidate::from_placed_path(source)?
        } else {
            AssetCandidate::from_path(source)?
        };
        let (kind, result) = self.matcher.classify_and_match(&candidate, &mut self.indices)?;
        let matched = result.into_matched()?;
        Ok((candidate, kind, matched))
    }

    fn is_in_library(&self, source: &Path) -> bool {
        let roots = &self.settings.roots;
        [&roots.movies, &roots.shows, &roots.collections]
            .into_iter()
            .flatten()
            .any(|root| source.starts_with(root))
    }

    /// Filename marker first, then image dimensions for main art, poster otherwise.
    fn art_role(&self, candidate: &AssetCandidate, kind: EntityKind) -> ArtRole {
        if let Some(role) = candidate.role() {
            return role;
        }
        match kind {
            EntityKind::Movie | EntityKind::Show | EntityKind::Collection => {
                self.probe.probe(candidate.source()).unwrap_or_default()
            }
            EntityKind::Season | EntityKind::Episode => ArtRole::Poster,
        }
    }

    /// Perform backups and the move. Nothing is changed in dry-run mode.
    fn realize(
        &mut self,
        source: &Path,
        matched: &MatchedDirectory,
        classification: &ClassificationResult,
    ) -> Result<(), FileOpError> {
        if self.settings.dryrun {
            return Ok(());
        }

        let destination = classification.destination();
        if destination == source {
            return Ok(());
        }
        if destination.exists() {
            if !self.settings.overwrite {
                return Err(FileOpError::DestinationExists { path: destination });
            }
            if self.settings.backup_destination {
                let relative = classification
                    .directory
                    .strip_prefix(&matched.root)
                    .unwrap_or_else(|_| Path::new(&matched.name));
                self.file_ops
                    .backup_file(&destination, &self.settings.backup.join(relative))?;
                self.stats.record_backup();
            }
        }

        if self.settings.backup_source {
            self.file_ops.backup_file(source, &self.settings.backup)?;
            self.stats.record_backup();
        }

        self.file_ops.create_dir_all(&classification.directory)?;
        self.file_ops
            .move_file(source, &destination, self.settings.overwrite)
    }

    fn record_moved(
        &mut self,
        source: PathBuf,
        kind: EntityKind,
        destination: PathBuf,
        matched: MatchedDirectory,
    ) -> AssetReport {
        self.stats.record_moved(kind);
        AssetReport {
            source,
            outcome: AssetOutcome::Moved {
                kind,
                destination,
                variant: matched.variant,
            },
            dryrun: self.settings.dryrun,
        }
    }

    /// Count the failure and route the file to the failed bucket.
    fn record_failed(&mut self, source: PathBuf, error: AssetError) -> AssetReport {
        self.stats.record_failed();
        let dryrun = self.settings.dryrun;
        let failed_path = if dryrun || Self::source_gone(&error) {
            None
        } else {
            self.move_to_failed(&source)
        };
        AssetReport {
            source,
            outcome: AssetOutcome::Failed { error, failed_path },
            dryrun,
        }
    }

    fn move_to_failed(&self, source: &Path) -> Option<PathBuf> {
        let failed_dir = &self.settings.failed;
        self.file_ops.create_dir_all(failed_dir).ok()?;
        let target = unique_path(&failed_dir.join(crate::path_to_filename_string(source)));
        self.file_ops.move_file(source, &target, false).ok()?;
        Some(target)
    }

    const fn source_gone(error: &AssetError) -> bool {
        matches!(
            error,
            AssetError::FileOperation(FileOpError::SourceMissing { .. })
        )
    }
}
