//! End-to-end pipeline tests against a temporary library layout.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use asset_assistant::assets::{
    ArtRole, AssetError, AssetOutcome, AssetPipeline, AssetReport, DimensionProbe, EntityKind, FileOpError,
    FsFileOperations, LibraryRoots, ReportSink, RunStatistics, SeasonZero, Service, Settings, VariantStrategy,
};

/// Probe with a fixed answer.
struct FixedProbe(Option<ArtRole>);

impl DimensionProbe for FixedProbe {
    fn probe(&self, _path: &Path) -> Option<ArtRole> {
        self.0
    }
}

#[derive(Default)]
struct Recorder {
    reports: Vec<AssetReport>,
    finished: Vec<RunStatistics>,
}

impl ReportSink for Recorder {
    fn asset_processed(&mut self, report: &AssetReport) {
        self.reports.push(report.clone());
    }

    fn run_finished(&mut self, stats: &RunStatistics) {
        self.finished.push(stats.clone());
    }
}

struct Library {
    _dir: TempDir,
    staging: PathBuf,
    movies: PathBuf,
    shows: PathBuf,
    collections: PathBuf,
}

impl Library {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().to_path_buf();
        let library = Self {
            staging: root.join("staging"),
            movies: root.join("movies"),
            shows: root.join("shows"),
            collections: root.join("collections"),
            _dir: dir,
        };
        for path in [&library.staging, &library.movies, &library.shows, &library.collections] {
            fs::create_dir(path).expect("create dir");
        }
        library
    }

    fn settings(&self) -> Settings {
        let mut settings = Settings::new(self.staging.clone());
        settings.roots = LibraryRoots {
            movies: Some(self.movies.clone()),
            shows: Some(self.shows.clone()),
            collections: Some(self.collections.clone()),
        };
        settings
    }

    fn add_show(&self, name: &str) {
        fs::create_dir(self.shows.join(name)).expect("create show dir");
    }

    fn add_movie(&self, name: &str) {
        fs::create_dir(self.movies.join(name)).expect("create movie dir");
    }

    fn add_collection(&self, name: &str) {
        fs::create_dir(self.collections.join(name)).expect("create collection dir");
    }

    fn stage(&self, name: &str, content: &str) -> PathBuf {
        let path = self.staging.join(name);
        fs::write(&path, content).expect("write staged file");
        path
    }

    fn failed(&self) -> PathBuf {
        self.staging.join("failed")
    }

    fn backup(&self) -> PathBuf {
        self.staging.join("backup")
    }
}

fn pipeline(settings: Settings, recorder: &mut Recorder) -> AssetPipeline<FsFileOperations, FixedProbe, &mut Recorder> {
    AssetPipeline::new(settings, FsFileOperations, FixedProbe(None), recorder)
}

fn moved_to(report: &AssetReport) -> (EntityKind, PathBuf) {
    match &report.outcome {
        AssetOutcome::Moved { kind, destination, .. } => (*kind, destination.clone()),
        AssetOutcome::Failed { error, .. } => panic!("expected move, failed with: {error}"),
    }
}

fn failure(report: &AssetReport) -> (AssetError, Option<PathBuf>) {
    match &report.outcome {
        AssetOutcome::Failed { error, failed_path } => (error.clone(), failed_path.clone()),
        AssetOutcome::Moved { destination, .. } => panic!("expected failure, moved to {}", destination.display()),
    }
}

#[test]
fn show_poster_is_placed_in_show_directory() {
    let library = Library::new();
    library.add_show("Alpha (2020)");
    let source = library.stage("Alpha (2020).jpg", "alpha");

    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(library.settings(), &mut recorder);
    let report = pipeline.process(&source);

    let (kind, destination) = moved_to(&report);
    assert_eq!(kind, EntityKind::Show);
    assert_eq!(destination, library.shows.join("Alpha (2020)").join("poster.jpg"));
    assert_eq!(fs::read_to_string(&destination).unwrap(), "alpha");
    assert!(!source.exists());
    assert_eq!(pipeline.stats().shows, 1);
}

#[test]
fn collection_poster_is_placed_in_collection_directory() {
    let library = Library::new();
    library.add_collection("Beta Collection");
    let source = library.stage("Beta Collection.jpg", "beta");

    let mut settings = library.settings();
    settings.service = Some(Service::Kometa);
    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(settings, &mut recorder);
    let report = pipeline.process(&source);

    let (kind, destination) = moved_to(&report);
    assert_eq!(kind, EntityKind::Collection);
    assert_eq!(destination, library.collections.join("Beta Collection").join("poster.jpg"));
    assert!(destination.exists());
    assert_eq!(pipeline.stats().collections, 1);
}

#[test]
fn season_poster_follows_service_convention() {
    let library = Library::new();
    library.add_show("Gamma (1999)");

    let mut settings = library.settings();
    settings.service = Some(Service::Plex);
    let mut recorder = Recorder::default();
    let mut plex = pipeline(settings, &mut recorder);
    let report = plex.process(&library.stage("Gamma (1999) - Season 01.jpg", "plex"));
    let (kind, destination) = moved_to(&report);
    assert_eq!(kind, EntityKind::Season);
    assert_eq!(
        destination,
        library.shows.join("Gamma (1999)").join("Season 01").join("Season01.jpg")
    );
    assert!(destination.exists());

    let mut settings = library.settings();
    settings.service = Some(Service::Kometa);
    let mut recorder = Recorder::default();
    let mut kometa = pipeline(settings, &mut recorder);
    let report = kometa.process(&library.stage("Gamma (1999) - Season 01.jpg", "kometa"));
    let (_, destination) = moved_to(&report);
    assert_eq!(destination, library.shows.join("Gamma (1999)").join("Season01.jpg"));
}

#[test]
fn plex_specials_need_season_zero_naming() {
    let library = Library::new();
    library.add_show("Gamma (1999)");

    let mut settings = library.settings();
    settings.service = Some(Service::Plex);
    let mut recorder = Recorder::default();
    let mut unset = pipeline(settings.clone(), &mut recorder);
    let report = unset.process(&library.stage("Gamma (1999) - Specials.jpg", ""));
    assert_eq!(failure(&report).0, AssetError::SeasonZeroNamingUnset);

    settings.season_zero = Some(SeasonZero::Specials);
    let mut recorder = Recorder::default();
    let mut configured = pipeline(settings, &mut recorder);
    let report = configured.process(&library.stage("Gamma (1999) - Specials.jpg", ""));
    let (_, destination) = moved_to(&report);
    assert_eq!(
        destination,
        library
            .shows
            .join("Gamma (1999)")
            .join("Specials")
            .join("season-specials-poster.jpg")
    );
}

#[test]
fn episode_card_is_placed_in_season_directory() {
    let library = Library::new();
    library.add_show("Gamma (1999)");

    let mut settings = library.settings();
    settings.service = Some(Service::Kodi);
    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(settings, &mut recorder);
    let report = pipeline.process(&library.stage("Gamma (1999) - S01E02.jpg", ""));

    let (kind, destination) = moved_to(&report);
    assert_eq!(kind, EntityKind::Episode);
    assert_eq!(
        destination,
        library.shows.join("Gamma (1999)").join("Season 01").join("S01E02-thumb.jpg")
    );
    assert!(destination.exists());
}

#[test]
fn unknown_title_goes_to_failed_bucket() {
    let library = Library::new();
    library.add_show("Alpha (2020)");
    let source = library.stage("Unknown Title (2099).jpg", "unknown");

    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(library.settings(), &mut recorder);
    let report = pipeline.process(&source);

    let (error, failed_path) = failure(&report);
    assert_eq!(error, AssetError::NotFound);
    assert_eq!(failed_path, Some(library.failed().join("Unknown Title (2099).jpg")));
    assert!(!source.exists());
    assert!(library.failed().join("Unknown Title (2099).jpg").exists());
    assert_eq!(pipeline.stats().failed, 1);
}

#[test]
fn failed_bucket_never_overwrites() {
    let library = Library::new();
    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(library.settings(), &mut recorder);

    pipeline.process(&library.stage("Unknown (2099).jpg", "first"));
    let report = pipeline.process(&library.stage("Unknown (2099).jpg", "second"));

    let (_, failed_path) = failure(&report);
    let second = library.failed().join("Unknown (2099) (1).jpg");
    assert_eq!(failed_path, Some(second.clone()));
    assert_eq!(fs::read_to_string(library.failed().join("Unknown (2099).jpg")).unwrap(), "first");
    assert_eq!(fs::read_to_string(second).unwrap(), "second");
}

#[test]
fn reprocessing_targets_the_same_destination() {
    let library = Library::new();
    library.add_show("Alpha (2020)");
    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(library.settings(), &mut recorder);

    let first = moved_to(&pipeline.process(&library.stage("Alpha (2020).jpg", "first")));
    let second = moved_to(&pipeline.process(&library.stage("Alpha (2020).jpg", "second")));

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second.1).unwrap(), "second");
}

#[test]
fn placed_asset_resolves_to_its_own_location() {
    let library = Library::new();
    library.add_show("Alpha (2020)");
    library.add_show("Gamma (1999)");

    let mut settings = library.settings();
    settings.service = Some(Service::Plex);
    settings.season_zero = Some(SeasonZero::Specials);
    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(settings, &mut recorder);

    for name in ["Alpha (2020) - Background.jpg", "Gamma (1999) - Season 01.jpg", "Gamma (1999) - S01E02.jpg"] {
        let first = moved_to(&pipeline.process(&library.stage(name, name)));
        let again = moved_to(&pipeline.process(&first.1));
        assert_eq!(first, again, "{name}");
        assert_eq!(fs::read_to_string(&again.1).unwrap(), name);
    }
}

#[test]
fn dated_title_is_not_placed_in_other_year_directory() {
    let library = Library::new();
    library.add_movie("Alpha (2010)");
    library.add_show("Alpha (2020)");
    let movie_poster = library.movies.join("Alpha (2010)").join("poster.jpg");
    fs::write(&movie_poster, "movie 2010").unwrap();

    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(library.settings(), &mut recorder);
    let (kind, destination) = moved_to(&pipeline.process(&library.stage("Alpha (2020).jpg", "show 2020")));

    assert_eq!(kind, EntityKind::Show);
    assert_eq!(destination, library.shows.join("Alpha (2020)").join("poster.jpg"));
    assert_eq!(fs::read_to_string(&movie_poster).unwrap(), "movie 2010");
}

#[test]
fn dated_collection_suffix_title_is_a_movie() {
    let library = Library::new();
    library.add_movie("The Collection (2012)");

    let mut settings = library.settings();
    settings.service = Some(Service::Plex);
    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(settings, &mut recorder);
    let (kind, destination) = moved_to(&pipeline.process(&library.stage("The Collection (2012).jpg", "")));

    assert_eq!(kind, EntityKind::Movie);
    assert_eq!(destination, library.movies.join("The Collection (2012)").join("poster.jpg"));
}

#[test]
fn spacing_only_directories_are_ambiguous() {
    let library = Library::new();
    library.add_show("The Thing - Subtitle");
    library.add_show("The Thing-Subtitle");
    let source = library.stage("The Thing: Subtitle.jpg", "");

    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(library.settings(), &mut recorder);
    let (error, failed_path) = failure(&pipeline.process(&source));

    assert_eq!(
        error,
        AssetError::Ambiguous {
            strategy: VariantStrategy::ColonDashSpaced,
            directories: vec!["The Thing - Subtitle".to_string(), "The Thing-Subtitle".to_string()],
        }
    );
    assert!(failed_path.is_some());
}

#[test]
fn same_title_different_years_stay_separate() {
    let library = Library::new();
    library.add_movie("Alpha (2010)");
    library.add_movie("Alpha (2020)");

    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(library.settings(), &mut recorder);
    let (_, first) = moved_to(&pipeline.process(&library.stage("Alpha (2010).jpg", "")));
    let (_, second) = moved_to(&pipeline.process(&library.stage("Alpha (2020).jpg", "")));

    assert_eq!(first, library.movies.join("Alpha (2010)").join("poster.jpg"));
    assert_eq!(second, library.movies.join("Alpha (2020)").join("poster.jpg"));
}

#[test]
fn unsupported_extension_is_failed() {
    let library = Library::new();
    library.add_show("Alpha (2020)");
    let source = library.stage("Alpha (2020).txt", "");

    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(library.settings(), &mut recorder);
    let (error, _) = failure(&pipeline.process(&source));

    assert_eq!(
        error,
        AssetError::UnsupportedFileType {
            extension: "txt".to_string()
        }
    );
    assert!(library.failed().join("Alpha (2020).txt").exists());
}

#[test]
fn probe_decides_role_without_marker() {
    let library = Library::new();
    library.add_movie("Delta (2015)");

    let mut recorder = Recorder::default();
    let mut pipeline = AssetPipeline::new(
        library.settings(),
        FsFileOperations,
        FixedProbe(Some(ArtRole::Background)),
        &mut recorder,
    );
    let (_, destination) = moved_to(&pipeline.process(&library.stage("Delta (2015).jpg", "")));
    assert_eq!(destination, library.movies.join("Delta (2015)").join("background.jpg"));

    // A filename marker wins over the probe.
    let (_, destination) = moved_to(&pipeline.process(&library.stage("Delta (2015) - Poster.jpg", "")));
    assert_eq!(destination, library.movies.join("Delta (2015)").join("poster.jpg"));
}

#[test]
fn existing_destination_is_kept_without_overwrite() {
    let library = Library::new();
    library.add_show("Alpha (2020)");
    let existing = library.shows.join("Alpha (2020)").join("poster.jpg");
    fs::write(&existing, "old").unwrap();
    let source = library.stage("Alpha (2020).jpg", "new");

    let mut settings = library.settings();
    settings.overwrite = false;
    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(settings, &mut recorder);
    let (error, failed_path) = failure(&pipeline.process(&source));

    assert_eq!(
        error,
        AssetError::FileOperation(FileOpError::DestinationExists { path: existing.clone() })
    );
    assert_eq!(fs::read_to_string(&existing).unwrap(), "old");
    assert!(failed_path.is_some());
}

#[test]
fn backups_keep_source_and_replaced_destination() {
    let library = Library::new();
    library.add_show("Alpha (2020)");
    let existing = library.shows.join("Alpha (2020)").join("poster.jpg");
    fs::write(&existing, "old").unwrap();
    let source = library.stage("Alpha (2020).jpg", "new");

    let mut settings = library.settings();
    settings.backup_source = true;
    settings.backup_destination = true;
    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(settings, &mut recorder);
    moved_to(&pipeline.process(&source));

    assert_eq!(fs::read_to_string(&existing).unwrap(), "new");
    assert_eq!(
        fs::read_to_string(library.backup().join("Alpha (2020)").join("poster.jpg")).unwrap(),
        "old"
    );
    assert_eq!(
        fs::read_to_string(library.backup().join("Alpha (2020).jpg")).unwrap(),
        "new"
    );
    assert_eq!(pipeline.stats().backed_up, 2);
}

#[test]
fn dryrun_changes_nothing() {
    let library = Library::new();
    library.add_show("Alpha (2020)");
    let matched = library.stage("Alpha (2020).jpg", "");
    let unmatched = library.stage("Unknown (2099).jpg", "");

    let mut settings = library.settings();
    settings.dryrun = true;
    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(settings, &mut recorder);

    let report = pipeline.process(&matched);
    assert!(report.dryrun);
    let (_, destination) = moved_to(&report);
    assert!(!destination.exists());
    assert!(matched.exists());

    let (_, failed_path) = failure(&pipeline.process(&unmatched));
    assert_eq!(failed_path, None);
    assert!(unmatched.exists());
    assert!(!library.failed().exists());
}

#[test]
fn unavailable_library_root_fails_the_asset() {
    let library = Library::new();
    let mut settings = library.settings();
    settings.roots = LibraryRoots {
        movies: None,
        shows: Some(library.staging.join("missing")),
        collections: None,
    };
    let source = library.stage("Gamma (1999) - S01E01.jpg", "");

    let mut recorder = Recorder::default();
    let mut pipeline = pipeline(settings, &mut recorder);
    let (error, _) = failure(&pipeline.process(&source));
    assert!(matches!(error, AssetError::DirectoryUnavailable { .. }));
}

#[test]
fn sink_receives_every_asset_and_final_statistics() {
    let library = Library::new();
    library.add_show("Alpha (2020)");
    let mut recorder = Recorder::default();
    {
        let mut pipeline = pipeline(library.settings(), &mut recorder);
        pipeline.process(&library.stage("Alpha (2020).jpg", ""));
        pipeline.process(&library.stage("Unknown (2099).jpg", ""));
        let stats = pipeline.finish();
        assert_eq!(stats.total_processed(), 2);
    }

    assert_eq!(recorder.reports.len(), 2);
    assert_eq!(recorder.finished.len(), 1);
    assert_eq!(recorder.finished[0].shows, 1);
    assert_eq!(recorder.finished[0].failed, 1);
    assert!(recorder.reports[1].is_failed());
}
