//! Artwork matching and placement.
//!
//! A staged image file is parsed into an [`AssetCandidate`],
//! matched against cached listings of the library roots,
//! given a destination name for the active [`Service`],
//! and finally moved there or into the failed bucket.

pub mod candidate;
pub mod classify;
pub mod error;
pub mod file_ops;
pub mod index;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod settings;
pub mod stats;
pub mod types;

pub use candidate::{AssetCandidate, AssetShape};
pub use classify::{AssetClassifier, ClassificationResult};
pub use error::{AssetError, FileOpError};
pub use file_ops::{FileOperations, FsFileOperations};
pub use index::{DirectoryIndex, IndexCache};
pub use matcher::{LibraryRoots, MatchResult, MatchedDirectory, MediaMatcher};
pub use normalize::{DashSpacing, MATCH_ORDER, NameVariant, VariantStrategy, variants_for};
pub use pipeline::AssetPipeline;
pub use probe::{DimensionProbe, ImageDimensionProbe};
pub use report::{AssetOutcome, AssetReport, ConsoleReporter, ReportSink};
pub use settings::{AssistConfig, Settings};
pub use stats::RunStatistics;
pub use types::{ArtRole, EntityKind, SeasonZero, Service};
