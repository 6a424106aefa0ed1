//! Resolve a parsed asset to a library directory.

use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::assets::candidate::{AssetCandidate, AssetShape};
use crate::assets::error::AssetError;
use crate::assets::index::{DirectoryIndex, IndexCache};
use crate::assets::normalize::{self, DashSpacing, NameVariant, VariantStrategy, variants_for};
use crate::assets::types::EntityKind;

/// Library roots assets are matched against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryRoots {
    pub movies: Option<PathBuf>,
    pub shows: Option<PathBuf>,
    pub collections: Option<PathBuf>,
}

/// Directory an asset resolved to, with the variant that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDirectory {
    pub root: PathBuf,
    pub name: String,
    pub variant: NameVariant,
}

/// Outcome of resolving one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Matched(MatchedDirectory),
    /// Several distinct directories matched at the same priority.
    Ambiguous {
        strategy: VariantStrategy,
        directories: Vec<String>,
    },
    NotFound,
}

/// Decides the entity kind of a candidate and finds its library directory.
#[derive(Debug, Clone)]
pub struct MediaMatcher {
    roots: LibraryRoots,
    collection_suffixes: Vec<String>,
    dash_spacing: DashSpacing,
}

impl MatchedDirectory {
    /// Absolute path of the matched directory.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.name)
    }
}

impl MatchResult {
    /// Convert a non-match into the corresponding asset error.
    ///
    /// # Errors
    /// Returns `Ambiguous` or `NotFound` for the respective outcomes.
    pub fn into_matched(self) -> Result<MatchedDirectory, AssetError> {
        match self {
            Self::Matched(matched) => Ok(matched),
            Self::Ambiguous { strategy, directories } => Err(AssetError::Ambiguous { strategy, directories }),
            Self::NotFound => Err(AssetError::NotFound),
        }
    }
}

impl MediaMatcher {
    #[must_use]
    pub const fn new(roots: LibraryRoots, collection_suffixes: Vec<String>, dash_spacing: DashSpacing) -> Self {
        Self {
            roots,
            collection_suffixes,
            dash_spacing,
        }
    }

    #[must_use]
    pub const fn roots(&self) -> &LibraryRoots {
        &self.roots
    }

    /// Classify the candidate by filename shape and resolve its directory.
    ///
    /// Priority tiers are evaluated in order across all applicable roots,
    /// so an exact match in a later root wins over a loose match in an earlier one.
    /// Within a tier, roots are searched in order and the first root producing a match
    /// or an ambiguity decides. Unavailable roots are skipped.
    ///
    /// # Errors
    /// Returns `DirectoryUnavailable` only when every applicable configured root is unavailable.
    pub fn classify_and_match(
        &self,
        candidate: &AssetCandidate,
        indices: &mut IndexCache,
    ) -> Result<(EntityKind, MatchResult), AssetError> {
        let plan = self.search_plan(candidate);
        let primary_kind = plan.first().map_or(EntityKind::Movie, |(kind, _)| *kind);
        let variants = variants_for(candidate.title(), candidate.year());

        let mut unavailable: Option<AssetError> = None;
        let mut available: Vec<(EntityKind, &Path)> = Vec::new();
        for (kind, root) in plan {
            match indices.get_or_build(root) {
                Ok(_) => available.push((kind, root)),
                Err(error) => {
                    unavailable.get_or_insert(error);
                }
            }
        }
        if available.is_empty()
            && let Some(error) = unavailable
        {
            return Err(error);
        }

        for tier in self.tiers(&variants) {
            for (kind, root) in &available {
                let Some(index) = indices.get(root) else {
                    continue;
                };
                match self.resolve_tier(index, &variants, tier, candidate.year()) {
                    MatchResult::NotFound => {}
                    result => return Ok((*kind, result)),
                }
            }
        }

        Ok((primary_kind, MatchResult::NotFound))
    }

    /// Evaluate variants tier by tier against one index.
    ///
    /// The first tier with any matching directory decides:
    /// exactly one distinct directory is a match, more than one is ambiguous.
    /// With a `year`, directories carrying a different year never match.
    #[must_use]
    pub fn resolve(&self, index: &DirectoryIndex, variants: &[NameVariant], year: Option<u16>) -> MatchResult {
        self.tiers(variants)
            .into_iter()
            .map(|tier| self.resolve_tier(index, variants, tier, year))
            .find(|result| *result != MatchResult::NotFound)
            .unwrap_or(MatchResult::NotFound)
    }

    /// True if the title ends with one of the configured collection suffixes.
    #[must_use]
    pub fn is_collection_title(&self, title: &str) -> bool {
        let title = title.trim().to_lowercase();
        self.collection_suffixes.iter().any(|suffix| {
            let suffix = suffix.trim().to_lowercase();
            !suffix.is_empty() && title.len() > suffix.len() && title.ends_with(&suffix)
        })
    }

    /// Distinct priority tiers used by the variants, lowest first.
    fn tiers(&self, variants: &[NameVariant]) -> Vec<u8> {
        variants
            .iter()
            .flat_map(NameVariant::lookups)
            .map(|strategy| strategy.tier(self.dash_spacing))
            .sorted_unstable()
            .dedup()
            .collect()
    }

    fn resolve_tier(
        &self,
        index: &DirectoryIndex,
        variants: &[NameVariant],
        tier: u8,
        year: Option<u16>,
    ) -> MatchResult {
        let mut found: Vec<(&str, NameVariant)> = Vec::new();
        for variant in variants {
            for strategy in variant
                .lookups()
                .filter(|strategy| strategy.tier(self.dash_spacing) == tier)
            {
                for name in index.matches_as(variant, strategy) {
                    if year_conflicts(year, name) || found.iter().any(|(existing, _)| *existing == name) {
                        continue;
                    }
                    found.push((name, variant.as_strategy(strategy)));
                }
            }
        }

        match found.as_slice() {
            [] => MatchResult::NotFound,
            [(name, variant)] => MatchResult::Matched(MatchedDirectory {
                root: index.root().to_path_buf(),
                name: (*name).to_string(),
                variant: variant.clone(),
            }),
            [(_, first), ..] => MatchResult::Ambiguous {
                strategy: first.strategy,
                directories: found.iter().map(|(name, _)| (*name).to_string()).sorted().collect(),
            },
        }
    }

    /// Roots to search, in order, with the entity kind a match in that root implies.
    fn search_plan(&self, candidate: &AssetCandidate) -> Vec<(EntityKind, &Path)> {
        let plan = match candidate.shape() {
            AssetShape::Episode { .. } => vec![(EntityKind::Episode, self.roots.shows.as_deref())],
            AssetShape::Season { .. } => vec![(EntityKind::Season, self.roots.shows.as_deref())],
            // A dated title found in the movies root is a movie that happens to end with the suffix.
            AssetShape::Title if self.is_collection_title(candidate.title()) => vec![
                (EntityKind::Collection, self.roots.collections.as_deref()),
                (
                    if candidate.year().is_some() {
                        EntityKind::Movie
                    } else {
                        EntityKind::Collection
                    },
                    self.roots.movies.as_deref(),
                ),
            ],
            AssetShape::Title => vec![
                (EntityKind::Movie, self.roots.movies.as_deref()),
                (EntityKind::Show, self.roots.shows.as_deref()),
            ],
        };

        plan.into_iter()
            .filter_map(|(kind, root)| root.map(|root| (kind, root)))
            .collect()
    }
}

/// True if the directory name carries a year different from the candidate year.
fn year_conflicts(year: Option<u16>, directory: &str) -> bool {
    year.is_some_and(|year| normalize::trailing_year(directory).is_some_and(|found| found != year))
}
