//! Title normalization and name variants used for directory matching.

use std::fmt;
use std::iter;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

/// Trailing release year in parentheses, for example "Alpha (2020)".
static RE_TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\((\d{4})\)\s*$").expect("Failed to compile trailing year regex"));

/// Colon with any spacing, or a dash with whitespace on at least one side.
/// A bare hyphen as in "Spider-Man" is part of the title and never splits it.
static RE_SUBTITLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*:\s*|\s+-\s*|\s*-\s+").expect("Failed to compile subtitle separator regex"));

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

/// Matching strategies in priority order.
///
/// This is the only place the strategy order is defined:
/// [`variants_for`] emits variants in this order and the matcher evaluates them in this order.
pub const MATCH_ORDER: [VariantStrategy; 6] = [
    VariantStrategy::Identity,
    VariantStrategy::ColonDashSpaced,
    VariantStrategy::ColonDashUnspaced,
    VariantStrategy::YearStripped,
    VariantStrategy::SubtitleStripped,
    VariantStrategy::TokenSet,
];

/// Transformation that produced a [`NameVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantStrategy {
    /// "Title (Year)" as parsed from the filename.
    Identity,
    /// Colon replaced with " - ".
    ColonDashSpaced,
    /// Colon replaced with "-", "- " or " -".
    ColonDashUnspaced,
    /// Title without the year.
    YearStripped,
    /// Primary title only, subtitle removed.
    SubtitleStripped,
    /// Lowercase words without punctuation, sorted.
    TokenSet,
}

/// Which derived form of a directory name a variant is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySpace {
    /// The full directory name.
    FullName,
    /// Directory name without a trailing "(Year)".
    YearStripped,
    /// Directory name without year and subtitle.
    PrimaryTitle,
    /// Sorted word set of the directory name.
    TokenSet,
}

/// Policy for directories that differ only by the spacing around a dash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashSpacing {
    /// Spaced and unspaced dash forms compete at the same priority,
    /// so two directories differing only by spacing are ambiguous.
    #[default]
    Strict,
    /// Try "Title - Subtitle" before "Title-Subtitle".
    PreferSpaced,
    /// Try "Title-Subtitle" before "Title - Subtitle".
    PreferUnspaced,
}

/// A normalized string derived from a title for matching purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameVariant {
    pub value: String,
    /// Earliest strategy producing this string.
    pub strategy: VariantStrategy,
    /// Later strategies that produced the same string.
    /// The value is also looked up in their key spaces, at their priority.
    pub merged: Vec<VariantStrategy>,
}

impl VariantStrategy {
    /// Directory key space this strategy is matched against.
    #[must_use]
    pub const fn key_space(self) -> KeySpace {
        match self {
            Self::Identity | Self::ColonDashSpaced | Self::ColonDashUnspaced => KeySpace::FullName,
            Self::YearStripped => KeySpace::YearStripped,
            Self::SubtitleStripped => KeySpace::PrimaryTitle,
            Self::TokenSet => KeySpace::TokenSet,
        }
    }

    /// Priority tier for the given dash spacing policy, lower is tried first.
    /// Variants sharing a tier are evaluated together.
    #[must_use]
    pub const fn tier(self, spacing: DashSpacing) -> u8 {
        match (self, spacing) {
            (Self::Identity, _) => 0,
            (Self::ColonDashSpaced, DashSpacing::PreferUnspaced)
            | (Self::ColonDashUnspaced, DashSpacing::PreferSpaced) => 2,
            (Self::ColonDashSpaced | Self::ColonDashUnspaced, _) => 1,
            (Self::YearStripped, _) => 3,
            (Self::SubtitleStripped, _) => 4,
            (Self::TokenSet, _) => 5,
        }
    }

    /// Candidate strings this strategy produces for a title.
    fn forms(self, title: &str, year: Option<u16>) -> Vec<String> {
        match self {
            Self::Identity => vec![with_year(title, year)],
            Self::ColonDashSpaced => {
                let segments = subtitle_segments(title);
                if segments.len() > 1 {
                    vec![with_year(&segments.join(" - "), year)]
                } else {
                    Vec::new()
                }
            }
            Self::ColonDashUnspaced => {
                let segments = subtitle_segments(title);
                if segments.len() > 1 {
                    ["-", "- ", " -"]
                        .iter()
                        .map(|separator| with_year(&segments.join(separator), year))
                        .collect()
                } else {
                    Vec::new()
                }
            }
            Self::YearStripped => vec![title.trim().to_string()],
            Self::SubtitleStripped => vec![primary_title(title)],
            Self::TokenSet => vec![token_set(&with_year(title, year))],
        }
    }
}

impl NameVariant {
    #[must_use]
    pub const fn new(value: String, strategy: VariantStrategy) -> Self {
        Self {
            value,
            strategy,
            merged: Vec::new(),
        }
    }

    /// Every strategy this value is looked up as, in priority order.
    pub fn lookups(&self) -> impl Iterator<Item = VariantStrategy> + '_ {
        iter::once(self.strategy).chain(self.merged.iter().copied())
    }

    /// Lookup key within the strategy's key space.
    #[must_use]
    pub fn key(&self) -> String {
        self.key_as(self.strategy)
    }

    /// Lookup key when the value is used as the given strategy.
    #[must_use]
    pub fn key_as(&self, strategy: VariantStrategy) -> String {
        match strategy {
            VariantStrategy::TokenSet => token_set(&self.value),
            _ => case_fold(&self.value),
        }
    }

    /// The same value attributed to one specific strategy.
    #[must_use]
    pub fn as_strategy(&self, strategy: VariantStrategy) -> Self {
        Self::new(self.value.clone(), strategy)
    }
}

impl fmt::Display for VariantStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "exact name",
            Self::ColonDashSpaced => "colon to spaced dash",
            Self::ColonDashUnspaced => "colon to unspaced dash",
            Self::YearStripped => "name without year",
            Self::SubtitleStripped => "name without subtitle",
            Self::TokenSet => "word set",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for NameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.value, self.strategy)
    }
}

/// Produce the ordered name variants for a title and optional year.
///
/// Variants follow [`MATCH_ORDER`] and every string appears once, compared case-insensitively.
/// A later strategy producing an existing string is recorded in [`NameVariant::merged`]
/// instead of adding a new variant.
#[must_use]
pub fn variants_for(title: &str, year: Option<u16>) -> Vec<NameVariant> {
    let mut variants: Vec<NameVariant> = Vec::new();
    for strategy in MATCH_ORDER {
        for form in strategy.forms(title, year) {
            if form.is_empty() {
                continue;
            }
            let folded = case_fold(&form);
            match variants.iter_mut().find(|existing| case_fold(&existing.value) == folded) {
                Some(existing) => {
                    if existing.lookups().all(|known| known != strategy) {
                        existing.merged.push(strategy);
                    }
                }
                None => variants.push(NameVariant::new(form, strategy)),
            }
        }
    }
    variants
}

/// Case-folded comparison form: NFC composed, lowercase, single spaces.
#[must_use]
pub fn case_fold(name: &str) -> String {
    let composed: String = name.nfc().collect();
    RE_WHITESPACE.replace_all(composed.trim(), " ").to_lowercase()
}

/// Year from a trailing "(Year)", if present.
#[must_use]
pub fn trailing_year(name: &str) -> Option<u16> {
    RE_TRAILING_YEAR
        .captures(name)
        .and_then(|captures| captures[1].parse::<u16>().ok())
}

/// Remove a trailing "(Year)" from a name.
#[must_use]
pub fn strip_year(name: &str) -> String {
    RE_TRAILING_YEAR.replace(name, "").trim().to_string()
}

/// Title segments split at colons and spaced dashes.
#[must_use]
pub fn subtitle_segments(title: &str) -> Vec<&str> {
    RE_SUBTITLE_SEPARATOR
        .split(title.trim())
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Primary title without year and subtitle.
#[must_use]
pub fn primary_title(name: &str) -> String {
    let without_year = strip_year(name);
    subtitle_segments(&without_year)
        .first()
        .map_or_else(|| without_year.clone(), |segment| (*segment).to_string())
}

/// Loose comparison form: lowercase words with punctuation removed, sorted and de-duplicated.
#[must_use]
pub fn token_set(name: &str) -> String {
    let cleaned: String = case_fold(name)
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' {
                None
            } else {
                Some(' ')
            }
        })
        .collect();

    cleaned.split_whitespace().sorted_unstable().dedup().join(" ")
}

fn with_year(name: &str, year: Option<u16>) -> String {
    let name = name.trim();
    year.map_or_else(|| name.to_string(), |year| format!("{name} ({year})"))
}
