use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::assets::error::AssetError;
use crate::assets::types::ArtRole;

/// Episode token such as "S01E02", "s1.e2" or "S01 E02".
static RE_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])s(\d{1,3})[\s._-]?e(\d{1,4})(?:[^0-9]|$)")
        .expect("Failed to compile episode regex")
});

/// Season token such as "Season 01" or "Season.1".
static RE_SEASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])season[\s._-]*(\d{1,3})(?:[^0-9]|$)").expect("Failed to compile season regex")
});

static RE_SPECIALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])specials(?:[^a-z0-9]|$)").expect("Failed to compile specials regex")
});

/// Art role marker at the end of the name, for example "Alpha (2020) - Background".
static RE_ROLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\s._-]+(poster|background|backdrop|fanart)$").expect("Failed to compile art role regex")
});

static RE_TITLE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>.+?)\s*\((?P<year>\d{4})\)").expect("Failed to compile title and year regex")
});

/// File stem written by one of the service naming conventions.
static RE_PLACED_STEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<role>poster|background|fanart)|season(?P<season>\d{2,3})(?:-poster)?|(?P<specials>season-specials-poster)|s(?P<episode_season>\d{2,3})e(?P<episode>\d{2,4})(?:-thumb)?)$",
    )
    .expect("Failed to compile placed name regex")
});

/// Season directory inside a show directory.
static RE_SEASON_DIRECTORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:season\s*\d{1,3}|specials)$").expect("Failed to compile season directory regex")
});

static RE_TRAILING_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s._-]+$").expect("Failed to compile trailing separator regex"));

/// Shape of an asset derived from its filename tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetShape {
    /// Episode card for the given season and episode.
    Episode { season: u32, episode: u32 },
    /// Season poster, season zero for specials.
    Season { season: u32 },
    /// Main art for a movie, show or collection.
    Title,
}

/// One staged file, parsed once from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCandidate {
    source: PathBuf,
    file_name: String,
    extension: String,
    title: String,
    year: Option<u16>,
    season: Option<u32>,
    episode: Option<u32>,
    role: Option<ArtRole>,
}

impl AssetCandidate {
    /// Parse a staged file path.
    ///
    /// # Errors
    /// Returns `InvalidAssetName` if no title can be extracted from the filename.
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        let (file_name, extension) =
            crate::get_normalized_file_name_and_extension(path).map_err(|_| AssetError::InvalidAssetName {
                name: crate::path_to_filename_string(path),
            })?;
        Self::parse(path.to_path_buf(), file_name, extension.to_lowercase())
    }

    /// Parse a file that already sits in a library directory.
    ///
    /// Names written by a naming convention, such as `poster.jpg` or `Season 01/S01E02.jpg`,
    /// take their title and year from the enclosing show, movie or collection directory,
    /// so a placed file resolves to its own location again.
    /// Other names are parsed like staged files.
    ///
    /// # Errors
    /// Returns `InvalidAssetName` if no title can be extracted.
    pub fn from_placed_path(path: &Path) -> Result<Self, AssetError> {
        let (file_name, extension) =
            crate::get_normalized_file_name_and_extension(path).map_err(|_| AssetError::InvalidAssetName {
                name: crate::path_to_filename_string(path),
            })?;
        match Self::parse_placed(path, &file_name, &extension.to_lowercase()) {
            Some(candidate) => Ok(candidate),
            None => Self::parse(path.to_path_buf(), file_name, extension.to_lowercase()),
        }
    }

    fn parse_placed(source: &Path, file_name: &str, extension: &str) -> Option<Self> {
        let captures = RE_PLACED_STEM.captures(file_name.trim())?;
        let mut directory = source.parent()?;
        if RE_SEASON_DIRECTORY.is_match(&crate::path_to_filename_string(directory)) {
            directory = directory.parent()?;
        }
        let (title, year) = split_title_year(&crate::get_normalized_dir_name(directory).ok()?);
        if title.is_empty() {
            return None;
        }

        let number = |name: &str| captures.name(name).and_then(|m| m.as_str().parse::<u32>().ok());
        let (season, episode, role) = if let Some(role) = captures.name("role") {
            let role = if role.as_str().eq_ignore_ascii_case("poster") {
                ArtRole::Poster
            } else {
                ArtRole::Background
            };
            (None, None, Some(role))
        } else if captures.name("specials").is_some() {
            (Some(0), None, None)
        } else if captures.name("season").is_some() {
            (number("season"), None, None)
        } else {
            (number("episode_season"), number("episode"), None)
        };

        Some(Self {
            source: source.to_path_buf(),
            file_name: file_name.to_string(),
            extension: extension.to_string(),
            title,
            year,
            season,
            episode,
            role,
        })
    }

    fn parse(source: PathBuf, file_name: String, extension: String) -> Result<Self, AssetError> {
        let invalid = || AssetError::InvalidAssetName {
            name: crate::path_to_filename_string(&source),
        };

        let mut rest = file_name.trim();
        let mut role = None;
        if let Some(captures) = RE_ROLE_MARKER.captures(rest)
            && let Some(full) = captures.get(0)
            && full.start() > 0
        {
            role = match captures[1].to_lowercase().as_str() {
                "poster" => Some(ArtRole::Poster),
                _ => Some(ArtRole::Background),
            };
            rest = &rest[..full.start()];
        }

        let mut season = None;
        let mut episode = None;
        let mut cut = rest.len();
        if let Some(captures) = RE_EPISODE.captures(rest) {
            season = captures[1].parse::<u32>().ok();
            episode = captures[2].parse::<u32>().ok();
            cut = captures.get(0).map_or(cut, |m| m.start());
        } else if let Some(captures) = RE_SEASON.captures(rest) {
            season = captures[1].parse::<u32>().ok();
            cut = captures.get(0).map_or(cut, |m| m.start());
        } else if let Some(found) = RE_SPECIALS.find(rest) {
            season = Some(0);
            cut = found.start();
        }

        let head = RE_TRAILING_SEPARATORS.replace(&rest[..cut], "");
        let (title, year) = split_title_year(&head);
        if title.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            source,
            file_name,
            extension,
            title,
            year,
            season,
            episode,
            role,
        })
    }

    /// Filename tokens decide whether this is episode, season or main art.
    #[must_use]
    pub fn shape(&self) -> AssetShape {
        match (self.season, self.episode) {
            (Some(season), Some(episode)) => AssetShape::Episode { season, episode },
            (Some(season), None) => AssetShape::Season { season },
            _ => AssetShape::Title,
        }
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Filename without extension, exactly as staged.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Lowercase extension without the dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn year(&self) -> Option<u16> {
        self.year
    }

    #[must_use]
    pub const fn season(&self) -> Option<u32> {
        self.season
    }

    #[must_use]
    pub const fn episode(&self) -> Option<u32> {
        self.episode
    }

    /// Poster or background marker from the filename, if present.
    #[must_use]
    pub const fn role(&self) -> Option<ArtRole> {
        self.role
    }
}

impl fmt::Display for AssetCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extension.is_empty() {
            write!(f, "{}", self.file_name)
        } else {
            write!(f, "{}.{}", self.file_name, self.extension)
        }
    }
}

/// Title and year from a "Title (Year)" name, trailing separators removed.
fn split_title_year(name: &str) -> (String, Option<u16>) {
    let (title, year) = match RE_TITLE_YEAR.captures(name) {
        Some(captures) => (captures["title"].to_string(), captures["year"].parse::<u16>().ok()),
        None => (name.to_string(), None),
    };
    (RE_TRAILING_SEPARATORS.replace(title.trim(), "").to_string(), year)
}
