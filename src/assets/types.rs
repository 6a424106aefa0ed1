use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

/// Library entity an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Movie,
    Show,
    Season,
    Episode,
    Collection,
}

/// Main art role: portrait poster or landscape background.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtRole {
    #[default]
    Poster,
    Background,
}

/// Target media-management service that decides the destination naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Kometa asset directories
    Kometa,
    /// Plex local media assets
    Plex,
    /// Kodi artwork naming
    Kodi,
}

/// How the season zero directory is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonZero {
    /// "Season 00"
    Numeric,
    /// "Specials"
    Specials,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Movie => "Movie",
            Self::Show => "Show",
            Self::Season => "Season",
            Self::Episode => "Episode",
            Self::Collection => "Collection",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for ArtRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poster => write!(f, "poster"),
            Self::Background => write!(f, "background"),
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Kometa => "Kometa",
            Self::Plex => "Plex",
            Self::Kodi => "Kodi",
        };
        write!(f, "{name}")
    }
}

impl SeasonZero {
    /// Directory name used for the zero season.
    #[must_use]
    pub const fn directory_name(self) -> &'static str {
        match self {
            Self::Numeric => "Season 00",
            Self::Specials => "Specials",
        }
    }
}
