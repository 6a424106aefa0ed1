//! Destination naming per target service.

use std::path::{Path, PathBuf};

use crate::assets::candidate::AssetCandidate;
use crate::assets::error::AssetError;
use crate::assets::matcher::MatchedDirectory;
use crate::assets::types::{ArtRole, EntityKind, SeasonZero, Service};

/// Final placement computed for an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub kind: EntityKind,
    /// Destination filename including extension.
    pub file_name: String,
    pub directory: PathBuf,
}

/// Computes destination names from parsed fields and the active convention profile.
///
/// Classification is a pure computation and never touches the filesystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetClassifier {
    service: Option<Service>,
    season_zero: Option<SeasonZero>,
}

/// Stem and directory before the extension is attached.
struct Placement {
    directory: PathBuf,
    stem: String,
}

impl ClassificationResult {
    /// Full destination path.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl AssetClassifier {
    #[must_use]
    pub const fn new(service: Option<Service>, season_zero: Option<SeasonZero>) -> Self {
        Self { service, season_zero }
    }

    #[must_use]
    pub const fn service(&self) -> Option<Service> {
        self.service
    }

    /// Compute the destination for a matched asset.
    ///
    /// # Errors
    /// Returns `Unsupported` when the active service has no naming for the entity kind,
    /// `SeasonZeroNamingUnset` when a season zero directory is needed but not configured,
    /// and `InvalidAssetName` if season or episode numbers are missing for the kind.
    pub fn classify(
        &self,
        candidate: &AssetCandidate,
        kind: EntityKind,
        matched: &MatchedDirectory,
        role: ArtRole,
    ) -> Result<ClassificationResult, AssetError> {
        let base = matched.path();
        let placement = match self.service {
            None => Self::unset(kind, &base, role)?,
            Some(Service::Kometa) => Self::kometa(candidate, kind, &base, role)?,
            Some(Service::Plex) => self.plex(candidate, kind, &base, role)?,
            Some(Service::Kodi) => self.kodi(candidate, kind, &base, role)?,
        };

        let file_name = if candidate.extension().is_empty() {
            placement.stem
        } else {
            format!("{}.{}", placement.stem, candidate.extension())
        };

        Ok(ClassificationResult {
            kind,
            file_name,
            directory: placement.directory,
        })
    }

    /// Without a service only movie and show main art is placed.
    fn unset(kind: EntityKind, base: &Path, role: ArtRole) -> Result<Placement, AssetError> {
        match kind {
            EntityKind::Movie | EntityKind::Show => Ok(Placement::main_art(base, role)),
            _ => Err(AssetError::Unsupported {
                kind,
                service: "no service".to_string(),
            }),
        }
    }

    fn kometa(
        candidate: &AssetCandidate,
        kind: EntityKind,
        base: &Path,
        role: ArtRole,
    ) -> Result<Placement, AssetError> {
        match kind {
            EntityKind::Movie | EntityKind::Show | EntityKind::Collection => Ok(Placement::main_art(base, role)),
            EntityKind::Season => {
                let season = Self::season_number(candidate)?;
                Ok(Placement::new(base, format!("Season{season:02}")))
            }
            EntityKind::Episode => {
                let (season, episode) = Self::episode_numbers(candidate)?;
                Ok(Placement::new(base, episode_stem(season, episode)))
            }
        }
    }

    fn plex(
        &self,
        candidate: &AssetCandidate,
        kind: EntityKind,
        base: &Path,
        role: ArtRole,
    ) -> Result<Placement, AssetError> {
        match kind {
            EntityKind::Movie | EntityKind::Show => Ok(Placement::main_art(base, role)),
            EntityKind::Collection => Err(AssetError::Unsupported {
                kind,
                service: Service::Plex.to_string(),
            }),
            EntityKind::Season => {
                let season = Self::season_number(candidate)?;
                let directory = base.join(self.season_directory(season)?);
                let stem = if season == 0 {
                    "season-specials-poster".to_string()
                } else {
                    format!("Season{season:02}")
                };
                Ok(Placement { directory, stem })
            }
            EntityKind::Episode => {
                let (season, episode) = Self::episode_numbers(candidate)?;
                Ok(Placement {
                    directory: base.join(self.season_directory(season)?),
                    stem: episode_stem(season, episode),
                })
            }
        }
    }

    fn kodi(
        &self,
        candidate: &AssetCandidate,
        kind: EntityKind,
        base: &Path,
        role: ArtRole,
    ) -> Result<Placement, AssetError> {
        match kind {
            EntityKind::Movie | EntityKind::Show | EntityKind::Collection => {
                let stem = match role {
                    ArtRole::Poster => "poster",
                    ArtRole::Background => "fanart",
                };
                Ok(Placement::new(base, stem.to_string()))
            }
            EntityKind::Season => {
                let season = Self::season_number(candidate)?;
                let stem = if season == 0 {
                    "season-specials-poster".to_string()
                } else {
                    format!("season{season:02}-poster")
                };
                Ok(Placement::new(base, stem))
            }
            EntityKind::Episode => {
                let (season, episode) = Self::episode_numbers(candidate)?;
                Ok(Placement {
                    directory: base.join(self.season_directory(season)?),
                    stem: format!("{}-thumb", episode_stem(season, episode)),
                })
            }
        }
    }

    /// Season directory inside a show directory.
    fn season_directory(&self, season: u32) -> Result<String, AssetError> {
        if season == 0 {
            self.season_zero
                .map(|naming| naming.directory_name().to_string())
                .ok_or(AssetError::SeasonZeroNamingUnset)
        } else {
            Ok(format!("Season {season:02}"))
        }
    }

    fn season_number(candidate: &AssetCandidate) -> Result<u32, AssetError> {
        candidate.season().ok_or_else(|| AssetError::InvalidAssetName {
            name: candidate.to_string(),
        })
    }

    fn episode_numbers(candidate: &AssetCandidate) -> Result<(u32, u32), AssetError> {
        match (candidate.season(), candidate.episode()) {
            (Some(season), Some(episode)) => Ok((season, episode)),
            _ => Err(AssetError::InvalidAssetName {
                name: candidate.to_string(),
            }),
        }
    }
}

impl Placement {
    fn new(directory: &Path, stem: String) -> Self {
        Self {
            directory: directory.to_path_buf(),
            stem,
        }
    }

    fn main_art(directory: &Path, role: ArtRole) -> Self {
        Self::new(directory, role.to_string())
    }
}

fn episode_stem(season: u32, episode: u32) -> String {
    format!("S{season:02}E{episode:02}")
}

#[cfg(test)]
mod classify_tests {
    use super::*;

    use crate::assets::normalize::{NameVariant, VariantStrategy};

    fn candidate(name: &str) -> AssetCandidate {
        AssetCandidate::from_path(&Path::new("/staging").join(name)).expect("valid name")
    }

    fn matched(root: &str, name: &str) -> MatchedDirectory {
        MatchedDirectory {
            root: PathBuf::from(root),
            name: name.to_string(),
            variant: NameVariant::new(name.to_string(), VariantStrategy::Identity),
        }
    }

    fn destination(
        classifier: AssetClassifier,
        file: &str,
        kind: EntityKind,
        role: ArtRole,
    ) -> Result<PathBuf, AssetError> {
        let directory = matched("/shows", "Gamma (1999)");
        classifier
            .classify(&candidate(file), kind, &directory, role)
            .map(|result| result.destination())
    }

    #[test]
    fn show_poster_without_service() {
        let result = AssetClassifier::default()
            .classify(
                &candidate("Alpha (2020).jpg"),
                EntityKind::Show,
                &matched("/shows", "Alpha (2020)"),
                ArtRole::Poster,
            )
            .unwrap();
        assert_eq!(result.kind, EntityKind::Show);
        assert_eq!(result.file_name, "poster.jpg");
        assert_eq!(result.destination(), Path::new("/shows/Alpha (2020)/poster.jpg"));
    }

    #[test]
    fn background_keeps_extension() {
        let path = destination(
            AssetClassifier::default(),
            "Gamma (1999) - Background.png",
            EntityKind::Movie,
            ArtRole::Background,
        )
        .unwrap();
        assert_eq!(path, Path::new("/shows/Gamma (1999)/background.png"));
    }

    #[test]
    fn no_service_rejects_seasons_and_collections() {
        let result = destination(
            AssetClassifier::default(),
            "Gamma (1999) - Season 01.jpg",
            EntityKind::Season,
            ArtRole::Poster,
        );
        assert!(matches!(result, Err(AssetError::Unsupported { .. })));
    }

    #[test]
    fn kometa_naming() {
        let kometa = AssetClassifier::new(Some(Service::Kometa), None);
        assert_eq!(
            destination(kometa, "Gamma (1999) - Season 01.jpg", EntityKind::Season, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/Season01.jpg")
        );
        assert_eq!(
            destination(kometa, "Gamma (1999) - Specials.jpg", EntityKind::Season, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/Season00.jpg")
        );
        assert_eq!(
            destination(kometa, "Gamma (1999) - S01E02.jpg", EntityKind::Episode, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/S01E02.jpg")
        );
        assert_eq!(
            destination(kometa, "Gamma (1999) - Background.jpg", EntityKind::Collection, ArtRole::Background)
                .unwrap(),
            Path::new("/shows/Gamma (1999)/background.jpg")
        );
    }

    #[test]
    fn plex_naming() {
        let plex = AssetClassifier::new(Some(Service::Plex), Some(SeasonZero::Specials));
        assert_eq!(
            destination(plex, "Gamma (1999) - Season 01.jpg", EntityKind::Season, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/Season 01/Season01.jpg")
        );
        assert_eq!(
            destination(plex, "Gamma (1999) - Specials.jpg", EntityKind::Season, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/Specials/season-specials-poster.jpg")
        );
        assert_eq!(
            destination(plex, "Gamma (1999) - S02E05.jpg", EntityKind::Episode, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/Season 02/S02E05.jpg")
        );
    }

    #[test]
    fn plex_numeric_season_zero() {
        let plex = AssetClassifier::new(Some(Service::Plex), Some(SeasonZero::Numeric));
        assert_eq!(
            destination(plex, "Gamma (1999) - S00E01.jpg", EntityKind::Episode, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/Season 00/S00E01.jpg")
        );
    }

    #[test]
    fn plex_rejects_collections() {
        let plex = AssetClassifier::new(Some(Service::Plex), None);
        let result = destination(plex, "Beta Collection.jpg", EntityKind::Collection, ArtRole::Poster);
        assert_eq!(
            result,
            Err(AssetError::Unsupported {
                kind: EntityKind::Collection,
                service: "Plex".to_string(),
            })
        );
    }

    #[test]
    fn season_zero_directory_requires_configuration() {
        let plex = AssetClassifier::new(Some(Service::Plex), None);
        let result = destination(plex, "Gamma (1999) - Specials.jpg", EntityKind::Season, ArtRole::Poster);
        assert_eq!(result, Err(AssetError::SeasonZeroNamingUnset));

        // Kometa places season zero in the show directory and needs no flag.
        let kometa = AssetClassifier::new(Some(Service::Kometa), None);
        assert!(destination(kometa, "Gamma (1999) - Specials.jpg", EntityKind::Season, ArtRole::Poster).is_ok());
    }

    #[test]
    fn kodi_naming() {
        let kodi = AssetClassifier::new(Some(Service::Kodi), Some(SeasonZero::Numeric));
        assert_eq!(
            destination(kodi, "Gamma (1999) - Background.jpg", EntityKind::Show, ArtRole::Background).unwrap(),
            Path::new("/shows/Gamma (1999)/fanart.jpg")
        );
        assert_eq!(
            destination(kodi, "Gamma (1999) - Season 03.jpg", EntityKind::Season, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/season03-poster.jpg")
        );
        assert_eq!(
            destination(kodi, "Gamma (1999) - Specials.jpg", EntityKind::Season, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/season-specials-poster.jpg")
        );
        assert_eq!(
            destination(kodi, "Gamma (1999) - S01E02.jpg", EntityKind::Episode, ArtRole::Poster).unwrap(),
            Path::new("/shows/Gamma (1999)/Season 01/S01E02-thumb.jpg")
        );
    }

    #[test]
    fn season_art_ignores_role() {
        let kometa = AssetClassifier::new(Some(Service::Kometa), None);
        assert_eq!(
            destination(kometa, "Gamma (1999) - Season 01.jpg", EntityKind::Season, ArtRole::Background).unwrap(),
            destination(kometa, "Gamma (1999) - Season 01.jpg", EntityKind::Season, ArtRole::Poster).unwrap()
        );
    }

    #[test]
    fn classification_is_repeatable() {
        let plex = AssetClassifier::new(Some(Service::Plex), Some(SeasonZero::Numeric));
        let first = destination(plex, "Gamma (1999) - S01E02.jpg", EntityKind::Episode, ArtRole::Poster);
        let second = destination(plex, "Gamma (1999) - S01E02.jpg", EntityKind::Episode, ArtRole::Poster);
        assert_eq!(first, second);
    }
}
