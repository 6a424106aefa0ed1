use std::path::Path;

use crate::assets::types::ArtRole;

/// Decides the art role from image content when the filename has no marker.
pub trait DimensionProbe {
    /// Returns `None` if the image cannot be read.
    fn probe(&self, path: &Path) -> Option<ArtRole>;
}

/// Reads image headers: portrait is a poster, anything else a background.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDimensionProbe;

impl DimensionProbe for ImageDimensionProbe {
    fn probe(&self, path: &Path) -> Option<ArtRole> {
        let (width, height) = image::image_dimensions(path).ok()?;
        Some(role_for_dimensions(width, height))
    }
}

#[must_use]
pub const fn role_for_dimensions(width: u32, height: u32) -> ArtRole {
    if height > width {
        ArtRole::Poster
    } else {
        ArtRole::Background
    }
}
