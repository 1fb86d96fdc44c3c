use std::fmt;

/// Grid layout of the shared texture sheet; texture index `n` is the n-th
/// tile in row-major order.
///
/// Always holds a non-zero tile no larger than the sheet, so every UV it
/// hands out stays inside `0.0..=1.0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    atlas_size: u32,
    tile_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtlasLayoutError {
    ZeroTileSize,
    TileLargerThanAtlas { tile_size: u32, atlas_size: u32 },
}

impl fmt::Display for AtlasLayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTileSize => write!(f, "atlas tile size must be non-zero"),
            Self::TileLargerThanAtlas {
                tile_size,
                atlas_size,
            } => write!(
                f,
                "atlas tile size {tile_size}px exceeds the {atlas_size}px sheet"
            ),
        }
    }
}

impl std::error::Error for AtlasLayoutError {}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            atlas_size: 256,
            tile_size: 16,
        }
    }
}

impl AtlasLayout {
    pub fn new(atlas_size: u32, tile_size: u32) -> Result<Self, AtlasLayoutError> {
        if tile_size == 0 {
            return Err(AtlasLayoutError::ZeroTileSize);
        }
        if tile_size > atlas_size {
            return Err(AtlasLayoutError::TileLargerThanAtlas {
                tile_size,
                atlas_size,
            });
        }
        Ok(Self {
            atlas_size,
            tile_size,
        })
    }

    pub fn atlas_size(&self) -> u32 {
        self.atlas_size
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// A sheet that is not a whole number of tiles wide leaves its last
    /// partial column and row unused.
    pub fn tiles_per_row(&self) -> u32 {
        self.atlas_size / self.tile_size
    }

    pub fn capacity(&self) -> u32 {
        self.tiles_per_row() * self.tiles_per_row()
    }

    /// Width (and height) of one tile in normalized UV units.
    pub fn tile_uv_span(&self) -> f32 {
        self.tile_size as f32 / self.atlas_size as f32
    }

    pub fn tile_origin(&self, texture: u16) -> [f32; 2] {
        let per_row = self.tiles_per_row();
        let index = u32::from(texture);
        let span = self.tile_uv_span();
        [
            (index % per_row) as f32 * span,
            (index / per_row) as f32 * span,
        ]
    }
}
