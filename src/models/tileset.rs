//! Tileset 模型：由图片尺寸推导 tile 网格

use crate::kernel::services::ports::tileset::{TileGrid, TilesetError, TilesetGeometry};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tileset {
    name: String,
    image_path: PathBuf,
    tile_width: u32,
    tile_height: u32,
    margin: u32,
    spacing: u32,
    image_size: Option<(u32, u32)>,
    grid: TileGrid,
    missing: bool,
}

impl Tileset {
    pub fn new(
        name: impl Into<String>,
        image_path: impl Into<PathBuf>,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, TilesetError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(TilesetError::InvalidTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        Ok(Self {
            name: name.into(),
            image_path: image_path.into(),
            tile_width,
            tile_height,
            margin: 0,
            spacing: 0,
            image_size: None,
            grid: TileGrid::default(),
            missing: false,
        })
    }

    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }

    pub fn column_count_for_width(&self, width: u32) -> usize {
        fit_count(width, self.tile_width, self.margin, self.spacing)
    }

    pub fn row_count_for_height(&self, height: u32) -> usize {
        fit_count(height, self.tile_height, self.margin, self.spacing)
    }

    /// Apply a known image size. Returns whether the tile grid changed.
    pub fn set_image_size(&mut self, width: u32, height: u32) -> bool {
        let grid = TileGrid::new(
            self.column_count_for_width(width),
            self.row_count_for_height(height),
        );
        self.image_size = Some((width, height));
        self.missing = false;
        let changed = grid != self.grid;
        self.grid = grid;
        changed
    }

    /// Re-read the image header and recompute the grid.
    ///
    /// A failed read marks the tileset missing and keeps the previous grid.
    pub fn load_image(&mut self) -> Result<bool, TilesetError> {
        match image::image_dimensions(&self.image_path) {
            Ok((width, height)) => Ok(self.set_image_size(width, height)),
            Err(err) => {
                self.missing = true;
                Err(TilesetError::ImageLoad {
                    path: self.image_path.clone(),
                    message: err.to_string(),
                })
            }
        }
    }
}

impl TilesetGeometry for Tileset {
    fn image_path(&self) -> &Path {
        &self.image_path
    }

    fn column_count(&self) -> usize {
        self.grid.columns
    }

    fn tile_count(&self) -> usize {
        self.grid.tile_count()
    }
}

// u64 so that `extent + spacing` and `tile + spacing` cannot overflow.
fn fit_count(extent: u32, tile: u32, margin: u32, spacing: u32) -> usize {
    let usable = (u64::from(extent) + u64::from(spacing)).saturating_sub(u64::from(margin));
    let stride = u64::from(tile) + u64::from(spacing);
    if stride == 0 {
        return 0;
    }
    usize::try_from(usable / stride).unwrap_or(usize::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/models/tileset.rs"]
mod tests;
