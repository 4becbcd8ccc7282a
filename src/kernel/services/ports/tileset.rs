use std::path::{Path, PathBuf};

/// Column/row geometry of a tileset image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileGrid {
    pub columns: usize,
    pub rows: usize,
}

impl TileGrid {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    pub fn tile_count(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }
}

/// What the layer-name store needs to know about a tileset.
pub trait TilesetGeometry {
    fn image_path(&self) -> &Path;

    fn column_count(&self) -> usize;

    fn tile_count(&self) -> usize;

    fn row_count(&self) -> usize {
        match self.column_count() {
            0 => 0,
            columns => self.tile_count() / columns,
        }
    }

    fn grid(&self) -> TileGrid {
        TileGrid::new(self.column_count(), self.row_count())
    }
}

#[derive(Debug)]
pub enum TilesetError {
    InvalidTileSize { width: u32, height: u32 },
    ImageLoad { path: PathBuf, message: String },
}

impl std::fmt::Display for TilesetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TilesetError::InvalidTileSize { width, height } => {
                write!(f, "invalid tile size {}x{}", width, height)
            }
            TilesetError::ImageLoad { path, message } => {
                write!(f, "failed to read image {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for TilesetError {}
