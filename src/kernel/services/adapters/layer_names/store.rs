use super::xml;
use crate::kernel::services::ports::layer_names::{LayerNamesError, Result};
use crate::kernel::services::ports::settings::DEFAULT_SIDECAR_SUFFIX;
use crate::kernel::services::ports::tileset::{TileGrid, TilesetGeometry};
use crate::models::{TileLayerNameTable, MAX_TILE_COUNT};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Per-image layer-name tables, keyed by the tileset image path.
///
/// Tables are created lazily, loaded from the image's sidecar file when one
/// exists, and written back only when dirty. Dropping the store saves whatever
/// is still dirty.
pub struct TileLayerNameStore {
    sidecar_suffix: String,
    tables: FxHashMap<PathBuf, TileLayerNameTable>,
}

impl TileLayerNameStore {
    pub fn new() -> Self {
        Self::with_sidecar_suffix(DEFAULT_SIDECAR_SUFFIX)
    }

    pub fn with_sidecar_suffix(suffix: impl Into<String>) -> Self {
        Self {
            sidecar_suffix: suffix.into(),
            tables: FxHashMap::default(),
        }
    }

    /// `foo.png` -> `foo.tilelayers.xml`
    pub fn sidecar_path(&self, image_path: &Path) -> PathBuf {
        image_path.with_extension(&self.sidecar_suffix)
    }

    pub fn contains(&self, image_path: &Path) -> bool {
        self.tables.contains_key(image_path)
    }

    pub fn table(&self, image_path: &Path) -> Option<&TileLayerNameTable> {
        self.tables.get(image_path)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn dirty_count(&self) -> usize {
        self.tables.values().filter(|t| t.is_dirty()).count()
    }

    /// Load the sidecar of a newly referenced tileset and fit it to the
    /// tileset's grid. A sidecar that fails to parse is reported and the
    /// table is not created.
    pub fn open(&mut self, tileset: &dyn TilesetGeometry) -> Result<()> {
        let image_path = tileset.image_path();
        let grid = tileset.grid();

        if let Some(table) = self.tables.get_mut(image_path) {
            fit_table(table, grid);
            return Ok(());
        }

        let sidecar = self.sidecar_path(image_path);
        if !sidecar.is_file() {
            return Ok(());
        }

        let mut table = xml::load(&sidecar)?;
        fit_table(&mut table, grid);
        tracing::debug!(
            image = %image_path.display(),
            sidecar = %sidecar.display(),
            named = table.named_tiles().count(),
            "layer names loaded"
        );
        self.tables.insert(image_path.to_path_buf(), table);
        Ok(())
    }

    /// Label of a tile; `""` when the image has no table or the id is out of
    /// range.
    pub fn layer_name(&self, image_path: &Path, tile_id: usize) -> &str {
        self.tables
            .get(image_path)
            .map(|table| table.layer_name(tile_id))
            .unwrap_or("")
    }

    /// Set a label, creating the table from the tileset's current grid on
    /// first use. Out-of-range ids are ignored.
    pub fn set_layer_name(
        &mut self,
        tileset: &dyn TilesetGeometry,
        tile_id: usize,
        name: &str,
    ) -> bool {
        let image_path = tileset.image_path();
        if !self.tables.contains_key(image_path) {
            let grid = tileset.grid();
            if tile_id >= grid.tile_count() || oversized(grid, image_path) {
                return false;
            }
            let table =
                TileLayerNameTable::new(self.sidecar_path(image_path), grid.columns, grid.rows);
            self.tables.insert(image_path.to_path_buf(), table);
        }

        match self.tables.get_mut(image_path) {
            Some(table) => table.set_layer_name(tile_id, name),
            None => false,
        }
    }

    /// Fit an existing table to a changed tile grid. Returns whether the
    /// table was resized.
    pub fn reconcile_size(&mut self, image_path: &Path, columns: usize, rows: usize) -> bool {
        let Some(table) = self.tables.get_mut(image_path) else {
            return false;
        };
        if table.columns() == columns && table.rows() == rows {
            return false;
        }
        if oversized(TileGrid::new(columns, rows), image_path) {
            return false;
        }
        tracing::info!(
            image = %image_path.display(),
            old_columns = table.columns(),
            old_rows = table.rows(),
            columns,
            rows,
            "reconciling layer names with new tile grid"
        );
        table.resize(columns, rows);
        true
    }

    /// Drop the table of an image nobody references anymore, saving it first.
    /// On a failed save the table stays in the store, still dirty.
    pub fn release(&mut self, image_path: &Path) -> Result<()> {
        let Some(mut table) = self.tables.remove(image_path) else {
            return Ok(());
        };
        if let Err(err) = xml::save(&mut table) {
            self.tables.insert(image_path.to_path_buf(), table);
            return Err(err);
        }
        Ok(())
    }

    /// Save every dirty table. Tables that fail stay dirty.
    pub fn save_all(&mut self) -> Vec<LayerNamesError> {
        let mut paths: Vec<_> = self
            .tables
            .iter()
            .filter(|(_, table)| table.is_dirty())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort_unstable();

        let mut errors = Vec::new();
        for path in paths {
            if let Some(table) = self.tables.get_mut(&path) {
                if let Err(err) = xml::save(table) {
                    errors.push(err);
                }
            }
        }
        errors
    }

    /// Final save attempt; empties the store so teardown happens once.
    pub fn shutdown(&mut self) -> Vec<LayerNamesError> {
        let errors = self.save_all();
        self.tables.clear();
        errors
    }
}

impl Default for TileLayerNameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TileLayerNameStore {
    fn drop(&mut self) {
        for err in self.shutdown() {
            tracing::error!(error = %err, "failed to save layer names");
        }
    }
}

// An image that failed to load reports an empty grid; keep the stored
// geometry rather than wiping every label.
fn fit_table(table: &mut TileLayerNameTable, grid: TileGrid) {
    if grid.columns == 0 || oversized(grid, table.file_path()) {
        return;
    }
    if table.columns() != grid.columns || table.rows() != grid.rows {
        tracing::info!(
            sidecar = %table.file_path().display(),
            old_columns = table.columns(),
            old_rows = table.rows(),
            columns = grid.columns,
            rows = grid.rows,
            "layer names do not match tileset grid"
        );
        table.resize(grid.columns, grid.rows);
    }
}

fn oversized(grid: TileGrid, path: &Path) -> bool {
    if grid.tile_count() <= MAX_TILE_COUNT {
        return false;
    }
    tracing::warn!(
        path = %path.display(),
        columns = grid.columns,
        rows = grid.rows,
        "tile grid too large for layer names"
    );
    true
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/layer_names/store.rs"]
mod tests;
