//! 工作台：组合根，持有 tileset 管理器与层名存储
//!
//! 没有全局单例；调用方构造一个 Workbench 并在主循环里驱动 `tick`。
//! 同一张图片可被多个 tileset 共用，层名表只跟随创建它的 tileset（owner）的网格。

use crate::kernel::services::adapters::{TileLayerNameStore, TilesetId, TilesetManager};
use crate::kernel::services::ports::{LayerNamesError, Settings, TilesetGeometry};
use crate::models::Tileset;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

mod tick;

pub struct Workbench {
    settings: Settings,
    tilesets: TilesetManager,
    layer_names: TileLayerNameStore,
    owners: FxHashMap<PathBuf, TilesetId>,
    problems: Vec<LayerNamesError>,
}

impl Workbench {
    pub fn new(settings: Settings) -> Self {
        let tilesets = TilesetManager::new(settings.debounce(), settings.watch_files);
        let layer_names = TileLayerNameStore::with_sidecar_suffix(settings.sidecar_suffix.clone());
        Self {
            settings,
            tilesets,
            layer_names,
            owners: FxHashMap::default(),
            problems: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tilesets(&self) -> &TilesetManager {
        &self.tilesets
    }

    pub fn layer_names(&self) -> &TileLayerNameStore {
        &self.layer_names
    }

    pub fn tileset(&self, id: TilesetId) -> Option<&Tileset> {
        self.tilesets.get(id)
    }

    /// Register a tileset: read its image header and, for the first tileset
    /// on that image, its layer-name sidecar.
    pub fn open_tileset(&mut self, mut tileset: Tileset) -> TilesetId {
        if let Err(err) = tileset.load_image() {
            tracing::warn!(tileset = tileset.name(), error = %err, "opening tileset with missing image");
        }

        let first_user = !self.tilesets.uses_image(tileset.image_path());
        if first_user {
            if let Err(err) = self.layer_names.open(&tileset) {
                tracing::warn!(error = %err, "layer names not loaded");
                self.problems.push(err);
            }
        }

        let image_path = tileset.image_path().to_path_buf();
        let id = self.tilesets.add_tileset(tileset);
        if first_user {
            self.owners.insert(image_path, id);
        }
        tracing::debug!(?id, "tileset opened");
        id
    }

    pub fn add_reference(&mut self, id: TilesetId) -> bool {
        self.tilesets.add_reference(id)
    }

    /// Drop a reference. When the last tileset using an image goes away its
    /// layer names are saved and released. Returns false for an unknown id.
    pub fn close_tileset(&mut self, id: TilesetId) -> bool {
        if self.tilesets.get(id).is_none() {
            return false;
        }
        let Some(tileset) = self.tilesets.remove_reference(id) else {
            return true;
        };
        let image_path = tileset.image_path();
        if !self.tilesets.uses_image(image_path) {
            self.owners.remove(image_path);
            if let Err(err) = self.layer_names.release(image_path) {
                tracing::error!(error = %err, "failed to save layer names");
                self.problems.push(err);
            }
        } else if self.owner(image_path) == Some(id) {
            self.hand_over(image_path);
        }
        true
    }

    /// Tileset whose grid the image's layer-name table follows.
    pub fn owner(&self, image_path: &Path) -> Option<TilesetId> {
        self.owners.get(image_path).copied()
    }

    // Prefer a remaining tileset whose grid already matches the table.
    fn hand_over(&mut self, image_path: &Path) {
        let table_grid = self
            .layer_names
            .table(image_path)
            .map(|table| (table.columns(), table.rows()));
        let mut next = None;
        for (id, tileset) in self.tilesets.tilesets_using(image_path) {
            let grid = tileset.grid();
            if table_grid == Some((grid.columns, grid.rows)) {
                next = Some(id);
                break;
            }
            if next.is_none() {
                next = Some(id);
            }
        }
        match next {
            Some(id) => {
                tracing::debug!(image = %image_path.display(), ?id, "layer names owner changed");
                self.owners.insert(image_path.to_path_buf(), id);
            }
            None => {
                self.owners.remove(image_path);
            }
        }
    }

    pub fn layer_name(&self, id: TilesetId, tile_id: usize) -> &str {
        match self.tilesets.get(id) {
            Some(tileset) => self.layer_names.layer_name(tileset.image_path(), tile_id),
            None => "",
        }
    }

    pub fn set_layer_name(&mut self, id: TilesetId, tile_id: usize, name: &str) -> bool {
        let Some(tileset) = self.tilesets.get(id) else {
            return false;
        };
        let image_path = tileset.image_path();
        let creates_table = !self.layer_names.contains(image_path);
        if !self.layer_names.set_layer_name(tileset, tile_id, name) {
            return false;
        }
        if creates_table {
            self.owners.insert(image_path.to_path_buf(), id);
        }
        true
    }

    /// Save every dirty table now.
    pub fn save(&mut self) -> Vec<LayerNamesError> {
        self.layer_names.save_all()
    }

    /// External change notification (already known to be about `path`).
    pub fn file_changed(&mut self, path: &Path, now: Instant) -> bool {
        self.tilesets.file_changed(path, now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tilesets.next_deadline()
    }

    pub fn take_problems(&mut self) -> Vec<LayerNamesError> {
        std::mem::take(&mut self.problems)
    }

    pub fn shutdown(mut self) -> Vec<LayerNamesError> {
        let mut errors = self.take_problems();
        errors.extend(self.layer_names.shutdown());
        errors
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/app/workbench.rs"]
mod tests;
