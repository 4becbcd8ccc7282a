//! Tileset 管理：引用计数、图片监听列表、去抖后的重新加载

use super::debounce::Debouncer;
use super::file_watcher::FileWatcherService;
use crate::kernel::services::ports::tileset::{TileGrid, TilesetGeometry};
use crate::models::Tileset;
use slotmap::{new_key_type, SlotMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

new_key_type! { pub struct TilesetId; }

/// A tileset whose image was re-read after a change on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetReloaded {
    pub id: TilesetId,
    pub image_path: PathBuf,
    pub old_grid: TileGrid,
    pub new_grid: TileGrid,
    pub missing: bool,
}

impl TilesetReloaded {
    pub fn grid_changed(&self) -> bool {
        self.old_grid != self.new_grid
    }
}

struct TilesetEntry {
    tileset: Tileset,
    refs: usize,
}

pub struct TilesetManager {
    tilesets: SlotMap<TilesetId, TilesetEntry>,
    watcher: Option<FileWatcherService>,
    debouncer: Debouncer,
}

impl TilesetManager {
    pub fn new(debounce: Duration, watch_files: bool) -> Self {
        let watcher = if watch_files {
            match FileWatcherService::new() {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    tracing::warn!(error = %err, "file watcher unavailable, tileset images will not reload");
                    None
                }
            }
        } else {
            None
        };
        Self {
            tilesets: SlotMap::with_key(),
            watcher,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn without_watcher(debounce: Duration) -> Self {
        Self::new(debounce, false)
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }

    pub fn get(&self, id: TilesetId) -> Option<&Tileset> {
        self.tilesets.get(id).map(|entry| &entry.tileset)
    }

    pub fn reference_count(&self, id: TilesetId) -> usize {
        self.tilesets.get(id).map(|entry| entry.refs).unwrap_or(0)
    }

    pub fn uses_image(&self, image_path: &Path) -> bool {
        self.tilesets
            .values()
            .any(|entry| entry.tileset.image_path() == image_path)
    }

    /// Tilesets built on `image_path`.
    pub fn tilesets_using<'a>(
        &'a self,
        image_path: &'a Path,
    ) -> impl Iterator<Item = (TilesetId, &'a Tileset)> + 'a {
        self.tilesets
            .iter()
            .filter(move |(_, entry)| entry.tileset.image_path() == image_path)
            .map(|(id, entry)| (id, &entry.tileset))
    }

    /// Distinct image paths of all referenced tilesets, sorted.
    pub fn image_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .tilesets
            .values()
            .map(|entry| entry.tileset.image_path().to_path_buf())
            .collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }

    pub fn add_tileset(&mut self, tileset: Tileset) -> TilesetId {
        let is_new_image = !self.uses_image(tileset.image_path());
        let id = self.tilesets.insert(TilesetEntry { tileset, refs: 1 });
        if is_new_image {
            self.sync_watch_list();
        }
        id
    }

    pub fn add_reference(&mut self, id: TilesetId) -> bool {
        match self.tilesets.get_mut(id) {
            Some(entry) => {
                entry.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drop one reference; the tileset is handed back once nobody holds it.
    pub fn remove_reference(&mut self, id: TilesetId) -> Option<Tileset> {
        let entry = self.tilesets.get_mut(id)?;
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs > 0 {
            return None;
        }

        let entry = self.tilesets.remove(id)?;
        let image_path = entry.tileset.image_path();
        if !self.uses_image(image_path) {
            self.debouncer.cancel(image_path);
            self.sync_watch_list();
        }
        Some(entry.tileset)
    }

    /// Queue a change notification for an image. Unknown paths are ignored.
    pub fn file_changed(&mut self, path: &Path, now: Instant) -> bool {
        if !self.uses_image(path) {
            return false;
        }
        self.debouncer.push(path.to_path_buf(), now);
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    pub fn has_pending(&self) -> bool {
        !self.debouncer.is_empty()
    }

    /// Feed watcher events into the debouncer and reload every image whose
    /// window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Vec<TilesetReloaded> {
        if let Some(watcher) = self.watcher.as_mut() {
            for event in watcher.drain_events() {
                tracing::debug!(?event, "tileset image changed on disk");
                self.debouncer.push(event.path().to_path_buf(), now);
            }
        }

        let mut reloaded = Vec::new();
        for path in self.debouncer.poll(now) {
            self.reload_image(&path, &mut reloaded);
        }
        reloaded
    }

    fn reload_image(&mut self, image_path: &Path, out: &mut Vec<TilesetReloaded>) {
        for (id, entry) in self.tilesets.iter_mut() {
            let tileset = &mut entry.tileset;
            if tileset.image_path() != image_path {
                continue;
            }

            let old_grid = tileset.grid();
            let was_missing = tileset.is_missing();
            match tileset.load_image() {
                Ok(changed) => {
                    if !changed && !was_missing {
                        continue;
                    }
                    tracing::info!(
                        tileset = tileset.name(),
                        image = %image_path.display(),
                        columns = tileset.column_count(),
                        rows = tileset.row_count(),
                        "tileset image reloaded"
                    );
                }
                Err(err) => {
                    tracing::warn!(tileset = tileset.name(), error = %err, "tileset image missing");
                    if was_missing {
                        continue;
                    }
                }
            }

            out.push(TilesetReloaded {
                id,
                image_path: image_path.to_path_buf(),
                old_grid,
                new_grid: tileset.grid(),
                missing: tileset.is_missing(),
            });
        }
    }

    fn sync_watch_list(&mut self) {
        let paths = self.image_paths();
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.sync_watched_files(paths.iter().map(PathBuf::as_path));
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/tileset_manager.rs"]
mod tests;
