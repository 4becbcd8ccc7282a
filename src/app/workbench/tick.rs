use super::Workbench;
use crate::kernel::services::adapters::TilesetReloaded;
use std::time::Instant;

impl Workbench {
    /// Run one pass of the reload pipeline (called by the main loop).
    ///
    /// Watcher events and queued notifications go through the debouncer.
    /// A layer-name table is reconciled only when the grid of its owning
    /// tileset changed.
    pub fn tick(&mut self, now: Instant) -> Vec<TilesetReloaded> {
        let reloaded = self.tilesets.poll(now);
        for event in &reloaded {
            self.reconcile(event);
        }
        reloaded
    }

    fn reconcile(&mut self, event: &TilesetReloaded) {
        if event.missing || !event.grid_changed() {
            return;
        }
        if self.owner(&event.image_path) != Some(event.id) {
            return;
        }
        let grid = event.new_grid;
        self.layer_names
            .reconcile_size(&event.image_path, grid.columns, grid.rows);
    }
}
