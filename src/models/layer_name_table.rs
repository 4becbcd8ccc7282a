//! 图块层名表：每个 tile 一个标签，按行主序存储
//!
//! 表的尺寸始终等于 `columns * rows`，下标即 tileset 内的 tile id。

use std::path::{Path, PathBuf};

/// Largest `columns * rows` a table may hold. Sidecars and image grids above
/// it are rejected before a table is built.
pub const MAX_TILE_COUNT: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayerNameTable {
    file_path: PathBuf,
    columns: usize,
    rows: usize,
    names: Vec<String>,
    dirty: bool,
}

impl TileLayerNameTable {
    pub fn new(file_path: impl Into<PathBuf>, columns: usize, rows: usize) -> Self {
        Self {
            file_path: file_path.into(),
            columns,
            rows,
            names: vec![String::new(); columns.saturating_mul(rows)],
            dirty: false,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn contains(&self, tile_id: usize) -> bool {
        tile_id < self.names.len()
    }

    /// Label of `tile_id`, or `""` when the id is outside the grid.
    pub fn layer_name(&self, tile_id: usize) -> &str {
        self.names.get(tile_id).map(String::as_str).unwrap_or("")
    }

    /// Out-of-range ids are ignored: two tilesets may share one image with
    /// different tile sizes, so an id valid for one can overflow the other.
    pub fn set_layer_name(&mut self, tile_id: usize, name: &str) -> bool {
        let Some(slot) = self.names.get_mut(tile_id) else {
            return false;
        };
        slot.clear();
        slot.push_str(name);
        self.dirty = true;
        true
    }

    /// Non-empty labels in ascending id order.
    pub fn named_tiles(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(id, name)| (id, name.as_str()))
    }

    /// Fit the table to a new tile grid.
    ///
    /// With the column count unchanged every row keeps its offset, so the
    /// sequence is padded or truncated at the tail. When the column count
    /// changes each row starts somewhere else; only the cells inside both the
    /// old and the new rectangle survive, at the same `(row, col)`.
    pub fn resize(&mut self, columns: usize, rows: usize) {
        if columns == self.columns && rows == self.rows {
            return;
        }

        if columns == self.columns {
            self.names.resize(columns.saturating_mul(rows), String::new());
        } else {
            let mut names = vec![String::new(); columns.saturating_mul(rows)];
            let keep_rows = rows.min(self.rows);
            let keep_columns = columns.min(self.columns);
            for row in 0..keep_rows {
                for col in 0..keep_columns {
                    let old = row * self.columns + col;
                    names[row * columns + col] = std::mem::take(&mut self.names[old]);
                }
            }
            self.names = names;
        }

        self.columns = columns;
        self.rows = rows;
        self.dirty = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/layer_name_table.rs"]
mod tests;
