//! Headless core: tileset bookkeeping and per-tile layer names.

pub mod services;

pub use services::adapters::{TileLayerNameStore, TilesetId, TilesetManager, TilesetReloaded};
pub use services::ports::{LayerNamesError, Settings, TileGrid, TilesetError, TilesetGeometry};
