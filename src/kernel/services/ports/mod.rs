//! Service ports: traits + data contracts.

pub mod layer_names;
pub mod settings;
pub mod tileset;

pub use layer_names::{LayerNamesError, Result as LayerNamesResult};
pub use settings::{Settings, DEFAULT_DEBOUNCE_MS, DEFAULT_SIDECAR_SUFFIX};
pub use tileset::{TileGrid, TilesetError, TilesetGeometry};
