//! 数据模型层

pub mod layer_name_table;
pub mod tileset;

pub use layer_name_table::{TileLayerNameTable, MAX_TILE_COUNT};
pub use tileset::Tileset;
