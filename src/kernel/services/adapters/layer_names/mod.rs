//! 图块层名：sidecar XML 读写与按图片路径的缓存
//!
//! 每张 tileset 图片旁边可以有一个 `<name>.tilelayers.xml`，为每个 tile 记录一个层名。

pub mod store;
pub mod xml;

pub use store::TileLayerNameStore;
pub use xml::{load, save};
