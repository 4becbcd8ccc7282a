//! tilelayers - tileset 图块层名库
//!
//! 模块结构：
//! - models: 数据模型（TileLayerNameTable, Tileset）
//! - kernel: 服务层（ports 契约 + adapters 实现：层名存储、文件监听、去抖、tileset 管理）
//! - app: 应用层（Workbench，组合根）

pub mod app;
pub mod kernel;
pub mod models;
