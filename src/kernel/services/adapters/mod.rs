//! Service adapters: OS/runtime specific implementations (IO/watching).

pub mod debounce;
pub mod file_watcher;
pub mod layer_names;
pub mod paths;
pub mod settings;
pub mod tileset_manager;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use file_watcher::{FileWatchEvent, FileWatcherService};
pub use layer_names::TileLayerNameStore;
pub use paths::{ensure_log_dir, get_config_dir, get_log_dir};
pub use settings::{
    ensure_settings_file, get_settings_path, load_settings, load_settings_from,
    write_default_settings,
};
pub use tileset_manager::{TilesetId, TilesetManager, TilesetReloaded};
