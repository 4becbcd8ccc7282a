use serde::{Deserialize, Serialize};

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_SIDECAR_SUFFIX: &str = "tilelayers.xml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_sidecar_suffix")]
    pub sidecar_suffix: String,
    #[serde(default = "default_watch_files")]
    pub watch_files: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Settings {
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            sidecar_suffix: DEFAULT_SIDECAR_SUFFIX.to_string(),
            watch_files: true,
            log_filter: None,
        }
    }
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_sidecar_suffix() -> String {
    DEFAULT_SIDECAR_SUFFIX.to_string()
}

fn default_watch_files() -> bool {
    true
}
