use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum LayerNamesError {
    /// Sidecar could not be opened or is not a layer-names document.
    Parse { path: PathBuf, message: String },
    /// Sidecar could not be written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl LayerNamesError {
    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        LayerNamesError::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        LayerNamesError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            LayerNamesError::Parse { path, .. } | LayerNamesError::Io { path, .. } => path,
        }
    }
}

impl std::fmt::Display for LayerNamesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerNamesError::Parse { path, message } => {
                write!(f, "error reading {}: {}", path.display(), message)
            }
            LayerNamesError::Io { path, source } => {
                write!(f, "error writing {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LayerNamesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayerNamesError::Io { source, .. } => Some(source),
            LayerNamesError::Parse { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LayerNamesError>;
