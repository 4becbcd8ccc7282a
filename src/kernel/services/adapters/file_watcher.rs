use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, SystemTime};

const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileWatchEvent {
    Modified(PathBuf),
    Removed(PathBuf),
}

impl FileWatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            FileWatchEvent::Modified(path) | FileWatchEvent::Removed(path) => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileFingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

/// Watches a set of individual files (tileset images).
///
/// Parent directories are watched non-recursively so that editors which save
/// through a temp file + rename are still seen. Raw events are queued by the
/// notify thread and only interpreted in `drain_events`.
pub struct FileWatcherService {
    watcher: RecommendedWatcher,
    raw_event_rx: mpsc::Receiver<notify::Event>,
    watched_files: FxHashSet<PathBuf>,
    watched_dirs: FxHashSet<PathBuf>,
    file_keys: FxHashMap<PathBuf, FxHashSet<PathBuf>>,
    fingerprints: FxHashMap<PathBuf, FileFingerprint>,
}

impl FileWatcherService {
    pub fn new() -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                let _ = tx.send(event);
            },
            Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
        )?;
        Ok(Self {
            watcher,
            raw_event_rx: rx,
            watched_files: FxHashSet::default(),
            watched_dirs: FxHashSet::default(),
            file_keys: FxHashMap::default(),
            fingerprints: FxHashMap::default(),
        })
    }

    pub fn watched_files(&self) -> &FxHashSet<PathBuf> {
        &self.watched_files
    }

    pub fn sync_watched_files<'a, I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut watched_files = FxHashSet::default();
        let mut file_keys: FxHashMap<PathBuf, FxHashSet<PathBuf>> = FxHashMap::default();
        let mut fingerprints: FxHashMap<PathBuf, FileFingerprint> = FxHashMap::default();
        let mut dirs = FxHashSet::default();

        for path in paths {
            let path = path.to_path_buf();
            if !watched_files.insert(path.clone()) {
                continue;
            }

            for key in path_identity_keys(path.as_path()) {
                file_keys.entry(key).or_default().insert(path.clone());
            }
            dirs.insert(parent_dir(path.as_path()));

            if let Some(existing) = self.fingerprints.get(&path).cloned() {
                fingerprints.insert(path, existing);
            } else if let Some(fingerprint) = file_fingerprint(path.as_path()) {
                fingerprints.insert(path, fingerprint);
            }
        }

        for dir in self.watched_dirs.difference(&dirs) {
            if let Err(err) = self.watcher.unwatch(dir) {
                tracing::debug!(dir = %dir.display(), error = %err, "unwatch failed");
            }
        }
        let mut watched_dirs = FxHashSet::default();
        for dir in dirs {
            if self.watched_dirs.contains(&dir) {
                watched_dirs.insert(dir);
                continue;
            }
            match self.watcher.watch(&dir, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    watched_dirs.insert(dir);
                }
                Err(err) => {
                    tracing::warn!(dir = %dir.display(), error = %err, "cannot watch directory");
                }
            }
        }

        self.watched_files = watched_files;
        self.watched_dirs = watched_dirs;
        self.file_keys = file_keys;
        self.fingerprints = fingerprints;
    }

    pub fn drain_events(&mut self) -> Vec<FileWatchEvent> {
        let mut touched = FxHashSet::default();
        while let Ok(event) = self.raw_event_rx.try_recv() {
            for path in touched_paths(event) {
                touched.extend(self.match_watched_paths(path.as_path()));
            }
        }

        let mut events: Vec<FileWatchEvent> = touched
            .into_iter()
            .filter_map(|path| self.resolve(path))
            .collect();
        events.sort_unstable();
        events
    }

    // The file's current state decides the event, whatever sequence of raw
    // events led there.
    fn resolve(&mut self, path: PathBuf) -> Option<FileWatchEvent> {
        match file_fingerprint(path.as_path()) {
            Some(fingerprint) => {
                let changed = self.fingerprints.get(&path) != Some(&fingerprint);
                self.fingerprints.insert(path.clone(), fingerprint);
                changed.then_some(FileWatchEvent::Modified(path))
            }
            None => self
                .fingerprints
                .remove(&path)
                .map(|_| FileWatchEvent::Removed(path)),
        }
    }

    fn match_watched_paths(&self, path: &Path) -> FxHashSet<PathBuf> {
        let mut matched = FxHashSet::default();
        for key in path_identity_keys(path) {
            if let Some(paths) = self.file_keys.get(&key) {
                matched.extend(paths.iter().cloned());
            }
        }
        matched
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn path_identity_keys(path: &Path) -> Vec<PathBuf> {
    let mut keys = vec![path.to_path_buf()];
    if let Ok(canonical) = path.canonicalize() {
        if canonical != path {
            keys.push(canonical);
        }
    }
    keys
}

fn file_fingerprint(path: &Path) -> Option<FileFingerprint> {
    let metadata = std::fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }

    Some(FileFingerprint {
        len: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

fn touched_paths(event: notify::Event) -> Vec<PathBuf> {
    match event.kind {
        // rename events carry both the source and the target
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(_) => event.paths,
        EventKind::Any | EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}
