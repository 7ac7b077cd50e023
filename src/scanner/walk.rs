//! Depth-first enumeration of one root path.
//!
//! ```text
//! PathWalker thread ── bounded(0) ──> WalkStream (Iterator) ──> orchestrator
//! ```
//!
//! The hand-off is a rendezvous: every send blocks until the orchestrator has
//! taken the previous item, so the walker never runs ahead of evaluation and
//! observes cancellation before touching the filesystem again.

use crate::error::WalkError;
use crate::model::MetadataRecord;
use crate::scanner::CancelToken;
use crate::utils::path::absolute_clean;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};
use walkdir::WalkDir;

pub type WalkItem = Result<MetadataRecord, WalkError>;

/// Walker for a single root path. Consumed by [`PathWalker::spawn`]; build a
/// new one per root.
#[derive(Debug, Clone)]
pub struct PathWalker {
    root: PathBuf,
    exclusions: Vec<PathBuf>,
    recursive: bool,
    cancel: CancelToken,
}

impl PathWalker {
    pub fn new(root: impl Into<PathBuf>, cancel: CancelToken) -> Self {
        Self {
            root: root.into(),
            exclusions: Vec::new(),
            recursive: false,
            cancel,
        }
    }

    /// Paths to skip. Matching is exact after both sides are made absolute
    /// and lexically cleaned; entries that cannot be qualified are dropped.
    pub fn exclusions<P: AsRef<Path>>(mut self, exclusions: &[P]) -> Self {
        self.exclusions = exclusions
            .iter()
            .filter_map(|path| absolute_clean(path.as_ref()).ok())
            .collect();
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Starts the walk on its own thread and returns the consuming end.
    pub fn spawn(self) -> io::Result<WalkStream> {
        let (tx, rx) = bounded::<WalkItem>(0);
        let handle = thread::Builder::new()
            .name("path-walker".to_string())
            .spawn(move || self.run(tx))?;

        Ok(WalkStream {
            rx: Some(rx),
            handle: Some(handle),
        })
    }

    fn run(self, tx: Sender<WalkItem>) {
        let root = match absolute_clean(&self.root) {
            Ok(root) => root,
            Err(source) => {
                let _ = tx.send(Err(WalkError::InvalidRoot {
                    path: self.root.clone(),
                    source,
                }));
                return;
            }
        };
        debug!(root = %root.display(), recursive = self.recursive, "walk started");

        let mut entries = WalkDir::new(&root).follow_links(false).into_iter();
        let mut sent = 0usize;

        loop {
            if self.cancel.is_canceled() {
                let _ = tx.send(Err(WalkError::Canceled));
                debug!(root = %root.display(), sent, "walk canceled");
                return;
            }

            let Some(entry) = entries.next() else {
                break;
            };

            let item = match entry {
                Ok(entry) => {
                    // children of a cleaned root are themselves clean
                    let path = entry.path().to_path_buf();
                    let is_dir = entry.file_type().is_dir();

                    if self.is_excluded(&path) {
                        if is_dir {
                            entries.skip_current_dir();
                        }
                        Err(WalkError::Ignored(path))
                    } else {
                        if is_dir && entry.depth() > 0 && !self.recursive {
                            entries.skip_current_dir();
                        }
                        match entry.metadata() {
                            Ok(metadata) => MetadataRecord::from_metadata(path.clone(), &metadata)
                                .map_err(|source| WalkError::Io { path, source }),
                            Err(err) => Err(classify(err, &path)),
                        }
                    }
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.clone());
                    Err(classify(err, &path))
                }
            };

            if self.cancel.is_canceled() {
                let _ = tx.send(Err(WalkError::Canceled));
                debug!(root = %root.display(), sent, "walk canceled");
                return;
            }

            let fatal = matches!(item, Err(WalkError::Io { .. }));
            if let Err(ref err) = item {
                trace!(error = %err, "walk condition");
            }
            if tx.send(item).is_err() {
                debug!(root = %root.display(), sent, "walk receiver dropped");
                return;
            }
            sent += 1;
            if fatal {
                return;
            }
        }

        debug!(root = %root.display(), sent, "walk finished");
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclusions.iter().any(|excluded| excluded == path)
    }
}

fn classify(err: walkdir::Error, path: &Path) -> WalkError {
    let not_found = err
        .io_error()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::NotFound);
    if not_found {
        return WalkError::NotFound(path.to_path_buf());
    }
    // walkdir's own Display repeats the path; keep only the underlying cause
    let source = match err.into_io_error() {
        Some(io_err) => io_err,
        None => io::Error::other("filesystem loop detected"),
    };
    WalkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Consuming end of a walk. Yields items in depth-first visitation order and
/// ends when the walker finishes, aborts, or observes cancellation.
///
/// Dropping the stream disconnects the walker and joins its thread.
#[derive(Debug)]
pub struct WalkStream {
    rx: Option<Receiver<WalkItem>>,
    handle: Option<JoinHandle<()>>,
}

impl Iterator for WalkStream {
    type Item = WalkItem;

    fn next(&mut self) -> Option<Self::Item> {
        if let Ok(item) = self.rx.as_ref()?.recv() {
            return Some(item);
        }
        // the walker hung up; only a panicked walker is reported
        self.rx = None;
        match self.handle.take().map(JoinHandle::join) {
            Some(Err(_)) => Some(Err(WalkError::Aborted)),
            _ => None,
        }
    }
}

impl Drop for WalkStream {
    fn drop(&mut self) {
        // disconnect first so a walker blocked in send can observe it
        drop(self.rx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
