//! Traversal engine
//!
//! Every path gets its own tokio task. Stat and listing calls for
//! different branches run concurrently (bounded by a semaphore), while
//! emission is serialized per directory through a baton chain:
//!
//! ```text
//!   dir D (incoming baton Bd)
//!   │
//!   ├── list + sort children [c0, c1, ..., cn-1]
//!   ├── spawn c0(B0) -> B1, c1(B1) -> B2, ..., cn-1(Bn-1) -> Bn
//!   ├── wait Bd ──► emit entry(D), dir(D) ──► release B0
//!   └── wait Bn ──► D finished (counter decremented, own baton released)
//! ```
//!
//! A child only emits after its predecessor has fully finished, so sibling
//! events follow sort order no matter which child's I/O completes first.

use crate::config::WalkConfig;
use crate::error::{EntryError, Result, WalkerError};
use crate::fs::{FileSystem, LocalFs};
use crate::walker::baton::{baton, Baton};
use crate::walker::entry::Entry;
use crate::walker::event::{Emission, EventStream, Visitor, WalkEvent, WalkStats};
use crate::walker::tracker::InFlight;
use std::any::Any;
use std::ffi::OsString;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

/// Directory filter: return `false` to skip a directory and its subtree
pub type DirFilter = dyn Fn(&Path, &Metadata) -> bool + Send + Sync;

/// Configures and starts a walk
pub struct Walker<F: FileSystem = LocalFs> {
    config: WalkConfig,
    fs: F,
    filter: Arc<DirFilter>,
}

impl Walker<LocalFs> {
    /// Walk the local filesystem from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(WalkConfig::new(root))
    }

    pub fn with_config(config: WalkConfig) -> Self {
        Self {
            config,
            fs: LocalFs,
            filter: Arc::new(|_, _| true),
        }
    }
}

impl<F: FileSystem> Walker<F> {
    /// Walk through a different filesystem implementation
    pub fn with_fs<G: FileSystem>(self, fs: G) -> Walker<G> {
        Walker {
            config: self.config,
            fs,
            filter: self.filter,
        }
    }

    /// Only descend into (and report) directories accepted by `predicate`
    pub fn filter_dir<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Path, &Metadata) -> bool + Send + Sync + 'static,
    {
        self.filter = Arc::new(predicate);
        self
    }

    /// Bound the number of simultaneously outstanding I/O calls
    pub fn max_concurrent_io(mut self, count: usize) -> Self {
        self.config = self.config.max_concurrent_io(count);
        self
    }

    /// Configuration the walk will start with
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Start the walk and return its event stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> Result<EventStream> {
        self.config.validate()?;

        info!(
            root = %self.config.root().display(),
            max_concurrent_io = self.config.max_concurrent_io,
            "Starting walk"
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(WalkState {
            fs: self.fs,
            filter: self.filter,
            io_permits: Semaphore::new(self.config.max_concurrent_io),
            in_flight: InFlight::new(),
            events: tx,
        });

        // Nobody follows the root, so its outgoing baton is dropped
        let _ = state.visit(self.config.root, Baton::resolved());

        Ok(EventStream::new(rx))
    }

    /// Run the walk to completion, delivering every event to `visitor`
    pub async fn run<V: Visitor + ?Sized>(self, visitor: &mut V) -> Result<WalkStats> {
        let start = Instant::now();
        let root = self.config().root().to_path_buf();
        let mut events = self.spawn()?;
        let mut stats = WalkStats::default();

        while let Some(event) = events.recv().await {
            stats.record(&event);
            event.dispatch(visitor);
        }

        if !events.is_ended() {
            return Err(WalkerError::ChannelClosed);
        }

        stats.duration = start.elapsed();
        info!(
            root = %root.display(),
            dirs = stats.dirs,
            files = stats.files,
            errors = stats.errors,
            duration_ms = stats.duration.as_millis() as u64,
            "Walk complete"
        );

        Ok(stats)
    }

    /// Run the walk on a fresh multi-threaded runtime, blocking the caller
    ///
    /// # Panics
    ///
    /// Panics when called from within a tokio runtime, since the new
    /// runtime cannot block one of its worker threads. Use [`Walker::run`]
    /// there instead.
    pub fn run_blocking<V: Visitor + ?Sized>(self, visitor: &mut V) -> Result<WalkStats> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        runtime.block_on(self.run(visitor))
    }
}

/// Per-walk shared state
struct WalkState<F> {
    fs: F,
    filter: Arc<DirFilter>,
    io_permits: Semaphore,
    in_flight: InFlight,
    events: mpsc::UnboundedSender<Emission>,
}

impl<F: FileSystem> WalkState<F> {
    /// Start processing `path` once; returns the baton released when it
    /// (and, for a directory, its whole subtree) has finished.
    fn visit(self: &Arc<Self>, path: PathBuf, incoming: Baton) -> Baton {
        self.in_flight.begin();
        let (release, outgoing) = baton();
        let state = Arc::clone(self);

        tokio::spawn(async move {
            // The work runs in its own task so a panic (e.g. in the filter)
            // still leaves this one to report it and keep the counter balanced
            let (forward, work_incoming) = baton();
            let work = tokio::spawn({
                let state = Arc::clone(&state);
                let path = path.clone();
                async move { state.process(path, work_incoming).await }
            });

            incoming.wait().await;
            forward.release();

            if let Err(err) = work.await {
                if err.is_panic() {
                    let message = panic_message(err.into_panic());
                    state.report(EntryError::Panicked { path, message }, None);
                }
            }

            state.done_one();
            release.release();
        });

        outgoing
    }

    async fn process(self: &Arc<Self>, path: PathBuf, incoming: Baton) {
        self.emit(WalkEvent::Visit(path.clone()));

        let metadata = match self.stat(&path).await {
            Ok(metadata) => metadata,
            Err(source) => {
                self.report(EntryError::Stat { path, source }, None);
                incoming.wait().await;
                return;
            }
        };

        let entry = Entry::new(path, metadata);
        if entry.kind().is_dir() {
            self.process_dir(entry, incoming).await;
        } else {
            incoming.wait().await;
            self.emit_entry(entry);
        }
    }

    async fn process_dir(self: &Arc<Self>, entry: Entry, incoming: Baton) {
        if !(self.filter)(entry.path(), entry.metadata()) {
            debug!(path = %entry.path().display(), "Directory filtered out");
            incoming.wait().await;
            return;
        }

        let mut names = match self.list(entry.path()).await {
            Ok(names) => names,
            Err(source) => {
                let metadata = entry.metadata().clone();
                let path = entry.into_path();
                self.report(EntryError::ReadDir { path, source }, Some(metadata));
                incoming.wait().await;
                return;
            }
        };

        names.sort();
        debug!(
            path = %entry.path().display(),
            children = names.len(),
            in_flight = self.in_flight.pending(),
            "Directory listed"
        );

        let (release_first, first) = baton();
        let last = names
            .into_iter()
            .fold(first, |prev, name| self.visit(entry.path().join(name), prev));

        incoming.wait().await;
        self.emit_entry(entry);
        release_first.release();

        last.wait().await;
    }

    /// Emit `entry` followed by the type-specific event
    fn emit_entry(&self, entry: Entry) {
        match WalkEvent::classified(entry.clone()) {
            Some(specific) => {
                // A closed channel only means nobody is listening any more
                let _ = self
                    .events
                    .send(Emission::Pair(WalkEvent::Entry(entry), specific));
            }
            None => {
                let metadata = entry.metadata().clone();
                let path = entry.into_path();
                self.report(EntryError::UnknownFileType { path }, Some(metadata));
            }
        }
    }

    fn report(&self, error: EntryError, metadata: Option<Metadata>) {
        if error.is_not_found() {
            // Common on live filesystems: removed between listing and stat
            debug!(path = %error.path().display(), "Entry vanished during walk");
        } else {
            warn!(error = %error, "Walk error");
        }

        let path = error.path().to_path_buf();
        self.emit(WalkEvent::Error {
            error,
            path,
            metadata,
        });
    }

    fn emit(&self, event: WalkEvent) {
        let _ = self.events.send(Emission::Single(event));
    }

    fn done_one(&self) {
        if self.in_flight.finish() {
            self.emit(WalkEvent::End);
        }
    }

    async fn stat(&self, path: &Path) -> io::Result<Metadata> {
        let _permit = self.io_permits.acquire().await.map_err(io::Error::other)?;
        self.fs.symlink_metadata(path).await
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<OsString>> {
        let _permit = self.io_permits.acquire().await.map_err(io::Error::other)?;
        self.fs.read_dir_names(path).await
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
