//! Walk events, their delivery, and summary statistics

use crate::error::{EntryError, Result, WalkerError};
use crate::walker::entry::{Entry, EntryKind};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// One notification from a walk
#[derive(Debug)]
pub enum WalkEvent {
    /// A path was first touched (not ordered by the baton chain)
    Visit(PathBuf),
    /// Generic notice for every classified path, always followed by one
    /// type-specific event for the same entry
    Entry(Entry),
    Dir(Entry),
    File(Entry),
    Symlink(Entry),
    BlockDevice(Entry),
    CharacterDevice(Entry),
    Fifo(Entry),
    Socket(Entry),
    /// A non-fatal failure; metadata is `None` when even lstat failed
    Error {
        error: EntryError,
        path: PathBuf,
        metadata: Option<Metadata>,
    },
    /// The walk is complete; nothing follows
    End,
}

impl WalkEvent {
    /// The type-specific event for a classified entry, or `None` for an
    /// unknown kind
    pub fn classified(entry: Entry) -> Option<Self> {
        let event = match entry.kind() {
            EntryKind::Directory => WalkEvent::Dir(entry),
            EntryKind::File => WalkEvent::File(entry),
            EntryKind::Symlink => WalkEvent::Symlink(entry),
            EntryKind::BlockDevice => WalkEvent::BlockDevice(entry),
            EntryKind::CharacterDevice => WalkEvent::CharacterDevice(entry),
            EntryKind::Fifo => WalkEvent::Fifo(entry),
            EntryKind::Socket => WalkEvent::Socket(entry),
            EntryKind::Unknown => return None,
        };
        Some(event)
    }

    /// Event name as subscribers know it
    pub fn name(&self) -> &'static str {
        match self {
            WalkEvent::Visit(_) => "visit",
            WalkEvent::Entry(_) => "entry",
            WalkEvent::Dir(_) => "dir",
            WalkEvent::File(_) => "file",
            WalkEvent::Symlink(_) => "symlink",
            WalkEvent::BlockDevice(_) => "blockDevice",
            WalkEvent::CharacterDevice(_) => "characterDevice",
            WalkEvent::Fifo(_) => "fifo",
            WalkEvent::Socket(_) => "socket",
            WalkEvent::Error { .. } => "error",
            WalkEvent::End => "end",
        }
    }

    /// Path the event refers to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            WalkEvent::Visit(path) => Some(path),
            WalkEvent::Entry(entry)
            | WalkEvent::Dir(entry)
            | WalkEvent::File(entry)
            | WalkEvent::Symlink(entry)
            | WalkEvent::BlockDevice(entry)
            | WalkEvent::CharacterDevice(entry)
            | WalkEvent::Fifo(entry)
            | WalkEvent::Socket(entry) => Some(entry.path()),
            WalkEvent::Error { path, .. } => Some(path),
            WalkEvent::End => None,
        }
    }

    /// Deliver this event to the matching visitor callback
    pub fn dispatch<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            WalkEvent::Visit(path) => visitor.visit(path),
            WalkEvent::Entry(entry) => visitor.entry(entry),
            WalkEvent::Dir(entry) => visitor.dir(entry),
            WalkEvent::File(entry) => visitor.file(entry),
            WalkEvent::Symlink(entry) => visitor.symlink(entry),
            WalkEvent::BlockDevice(entry) => visitor.block_device(entry),
            WalkEvent::CharacterDevice(entry) => visitor.character_device(entry),
            WalkEvent::Fifo(entry) => visitor.fifo(entry),
            WalkEvent::Socket(entry) => visitor.socket(entry),
            WalkEvent::Error {
                error,
                path,
                metadata,
            } => visitor.error(error, path, metadata.as_ref()),
            WalkEvent::End => visitor.end(),
        }
    }
}

/// Callback interface for walk events.
///
/// Every method defaults to doing nothing, so implementors only override
/// what they care about. Calls arrive in emission order.
pub trait Visitor {
    fn visit(&mut self, _path: &Path) {}
    fn entry(&mut self, _entry: &Entry) {}
    fn dir(&mut self, _entry: &Entry) {}
    fn file(&mut self, _entry: &Entry) {}
    fn symlink(&mut self, _entry: &Entry) {}
    fn block_device(&mut self, _entry: &Entry) {}
    fn character_device(&mut self, _entry: &Entry) {}
    fn fifo(&mut self, _entry: &Entry) {}
    fn socket(&mut self, _entry: &Entry) {}
    fn error(&mut self, _error: &EntryError, _path: &Path, _metadata: Option<&Metadata>) {}
    fn end(&mut self) {}
}

/// Ignores every event; useful when only [`WalkStats`] are wanted
impl Visitor for () {}

/// Unit of delivery on the walk channel.
///
/// `entry` and its type-specific event travel as one message so that no
/// other task's event can land between them.
#[derive(Debug)]
pub(crate) enum Emission {
    Single(WalkEvent),
    Pair(WalkEvent, WalkEvent),
}

/// Receiving end of a running walk
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<Emission>,
    pending: Option<WalkEvent>,
    ended: bool,
}

impl EventStream {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Emission>) -> Self {
        Self {
            rx,
            pending: None,
            ended: false,
        }
    }

    /// Next event, or `None` once `End` has been delivered
    pub async fn recv(&mut self) -> Option<WalkEvent> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        if self.ended {
            return None;
        }

        let event = match self.rx.recv().await? {
            Emission::Single(event) => event,
            Emission::Pair(first, second) => {
                self.pending = Some(second);
                first
            }
        };
        if matches!(event, WalkEvent::End) {
            self.ended = true;
        }
        Some(event)
    }

    /// Whether `End` has been delivered
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Drain the whole walk into a vector, `End` included
    pub async fn collect(mut self) -> Result<Vec<WalkEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.recv().await {
            events.push(event);
        }
        if self.ended {
            Ok(events)
        } else {
            Err(WalkerError::ChannelClosed)
        }
    }
}

/// Result from walk operation
#[derive(Debug, Clone, Default)]
pub struct WalkStats {
    pub visited: u64,
    pub dirs: u64,
    pub files: u64,
    pub symlinks: u64,
    pub block_devices: u64,
    pub char_devices: u64,
    pub fifos: u64,
    pub sockets: u64,
    pub errors: u64,
    pub duration: Duration,
}

impl WalkStats {
    /// Account for one event
    pub fn record(&mut self, event: &WalkEvent) {
        match event {
            WalkEvent::Visit(_) => self.visited += 1,
            WalkEvent::Dir(_) => self.dirs += 1,
            WalkEvent::File(_) => self.files += 1,
            WalkEvent::Symlink(_) => self.symlinks += 1,
            WalkEvent::BlockDevice(_) => self.block_devices += 1,
            WalkEvent::CharacterDevice(_) => self.char_devices += 1,
            WalkEvent::Fifo(_) => self.fifos += 1,
            WalkEvent::Socket(_) => self.sockets += 1,
            WalkEvent::Error { .. } => self.errors += 1,
            WalkEvent::Entry(_) | WalkEvent::End => {}
        }
    }

    /// Number of successfully classified entries
    pub fn entries(&self) -> u64 {
        self.dirs
            + self.files
            + self.symlinks
            + self.block_devices
            + self.char_devices
            + self.fifos
            + self.sockets
    }

    pub fn entries_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.entries() as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn file_entry(dir: &Path) -> Entry {
        let path = dir.join("a.txt");
        std::fs::write(&path, b"a").unwrap();
        Entry::new(path.clone(), std::fs::symlink_metadata(&path).unwrap())
    }

    #[derive(Default)]
    struct Names(Vec<&'static str>);

    impl Visitor for Names {
        fn entry(&mut self, _entry: &Entry) {
            self.0.push("entry");
        }
        fn file(&mut self, _entry: &Entry) {
            self.0.push("file");
        }
        fn end(&mut self) {
            self.0.push("end");
        }
    }

    #[test]
    fn test_classified_event() {
        let dir = tempdir().unwrap();
        let event = WalkEvent::classified(file_entry(dir.path())).unwrap();
        assert_eq!(event.name(), "file");
        assert!(event.path().unwrap().ends_with("a.txt"));
        assert!(WalkEvent::End.path().is_none());
    }

    #[test]
    fn test_dispatch_to_visitor() {
        let dir = tempdir().unwrap();
        let entry = file_entry(dir.path());
        let mut names = Names::default();

        WalkEvent::Entry(entry.clone()).dispatch(&mut names);
        WalkEvent::File(entry).dispatch(&mut names);
        WalkEvent::Visit(dir.path().to_path_buf()).dispatch(&mut names);
        WalkEvent::End.dispatch(&mut names);

        assert_eq!(names.0, vec!["entry", "file", "end"]);
    }

    #[test]
    fn test_walk_stats_record() {
        let dir = tempdir().unwrap();
        let entry = file_entry(dir.path());
        let mut stats = WalkStats::default();

        stats.record(&WalkEvent::Visit(entry.path().to_path_buf()));
        stats.record(&WalkEvent::Entry(entry.clone()));
        stats.record(&WalkEvent::File(entry));
        stats.record(&WalkEvent::Error {
            error: EntryError::UnknownFileType { path: "/x".into() },
            path: "/x".into(),
            metadata: None,
        });

        assert_eq!(stats.visited, 1);
        assert_eq!(stats.files, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.entries(), 1);
    }

    #[test]
    fn test_entries_per_second() {
        let mut stats = WalkStats {
            files: 900,
            dirs: 100,
            ..Default::default()
        };
        assert_eq!(stats.entries_per_second(), 0.0);
        stats.duration = Duration::from_secs(10);
        assert!((stats.entries_per_second() - 100.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_stream_stops_after_end() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Emission::Single(WalkEvent::Visit("/r".into()))).unwrap();
        tx.send(Emission::Single(WalkEvent::End)).unwrap();
        tx.send(Emission::Single(WalkEvent::Visit("/late".into()))).unwrap();

        let events = EventStream::new(rx).collect().await.unwrap();
        let names: Vec<_> = events.iter().map(WalkEvent::name).collect();
        assert_eq!(names, vec!["visit", "end"]);
    }

    #[tokio::test]
    async fn test_stream_unpacks_pairs_in_order() {
        let dir = tempdir().unwrap();
        let entry = file_entry(dir.path());
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Emission::Pair(
            WalkEvent::Entry(entry.clone()),
            WalkEvent::File(entry),
        ))
        .unwrap();
        tx.send(Emission::Single(WalkEvent::End)).unwrap();

        let events = EventStream::new(rx).collect().await.unwrap();
        let names: Vec<_> = events.iter().map(WalkEvent::name).collect();
        assert_eq!(names, vec!["entry", "file", "end"]);
    }

    #[tokio::test]
    async fn test_stream_closed_without_end() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Emission::Single(WalkEvent::Visit("/r".into()))).unwrap();
        drop(tx);

        let result = EventStream::new(rx).collect().await;
        assert!(matches!(result, Err(WalkerError::ChannelClosed)));
    }
}
