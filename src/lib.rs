//! tree-walker - Ordered Asynchronous Directory Walker
//!
//! Recursively visits every entry under a root path, classifies it, and
//! reports it through a typed event stream. Stat and directory listing
//! calls for different branches of the tree run concurrently, but the
//! events come out in a deterministic order: within every directory,
//! children are reported in sorted name order, and a directory is always
//! reported before anything beneath it.
//!
//! # Features
//!
//! - **Overlapped I/O**: every path is processed by its own tokio task;
//!   the number of outstanding stat/readdir calls is bounded.
//!
//! - **Deterministic Order**: a chain of one-shot batons between siblings
//!   serializes emission without serializing I/O.
//!
//! - **Non-fatal Errors**: stat failures, listing failures and unknown
//!   entry types are reported as events; the walk always reaches `end`.
//!
//! - **Symlinks Are Not Followed**: entries are inspected with lstat.
//!
//! # Example
//!
//! ```no_run
//! use tree_walker::{Walker, WalkEvent};
//!
//! # async fn demo() -> tree_walker::Result<()> {
//! let mut events = Walker::new("/data")
//!     .filter_dir(|path, _meta| !path.ends_with(".git"))
//!     .spawn()?;
//!
//! while let Some(event) = events.recv().await {
//!     if let WalkEvent::File(entry) = &event {
//!         println!("{}", entry.path().display());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod walker;

pub use config::WalkConfig;
pub use error::{ConfigError, EntryError, Result, WalkerError};
pub use fs::{FileSystem, LocalFs};
pub use walker::{DirFilter, Entry, EntryKind, EventStream, Visitor, WalkEvent, WalkStats, Walker};
