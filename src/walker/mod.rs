//! Ordered asynchronous directory walker
//!
//! I/O for different branches overlaps; emission does not.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │        Walker           │
//!                     │  - config + dir filter  │
//!                     └───────────┬─────────────┘
//!                                 │ spawn root task
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐  baton    ┌─────▼─────┐  baton    ┌─────▼─────┐
//! │  child 0  │ ────────► │  child 1  │ ────────► │  child N  │
//! │  lstat    │           │  lstat    │           │  lstat    │
//! │  readdir  │           │  readdir  │           │  readdir  │
//! └─────┬─────┘           └─────┬─────┘           └─────┬─────┘
//!       └─────────────────────────┼─────────────────────────┘
//!                                 ▼
//!                     ┌─────────────────────────┐
//!                     │  EventStream / Visitor  │
//!                     │  (tokio mpsc, ordered)  │
//!                     └─────────────────────────┘
//! ```

pub mod baton;
pub mod engine;
pub mod entry;
pub mod event;
pub mod tracker;

pub use engine::{DirFilter, Walker};
pub use entry::{Entry, EntryKind};
pub use event::{EventStream, Visitor, WalkEvent, WalkStats};
