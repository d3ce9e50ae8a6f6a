//! In-flight operation counter for one walk

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Counts engine invocations that have started but not finished.
///
/// Reaching zero reports completion exactly once per tracker.
#[derive(Debug, Default)]
pub struct InFlight {
    pending: AtomicUsize,
    finished: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of one invocation
    pub fn begin(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    /// Record the end of one invocation.
    ///
    /// Returns `true` only for the call that takes the counter to zero for
    /// the first time.
    pub fn finish(&self) -> bool {
        let previous = self.pending.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "finish() without matching begin()");
        previous == 1 && !self.finished.swap(true, Ordering::AcqRel)
    }

    /// Current number of unfinished invocations
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_single_transition_to_zero() {
        let tracker = InFlight::new();
        tracker.begin();
        tracker.begin();
        assert_eq!(tracker.pending(), 2);

        assert!(!tracker.finish());
        assert_eq!(tracker.pending(), 1);
        assert!(tracker.finish());
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_zero_reported_once() {
        let tracker = InFlight::new();
        tracker.begin();
        assert!(tracker.finish());

        // A stray second round must not fire again
        tracker.begin();
        assert!(!tracker.finish());
    }

    #[test]
    fn test_concurrent_updates() {
        let tracker = Arc::new(InFlight::new());
        // Hold one so the threads can't reach zero among themselves
        tracker.begin();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    let mut fired = 0;
                    for _ in 0..1000 {
                        tracker.begin();
                        if tracker.finish() {
                            fired += 1;
                        }
                    }
                    fired
                })
            })
            .collect();

        let fired: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(fired, 0);
        assert_eq!(tracker.pending(), 1);
        assert!(tracker.finish());
    }
}
