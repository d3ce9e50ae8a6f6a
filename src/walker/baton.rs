//! One-shot ordering batons
//!
//! A baton is passed from one sibling to the next. The holder of a
//! [`BatonRelease`] signals it exactly once; the holder of the matching
//! [`Baton`] suspends in [`Baton::wait`] until then. Dropping the release
//! side without signalling also resolves the baton, so a failed task can
//! never stall the chain behind it.

use tokio::sync::oneshot;

/// Waiting side of a baton
#[derive(Debug)]
pub struct Baton {
    rx: Option<oneshot::Receiver<()>>,
}

/// Signalling side of a baton
#[derive(Debug)]
pub struct BatonRelease {
    tx: oneshot::Sender<()>,
}

/// Create a linked release/wait pair
pub fn baton() -> (BatonRelease, Baton) {
    let (tx, rx) = oneshot::channel();
    (BatonRelease { tx }, Baton { rx: Some(rx) })
}

impl Baton {
    /// A baton that is already resolved
    pub fn resolved() -> Self {
        Self { rx: None }
    }

    /// Suspend until the paired release fires (or is dropped)
    pub async fn wait(self) {
        if let Some(rx) = self.rx {
            // Err means the sender was dropped, which counts as released
            let _ = rx.await;
        }
    }
}

impl BatonRelease {
    /// Resolve the paired baton
    pub fn release(self) {
        // The waiter may already be gone (e.g. the root's outgoing baton)
        let _ = self.tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_resolved_baton_does_not_block() {
        Baton::resolved().wait().await;
    }

    #[tokio::test]
    async fn test_release_then_wait() {
        let (release, baton) = baton();
        release.release();
        baton.wait().await;
    }

    #[tokio::test]
    async fn test_dropped_release_resolves() {
        let (release, baton) = baton();
        drop(release);
        baton.wait().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_chain_serializes_in_link_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (first_release, first) = baton();

        // Spawn in reverse so scheduling order disagrees with chain order
        let mut links = Vec::new();
        let mut prev = first;
        for i in 0..8 {
            let (release, next) = baton();
            links.push((i, prev, release));
            prev = next;
        }
        let last = prev;

        let mut handles = Vec::new();
        for (i, incoming, release) in links.into_iter().rev() {
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                incoming.wait().await;
                order.lock().unwrap().push(i);
                release.release();
            }));
        }

        first_release.release();
        last.wait().await;
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), (0..8).collect::<Vec<_>>());
    }
}
