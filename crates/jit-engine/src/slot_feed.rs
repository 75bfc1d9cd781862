//! Slot feed primitives.
//!
//! A thin wrapper over a watch channel: the external slot subscription
//! publishes into [`SlotPublisher`], waiters read the latest slot from a
//! cloned [`SlotFeed`] and await one-shot change notifications.

use tokio::sync::watch;

use crate::error::{EngineError, Result};

/// Publisher half of the slot feed.
#[derive(Debug)]
pub struct SlotPublisher {
    tx: watch::Sender<u64>,
}

impl SlotPublisher {
    /// Publish a newly observed slot.
    ///
    /// Out-of-order updates are ignored; the feed is monotone.
    pub fn publish(&self, slot: u64) {
        self.tx.send_if_modified(|current| {
            if slot > *current {
                *current = slot;
                true
            } else {
                false
            }
        });
    }

    /// Latest published slot.
    #[must_use]
    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }
}

/// Reader half of the slot feed. Clone-cheap; each clone tracks its own
/// notification cursor.
#[derive(Debug, Clone)]
pub struct SlotFeed {
    rx: watch::Receiver<u64>,
}

impl SlotFeed {
    /// Create a feed seeded with `initial`.
    #[must_use]
    pub fn channel(initial: u64) -> (SlotPublisher, SlotFeed) {
        let (tx, rx) = watch::channel(initial);
        (SlotPublisher { tx }, SlotFeed { rx })
    }

    /// Latest observed slot.
    #[must_use]
    pub fn current(&self) -> u64 {
        *self.rx.borrow()
    }

    /// Suspend until a new slot is published, returning it.
    ///
    /// Errors only when the publisher has been dropped.
    pub async fn changed(&mut self) -> Result<u64> {
        self.rx
            .changed()
            .await
            .map_err(|_| EngineError::SlotFeedClosed)?;
        Ok(*self.rx.borrow_and_update())
    }
}
