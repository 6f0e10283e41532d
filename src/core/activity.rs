//! Process-wide activity feed.
//!
//! Created once at start-up and handed to whatever records or displays
//! activity. Keeps the most recent entries in a bounded ring buffer and fans
//! new entries out to subscribers. Each subscriber queue holds at most
//! `capacity` entries; a subscriber that falls behind misses new entries
//! until it catches up.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::{LogEntry, LogLevel};

/// Default number of entries retained
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 500;

/// One line of application activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,

    /// Component that recorded the entry (e.g. "demo")
    pub source: String,

    pub level: LogLevel,

    pub message: String,
}

impl ActivityEntry {
    pub fn new(source: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.into(),
            level,
            message: message.into(),
        }
    }

    /// Mirror a run log entry
    pub fn from_log(source: &str, entry: &LogEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            source: source.to_string(),
            level: entry.level,
            message: format!("[{}] {}", entry.stage.label(), entry.message),
        }
    }
}

struct FeedState {
    buffer: VecDeque<ActivityEntry>,
    subscribers: HashMap<u64, Subscriber>,
    next_subscriber: u64,
}

struct Subscriber {
    sender: mpsc::Sender<ActivityEntry>,
    /// Entries not delivered because the queue was full
    missed: Arc<AtomicU64>,
}

struct FeedInner {
    state: Mutex<FeedState>,
    capacity: usize,
}

impl FeedInner {
    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bounded, subscribable activity log
#[derive(Clone)]
pub struct ActivityFeed {
    inner: Arc<FeedInner>,
}

impl Default for ActivityFeed {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityFeed {
    /// Create a feed keeping at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(FeedInner {
                state: Mutex::new(FeedState {
                    buffer: VecDeque::with_capacity(capacity),
                    subscribers: HashMap::new(),
                    next_subscriber: 0,
                }),
                capacity,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Record an entry, dropping the oldest when full, and notify subscribers
    pub fn record(&self, entry: ActivityEntry) {
        let mut state = self.inner.state();

        if state.buffer.len() >= self.inner.capacity {
            state.buffer.pop_front();
        }
        state.buffer.push_back(entry.clone());

        // Subscribers whose receiver is gone are pruned here
        state.subscribers.retain(|_, subscriber| {
            match subscriber.sender.try_send(entry.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    subscriber.missed.fetch_add(1, Ordering::Relaxed);
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            }
        });
    }

    /// Listen for entries recorded from now on
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.inner.capacity);
        let missed = Arc::new(AtomicU64::new(0));
        let mut state = self.inner.state();
        let id = state.next_subscriber;
        state.next_subscriber += 1;
        state.subscribers.insert(
            id,
            Subscriber {
                sender,
                missed: Arc::clone(&missed),
            },
        );

        Subscription {
            id,
            feed: Arc::downgrade(&self.inner),
            receiver,
            missed,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.state().subscribers.len()
    }

    /// Up to `count` most recent entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<ActivityEntry> {
        let state = self.inner.state();
        let start = state.buffer.len().saturating_sub(count);
        state.buffer.iter().skip(start).cloned().collect()
    }

    pub fn all(&self) -> Vec<ActivityEntry> {
        self.inner.state().buffer.iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.inner.state().buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.state().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`ActivityFeed::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    feed: Weak<FeedInner>,
    receiver: mpsc::Receiver<ActivityEntry>,
    missed: Arc<AtomicU64>,
}

impl Subscription {
    /// Wait for the next entry. `None` once the feed is gone.
    pub async fn recv(&mut self) -> Option<ActivityEntry> {
        self.receiver.recv().await
    }

    /// Next entry if one is already waiting
    pub fn try_recv(&mut self) -> Option<ActivityEntry> {
        self.receiver.try_recv().ok()
    }

    /// Entries dropped so far because this subscriber's queue was full
    pub fn missed(&self) -> u64 {
        self.missed.load(Ordering::Relaxed)
    }

    /// Stop listening
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.upgrade() {
            feed.state().subscribers.remove(&self.id);
        }
    }
}
