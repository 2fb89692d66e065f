//! # Entry Store
//! Couples the persistent [`EntryLog`] with an in-memory pop queue and a
//! cool-down throttle, all behind one lock.
//!
//! - `save` persists first, then enqueues; a failed write leaves the queue alone.
//! - `pop` repeats the last entry while cooling down, hands out a placeholder
//!   when the queue is empty, and otherwise removes the oldest queued entry.
//! - `list`/`get` always re-read the file; `queue` never touches disk.
//!
//! The queue lives only in memory and starts empty on every process start.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::SecondsFormat;
use indexmap::IndexMap;
use metrics::{counter, gauge};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::entry::{Entry, EntryMap};
use crate::error::{StoreError, StoreResult};
use crate::log::EntryLog;
use crate::phrases::PhrasePool;
use crate::throttle::PopThrottle;

pub const DEFAULT_FILE_PATH: &str = "messages.json";
pub const DEFAULT_PLACEHOLDER_AUTHOR: &str = "Tomten";
pub const DEFAULT_PLACEHOLDER_IP: &str = "127.0.0.1";

/// Pop queue snapshot, oldest first.
pub type QueueSnapshot = IndexMap<String, Entry>;

/// Construction-time settings for [`Store`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub file_path: PathBuf,
    /// Minimum time between two distinct pop results. Zero disables throttling.
    pub pop_max_wait: Duration,
    pub placeholder_author: String,
    pub placeholder_ip: String,
    pub phrases: PhrasePool,
    /// Whether handing out a placeholder also starts a cool-down window.
    pub placeholder_updates_throttle: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
            pop_max_wait: Duration::ZERO,
            placeholder_author: DEFAULT_PLACEHOLDER_AUTHOR.to_string(),
            placeholder_ip: DEFAULT_PLACEHOLDER_IP.to_string(),
            phrases: PhrasePool::default(),
            placeholder_updates_throttle: false,
        }
    }
}

impl StoreOptions {
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }

    pub fn with_pop_max_wait(mut self, wait: Duration) -> Self {
        self.pop_max_wait = wait;
        self
    }

    pub fn with_phrases(mut self, phrases: PhrasePool) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn with_placeholder_author(mut self, author: impl Into<String>) -> Self {
        self.placeholder_author = author.into();
        self
    }

    pub fn with_placeholder_updates_throttle(mut self, on: bool) -> Self {
        self.placeholder_updates_throttle = on;
        self
    }
}

/// Which branch of `pop` produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopOutcome {
    /// Repeat of the previous result, still inside the cool-down window.
    Throttled,
    /// Queue was empty; a generated entry was returned.
    Placeholder,
    /// An entry was removed from the queue.
    Fresh,
}

impl PopOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            PopOutcome::Throttled => "throttled",
            PopOutcome::Placeholder => "placeholder",
            PopOutcome::Fresh => "fresh",
        }
    }
}

struct Inner {
    queue: QueueSnapshot,
    throttle: PopThrottle,
    rng: Box<dyn RngCore + Send>,
}

pub struct Store {
    log: EntryLog,
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    options: StoreOptions,
}

impl Store {
    /// Open with the real clock and an OS-seeded random source.
    pub fn open(options: StoreOptions) -> StoreResult<Self> {
        Self::with_parts(options, Arc::new(SystemClock), Box::new(StdRng::from_os_rng()))
    }

    /// Open with an injected clock and random source.
    pub fn with_parts(
        options: StoreOptions,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RngCore + Send>,
    ) -> StoreResult<Self> {
        let log = EntryLog::open(options.file_path.clone())?;
        info!(
            target: "store",
            path = %log.path().display(),
            pop_max_wait_ms = options.pop_max_wait.as_millis() as u64,
            "entry store ready"
        );
        Ok(Self {
            log,
            inner: Mutex::new(Inner {
                queue: QueueSnapshot::new(),
                throttle: PopThrottle::new(options.pop_max_wait),
                rng,
            }),
            clock,
            options,
        })
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Assign id + creation time, persist, then enqueue. Returns the entry as re-read from disk.
    pub fn save(&self, mut entry: Entry) -> StoreResult<Entry> {
        let mut inner = self.inner.lock();

        let mut entries = self.log.list()?;

        let mut id = Uuid::new_v4().to_string();
        while entries.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }
        entry.id = id;
        entry.created = self
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        entries.insert(entry.id.clone(), entry.clone());
        self.log.save(&entries)?;

        let id = entry.id.clone();
        inner.queue.insert(id.clone(), entry);
        let queue_len = inner.queue.len();

        counter!("board_entries_saved_total").increment(1);
        gauge!("board_queue_len").set(queue_len as f64);
        info!(target: "store", %id, queue_len, "entry saved");

        self.get(&id)
    }

    /// Next entry per the throttle/queue rules. Never fails.
    pub fn pop(&self) -> Entry {
        self.pop_with_outcome().0
    }

    pub fn pop_with_outcome(&self) -> (Entry, PopOutcome) {
        let mut inner = self.inner.lock();
        let now = self.clock.now();

        if let Some(last) = inner.throttle.repeat(now) {
            let last = last.clone();
            record_pop(PopOutcome::Throttled, inner.queue.len());
            return (last, PopOutcome::Throttled);
        }

        let Some((_, popped)) = inner.queue.shift_remove_index(0) else {
            let Inner { throttle, rng, .. } = &mut *inner;
            let placeholder = Entry {
                author: self.options.placeholder_author.clone(),
                content: self.options.phrases.pick(rng.as_mut()).to_string(),
                created: now.to_rfc3339_opts(SecondsFormat::Millis, true),
                ip_addr: self.options.placeholder_ip.clone(),
                ..Entry::default()
            };
            if self.options.placeholder_updates_throttle {
                throttle.record(placeholder.clone(), now);
            }
            record_pop(PopOutcome::Placeholder, 0);
            return (placeholder, PopOutcome::Placeholder);
        };

        inner.throttle.record(popped.clone(), now);
        let queue_len = inner.queue.len();
        record_pop(PopOutcome::Fresh, queue_len);
        info!(target: "store", id = %popped.id, queue_len, "entry popped");
        (popped, PopOutcome::Fresh)
    }

    /// One entry from the persistent log.
    pub fn get(&self, id: &str) -> StoreResult<Entry> {
        self.log
            .list()?
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Everything ever saved, read fresh from disk.
    pub fn list(&self) -> StoreResult<EntryMap> {
        self.log.list()
    }

    /// Entries saved but not yet popped, oldest first. No disk access.
    pub fn queue(&self) -> StoreResult<QueueSnapshot> {
        Ok(self.inner.lock().queue.clone())
    }

    pub fn queue_len(&self) -> usize {
        self.inner.lock().queue.len()
    }
}

fn record_pop(outcome: PopOutcome, queue_len: usize) {
    counter!("board_pops_total", "outcome" => outcome.as_str()).increment(1);
    gauge!("board_queue_len").set(queue_len as f64);
    debug!(target: "store", outcome = outcome.as_str(), queue_len, "pop");
}
