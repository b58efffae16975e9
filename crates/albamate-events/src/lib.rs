//! Notification bus for toggle outcomes.
//!
//! The bus carries the user-visible outcomes of scrap toggles (added,
//! removed, corrected, failed, session expired) as typed notices with
//! sequential identifiers. Internally it uses `tokio::broadcast` with a
//! bounded replay ring so late subscribers (a status line, a notification
//! drawer) can catch up on recent notices; when the channel overflows, the
//! oldest notices are dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use albamate_core::FormId;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};

/// Identifier assigned to each notice published on the bus.
pub type NoticeId = u64;

/// Default buffer size for the in-memory replay ring.
const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// User-visible outcomes surfaced by the synchronizer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// A scrap was added and confirmed by the backend.
    ScrapAdded { form_id: FormId },
    /// A scrap was removed and confirmed by the backend.
    ScrapRemoved { form_id: FormId },
    /// The backend reported the form already scrapped; the toggle was
    /// corrected into a removal.
    ScrapCorrected { form_id: FormId },
    /// The toggle failed and the optimistic write was rolled back.
    ToggleFailed { form_id: FormId, message: String },
    /// The session expired mid-toggle; the actor must sign in again.
    SessionExpired,
}

impl Notice {
    /// Machine-friendly discriminator for log fields and UI routing.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::ScrapAdded { .. } => "scrap_added",
            Notice::ScrapRemoved { .. } => "scrap_removed",
            Notice::ScrapCorrected { .. } => "scrap_corrected",
            Notice::ToggleFailed { .. } => "toggle_failed",
            Notice::SessionExpired => "session_expired",
        }
    }
}

/// Metadata wrapper around notices. Each envelope tracks the notice id and
/// emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct NoticeEnvelope {
    pub id: NoticeId,
    pub timestamp: DateTime<Utc>,
    pub notice: Notice,
}

/// Bounded replay ring plus the id sequence. Kept behind one lock so an
/// envelope's id and its ring slot are assigned atomically; subscribers
/// replaying while a publish is in progress see either none or all of it.
struct Replay {
    ring: VecDeque<NoticeEnvelope>,
    next_id: NoticeId,
}

impl Replay {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: VecDeque::with_capacity(capacity),
            next_id: 1,
        }
    }

    fn record(&mut self, capacity: usize, notice: Notice) -> NoticeEnvelope {
        let envelope = NoticeEnvelope {
            id: self.next_id,
            timestamp: Utc::now(),
            notice,
        };
        self.next_id += 1;
        while self.ring.len() >= capacity {
            self.ring.pop_front();
        }
        self.ring.push_back(envelope.clone());
        envelope
    }

    fn newer_than(&self, since: NoticeId) -> VecDeque<NoticeEnvelope> {
        self.ring
            .iter()
            .filter(|item| item.id > since)
            .cloned()
            .collect()
    }
}

/// Shared notice bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct NoticeBus {
    sender: Sender<NoticeEnvelope>,
    replay: Arc<Mutex<Replay>>,
    replay_capacity: usize,
}

impl NoticeBus {
    /// Construct a new bus with the provided broadcast capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "notice bus capacity must be positive");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            replay: Arc::new(Mutex::new(Replay::with_capacity(capacity))),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default in-memory buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish a notice, assigning it a sequential identifier.
    ///
    /// # Panics
    ///
    /// Panics if the replay ring mutex has been poisoned.
    pub fn publish(&self, notice: Notice) -> NoticeId {
        let envelope = {
            let mut replay = self.replay.lock().expect("notice replay mutex poisoned");
            replay.record(self.replay_capacity, notice)
        };
        let id = envelope.id;
        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to the bus, replaying any ring notices newer than
    /// `since_id`.
    ///
    /// # Panics
    ///
    /// Panics if the replay ring mutex has been poisoned.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<NoticeId>) -> NoticeStream {
        let backlog = match since_id {
            Some(since) => self
                .replay
                .lock()
                .expect("notice replay mutex poisoned")
                .newer_than(since),
            None => VecDeque::new(),
        };

        let receiver = self.sender.subscribe();
        NoticeStream { backlog, receiver }
    }

    /// Returns the last assigned identifier, if any notices have been
    /// published.
    ///
    /// # Panics
    ///
    /// Panics if the replay ring mutex has been poisoned.
    #[must_use]
    pub fn last_notice_id(&self) -> Option<NoticeId> {
        let replay = self.replay.lock().expect("notice replay mutex poisoned");
        replay.ring.back().map(|notice| notice.id)
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream wrapper that yields notices either from the replay backlog or from
/// the live broadcast channel.
pub struct NoticeStream {
    backlog: VecDeque<NoticeEnvelope>,
    receiver: Receiver<NoticeEnvelope>,
}

impl NoticeStream {
    /// Receive the next notice, respecting the replay backlog first.
    pub async fn next(&mut self) -> Option<NoticeEnvelope> {
        if let Some(notice) = self.backlog.pop_front() {
            return Some(notice);
        }

        match self.receiver.recv().await {
            Ok(notice) => Some(notice),
            Err(broadcast::error::RecvError::Lagged(_)) => self.receiver.recv().await.ok(),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Drain whatever is immediately available without waiting.
    pub fn drain_ready(&mut self) -> Vec<NoticeEnvelope> {
        let mut drained: Vec<NoticeEnvelope> = self.backlog.drain(..).collect();
        while let Ok(notice) = self.receiver.try_recv() {
            drained.push(notice);
        }
        drained
    }
}
