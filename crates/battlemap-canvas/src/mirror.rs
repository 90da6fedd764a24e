//! State mirror: one-way sync of the player-relevant state to the
//! presentation surface.
//!
//! The mirror never sends deltas. Each push carries a complete [`Snapshot`];
//! the surface only ever needs the newest one.
//!
//! ```text
//! Session::tick ── notify(fingerprint) ──► debounce (100ms, reset per change)
//!                                               │ due
//!               take_resend_request() ──────────┼──► push_snapshot()
//! ```
//!
//! Delivery failures are logged and dropped. The surface recovers by asking
//! for a resend, which is answered on the next poll without waiting.

use std::time::{Duration, Instant};

use battlemap_core::constants::MIRROR_COALESCE_MS;
use battlemap_core::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::encounter::Encounter;
use crate::geometry::Rect;

/// Everything the presentation surface draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Increases by one per push from the same mirror.
    pub sequence: u64,
    pub encounter: Encounter,
    pub presentation_bounds: Option<Rect>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            MirrorError::Serialization {
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The parts of session state whose change warrants a push.
///
/// Viewport zoom and pan are not part of it; the player display frames
/// itself from the presentation bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorFingerprint {
    tokens: Vec<(Uuid, i32, i32)>,
    fog_area_count: usize,
    fog_revision: u64,
    bounds: Option<[u64; 4]>,
}

impl MirrorFingerprint {
    pub fn capture(encounter: &Encounter, bounds: Option<Rect>) -> Self {
        Self {
            tokens: encounter
                .tokens
                .iter()
                .map(|t| (t.id, t.grid_x, t.grid_y))
                .collect(),
            fog_area_count: encounter.fog_of_war.area_count(),
            fog_revision: encounter.fog_of_war.revision(),
            bounds: bounds.map(|r| {
                [
                    r.x.to_bits(),
                    r.y.to_bits(),
                    r.width.to_bits(),
                    r.height.to_bits(),
                ]
            }),
        }
    }
}

/// Receiving end of the presentation channel, from the mirror's side.
pub trait SnapshotSink {
    /// Delivers a snapshot. Returns [`MirrorError::NotListening`] when nobody
    /// is attached.
    fn push_snapshot(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Pops a pending resend request, if the surface asked for one.
    fn take_resend_request(&mut self) -> bool;
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for Box<S> {
    fn push_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        (**self).push_snapshot(snapshot)
    }

    fn take_resend_request(&mut self) -> bool {
        (**self).take_resend_request()
    }
}

/// Debounces relevant changes into snapshot pushes.
#[derive(Debug)]
pub struct StateMirror<S: SnapshotSink> {
    sink: S,
    delay: Duration,
    observed: Option<MirrorFingerprint>,
    deadline: Option<Instant>,
    sequence: u64,
}

impl<S: SnapshotSink> StateMirror<S> {
    pub fn new(sink: S) -> Self {
        Self::with_delay(sink, Duration::from_millis(MIRROR_COALESCE_MS))
    }

    pub fn with_delay(sink: S, delay: Duration) -> Self {
        Self {
            sink,
            delay,
            observed: None,
            deadline: None,
            sequence: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Number of snapshots handed to the sink so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Records the current state. A relevant change (re)starts the delay.
    pub fn notify(&mut self, encounter: &Encounter, bounds: Option<Rect>, now: Instant) {
        let fingerprint = MirrorFingerprint::capture(encounter, bounds);
        if self.observed.as_ref() == Some(&fingerprint) {
            return;
        }
        self.observed = Some(fingerprint);
        self.deadline = Some(now + self.delay);
        tracing::trace!("Mirror push scheduled in {:?}", self.delay);
    }

    /// Pushes when a resend was requested or the delay has elapsed.
    ///
    /// Returns true when a snapshot was delivered.
    pub fn poll(&mut self, encounter: &Encounter, bounds: Option<Rect>, now: Instant) -> bool {
        let resend = self.sink.take_resend_request();
        let due = self.deadline.is_some_and(|d| now >= d);
        if !resend && !due {
            return false;
        }
        if resend {
            tracing::debug!("Answering presentation resend request");
        }
        self.push_now(encounter, bounds)
    }

    /// Pushes immediately, clearing any scheduled push.
    pub fn push_now(&mut self, encounter: &Encounter, bounds: Option<Rect>) -> bool {
        self.deadline = None;
        self.sequence += 1;
        let snapshot = Snapshot {
            sequence: self.sequence,
            encounter: encounter.clone(),
            presentation_bounds: bounds,
        };
        match self.sink.push_snapshot(&snapshot) {
            Ok(()) => {
                tracing::debug!("Pushed snapshot #{}", self.sequence);
                true
            }
            Err(e) => {
                tracing::warn!("Dropped snapshot #{}: {}", self.sequence, e);
                false
            }
        }
    }
}

/// Creates a connected mirror sink and presentation receiver.
///
/// Snapshots travel as JSON over a `watch` channel, so a slow receiver only
/// ever sees the newest one. Resend requests travel the other way over an
/// unbounded `mpsc` channel.
pub fn presentation_channel() -> (WatchSink, PresentationReceiver) {
    let (snapshot_tx, snapshot_rx) = watch::channel(None);
    let (resend_tx, resend_rx) = mpsc::unbounded_channel();
    (
        WatchSink {
            snapshots: snapshot_tx,
            resend_requests: resend_rx,
        },
        PresentationReceiver {
            snapshots: snapshot_rx,
            resend_requests: resend_tx,
        },
    )
}

/// [`SnapshotSink`] backed by tokio channels.
#[derive(Debug)]
pub struct WatchSink {
    snapshots: watch::Sender<Option<String>>,
    resend_requests: mpsc::UnboundedReceiver<()>,
}

impl WatchSink {
    pub fn is_listening(&self) -> bool {
        self.snapshots.receiver_count() > 0
    }
}

impl SnapshotSink for WatchSink {
    fn push_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        self.snapshots
            .send(Some(json))
            .map_err(|_| MirrorError::NotListening.into())
    }

    fn take_resend_request(&mut self) -> bool {
        let mut requested = false;
        while self.resend_requests.try_recv().is_ok() {
            requested = true;
        }
        requested
    }
}

/// The presentation surface's end of the channel.
#[derive(Debug, Clone)]
pub struct PresentationReceiver {
    snapshots: watch::Receiver<Option<String>>,
    resend_requests: mpsc::UnboundedSender<()>,
}

impl PresentationReceiver {
    /// Asks the mirror to push the full state on its next poll.
    pub fn request_resend(&self) -> Result<()> {
        self.resend_requests
            .send(())
            .map_err(|_| MirrorError::ChannelClosed.into())
    }

    /// True when a snapshot arrived since the last [`PresentationReceiver::latest`].
    pub fn has_update(&self) -> bool {
        self.snapshots.has_changed().unwrap_or(false)
    }

    /// The newest snapshot, marking it seen.
    pub fn latest(&mut self) -> Result<Option<Snapshot>> {
        let json = self.snapshots.borrow_and_update().clone();
        json.as_deref().map(Snapshot::from_json).transpose()
    }

    /// Waits for the next snapshot.
    pub async fn changed(&mut self) -> Result<Snapshot> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| MirrorError::ChannelClosed)?;
        self.latest()?
            .ok_or_else(|| MirrorError::ChannelClosed.into())
    }
}
