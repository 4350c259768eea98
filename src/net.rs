//! Network boundary: inbound snapshot cell, outbound event queue
//!
//! The relay itself lives outside this crate. Its listener threads write
//! remote poses into a shared last-write-wins cell; the render pipeline
//! reads the cell once per frame. Stale-by-one-frame data is expected.
//! An actor that stops appearing is kept at its last-known pose until a
//! grace period lapses, then dropped.
//!
//! Outbound traffic is fire-and-forget: the engine enqueues JSON strings
//! and the relay drains them. No acknowledgement, no ordering guarantee
//! beyond queue order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, WeaponId};
use crate::project::BodyPart;

/// What the relay knows about one remote actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemotePose {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

#[derive(Debug, Clone, Copy)]
struct RemoteEntry {
    pose: RemotePose,
    last_seen: f64,
}

/// Shared cell the listener threads publish into. Cloning shares the
/// underlying storage.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCell {
    inner: Arc<Mutex<HashMap<ActorId, RemoteEntry>>>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest pose for an actor. Later writes win.
    pub fn publish(&self, id: ActorId, pose: RemotePose, now: f64) {
        self.inner
            .lock()
            .insert(id, RemoteEntry { pose, last_seen: now });
    }

    /// Drop an actor immediately (disconnect/death signalled by the relay).
    pub fn remove(&self, id: ActorId) {
        self.inner.lock().remove(&id);
    }

    /// Current poses, pruning actors unseen for longer than `grace`
    /// seconds. Called once per frame by the pipeline.
    pub fn poses(&self, now: f64, grace: f64) -> Vec<(ActorId, RemotePose)> {
        let mut map = self.inner.lock();
        map.retain(|_, entry| now - entry.last_seen <= grace);
        map.iter().map(|(&id, entry)| (id, entry.pose)).collect()
    }
}

/// Discrete state-change messages sent back to the relay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundEvent {
    Pose {
        x: f32,
        y: f32,
        angle: f32,
    },
    Shot {
        shooter: ActorId,
        weapon: WeaponId,
    },
    Hit {
        shooter: ActorId,
        target: ActorId,
        part: BodyPart,
        damage: f32,
    },
    Reload {
        actor: ActorId,
    },
    WeaponSwitch {
        actor: ActorId,
        slot: u8,
    },
}

/// Queue of encoded outbound messages, drained by the relay.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    queue: Arc<Mutex<Vec<String>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: &OutboundEvent) {
        match serde_json::to_string(event) {
            Ok(wire) => self.queue.lock().push(wire),
            Err(err) => log::warn!("dropping unencodable outbound event: {err}"),
        }
    }

    /// Take everything queued so far, in push order.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
