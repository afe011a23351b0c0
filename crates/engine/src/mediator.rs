//! Bridges client ids and server ids while a create request is in flight.
//!
//! Edits to a hotspot whose create has not been acknowledged cannot be sent
//! (there is no server id to address). They are folded into one pending
//! patch per hotspot and replayed once, as a single write, when the create
//! resolves.

use std::collections::{HashMap, HashSet};

use hotspot_core::hotspot::{Hotspot, HotspotPatch};
use hotspot_core::types::{DbId, HotspotId};

/// Where a persisted change should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The hotspot has a server id; write through.
    Send(DbId),
    /// Merged into the pending patch until the create resolves.
    Deferred,
    /// The create failed; the change stays on this client.
    LocalOnly,
}

/// What to do when a create resolves.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The hotspot still exists. `pending` holds edits made in the meantime.
    Live { pending: Option<HotspotPatch> },
    /// The hotspot was deleted locally before the server answered.
    Abandoned,
}

#[derive(Debug, Default)]
pub struct IdentityMediator {
    in_flight: HashSet<HotspotId>,
    pending: HashMap<HotspotId, HotspotPatch>,
    abandoned: HashSet<HotspotId>,
    local_only: HashSet<HotspotId>,
}

impl IdentityMediator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_create(&mut self, id: HotspotId) {
        self.in_flight.insert(id);
        self.local_only.remove(&id);
    }

    pub fn is_awaiting_identity(&self, id: &HotspotId) -> bool {
        self.in_flight.contains(id)
    }

    pub fn is_local_only(&self, id: &HotspotId) -> bool {
        self.local_only.contains(id)
    }

    pub fn pending(&self, id: &HotspotId) -> Option<&HotspotPatch> {
        self.pending.get(id)
    }

    /// Decide where a persisted change to `hotspot` goes, deferring it if
    /// the create is still in flight.
    pub fn route(&mut self, hotspot: &Hotspot, patch: &HotspotPatch) -> Route {
        if let Some(server_id) = hotspot.backend_id {
            return Route::Send(server_id);
        }
        if !self.in_flight.contains(&hotspot.id) {
            return Route::LocalOnly;
        }
        let patch = patch.clone().persisted_only();
        if !patch.is_empty() {
            self.pending.entry(hotspot.id).or_default().merge(patch);
        }
        Route::Deferred
    }

    /// The create for `id` succeeded.
    pub fn resolve(&mut self, id: HotspotId) -> Resolution {
        self.in_flight.remove(&id);
        let pending = self.pending.remove(&id);
        if self.abandoned.remove(&id) {
            return Resolution::Abandoned;
        }
        Resolution::Live { pending }
    }

    /// The create for `id` failed. Pending edits are dropped and later edits
    /// route to [`Route::LocalOnly`].
    pub fn fail(&mut self, id: HotspotId) -> Option<HotspotPatch> {
        self.in_flight.remove(&id);
        let dropped = self.pending.remove(&id);
        if !self.abandoned.remove(&id) {
            self.local_only.insert(id);
        }
        dropped
    }

    /// The hotspot was deleted locally. Returns `true` if its create is
    /// still in flight, in which case the server copy must be removed once
    /// it exists.
    pub fn abandon(&mut self, id: HotspotId) -> bool {
        self.pending.remove(&id);
        self.local_only.remove(&id);
        if self.in_flight.contains(&id) {
            self.abandoned.insert(id);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
        self.pending.clear();
        self.abandoned.clear();
        self.local_only.clear();
    }
}
