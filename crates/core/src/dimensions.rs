//! Last-measured overlay sizes and the re-clamp queue.
//!
//! The rendering layer reports the realized on-screen box of every overlay
//! after paint. Sizes change for reasons the layout cannot predict (text
//! length, scale, style swaps), so a measurement that moves by more than the
//! noise threshold queues the overlay for a re-clamp at its current position.
//! Every valid measurement is cached; the threshold only gates the queue and
//! is measured from the size that last queued a re-clamp, so slow drift
//! still triggers one.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::geometry::Size;
use crate::types::HotspotId;

/// Default change threshold in pixels; smaller deltas are layout jitter.
pub const DEFAULT_MEASURE_THRESHOLD_PX: f64 = 2.0;

/// What [`DimensionObserver::record`] did with a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    /// First measurement for this overlay.
    Initial,
    /// Differs from the previous one beyond the threshold.
    Changed,
    /// Within the threshold; cached but not queued.
    Unchanged,
    /// Non-finite or negative; ignored.
    Rejected,
}

impl Measurement {
    pub fn needs_reclamp(self) -> bool {
        matches!(self, Self::Initial | Self::Changed)
    }
}

#[derive(Debug)]
pub struct DimensionObserver {
    sizes: HashMap<HotspotId, Size>,
    /// Size at the last queued re-clamp.
    baselines: HashMap<HotspotId, Size>,
    queue: VecDeque<HotspotId>,
    queued: HashSet<HotspotId>,
    threshold_px: f64,
}

impl DimensionObserver {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            sizes: HashMap::new(),
            baselines: HashMap::new(),
            queue: VecDeque::new(),
            queued: HashSet::new(),
            threshold_px: threshold_px.max(0.0),
        }
    }

    /// Record a post-paint measurement and enqueue a re-clamp if it moved.
    pub fn record(&mut self, id: HotspotId, size: Size) -> Measurement {
        let valid = size.width.is_finite()
            && size.height.is_finite()
            && size.width >= 0.0
            && size.height >= 0.0;
        if !valid {
            return Measurement::Rejected;
        }

        let outcome = match self.baselines.get(&id) {
            None => Measurement::Initial,
            Some(prev)
                if (prev.width - size.width).abs() > self.threshold_px
                    || (prev.height - size.height).abs() > self.threshold_px =>
            {
                Measurement::Changed
            }
            Some(_) => Measurement::Unchanged,
        };

        self.sizes.insert(id, size);
        if outcome.needs_reclamp() {
            self.baselines.insert(id, size);
            self.enqueue(id);
        }
        outcome
    }

    /// Last valid measurement.
    pub fn get(&self, id: &HotspotId) -> Option<Size> {
        self.sizes.get(id).copied()
    }

    /// Take the queued overlays in arrival order.
    pub fn drain_queue(&mut self) -> Vec<HotspotId> {
        self.queued.clear();
        self.queue.drain(..).collect()
    }

    /// Drop everything known about an overlay.
    pub fn forget(&mut self, id: &HotspotId) {
        self.sizes.remove(id);
        self.baselines.remove(id);
        if self.queued.remove(id) {
            self.queue.retain(|queued| queued != id);
        }
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
        self.baselines.clear();
        self.queue.clear();
        self.queued.clear();
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    fn enqueue(&mut self, id: HotspotId) {
        if self.queued.insert(id) {
            self.queue.push_back(id);
        }
    }
}

impl Default for DimensionObserver {
    fn default() -> Self {
        Self::new(DEFAULT_MEASURE_THRESHOLD_PX)
    }
}
