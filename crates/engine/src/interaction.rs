//! Pointer-driven drag and resize gestures.
//!
//! The rendering layer forwards raw pointer samples in container pixel
//! coordinates. A gesture captures the pointer that started it; samples from
//! other pointers are ignored until the gesture ends, so a second finger on a
//! touch screen cannot hijack a drag.

use hotspot_core::error::CoreError;
use hotspot_core::hotspot::{MAX_SCALE, MIN_SCALE};
use hotspot_core::types::HotspotId;
use hotspot_events::{EditorEventKind, GestureKind, GestureOutcome};

use crate::error::EngineError;
use crate::store::HotspotStore;

/// Pointer distances below this are treated as this value when a resize
/// starts, so grabbing the handle right at the center does not explode the
/// ratio.
pub const MIN_RESIZE_DISTANCE_PX: f64 = 4.0;

/// Scale changes smaller than this are not written.
const SCALE_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Mouse,
    Touch,
    Pen,
}

/// A pointer event in container pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pointer_id: u64,
    pub source: InputSource,
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            pointer_id: 1,
            source: InputSource::Mouse,
            x,
            y,
        }
    }

    pub fn touch(pointer_id: u64, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            source: InputSource::Touch,
            x,
            y,
        }
    }

    fn capture(&self) -> PointerCapture {
        PointerCapture {
            pointer_id: self.pointer_id,
            source: self.source,
        }
    }
}

/// The pointer a gesture listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerCapture {
    pub pointer_id: u64,
    pub source: InputSource,
}

#[derive(Debug)]
struct DragGesture {
    hotspot_id: HotspotId,
    capture: PointerCapture,
    /// Pointer position minus hotspot center at grab time, normalized.
    offset: (f64, f64),
}

#[derive(Debug)]
struct ResizeGesture {
    hotspot_id: HotspotId,
    capture: PointerCapture,
    initial_distance: f64,
    initial_scale: f64,
}

/// Which gestures are running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub dragging: Option<HotspotId>,
    pub resizing: Option<HotspotId>,
}

/// Drives drag and resize gestures against a [`HotspotStore`].
///
/// At most one drag and one resize run at a time, each bound to its own
/// pointer. Moves apply locally on every sample; drags persist once on
/// release, resizes persist every accepted scale.
pub struct InteractionController {
    store: HotspotStore,
    drag: Option<DragGesture>,
    resize: Option<ResizeGesture>,
}

impl InteractionController {
    pub fn new(store: HotspotStore) -> Self {
        Self {
            store,
            drag: None,
            resize: None,
        }
    }

    pub fn store(&self) -> &HotspotStore {
        &self.store
    }

    pub fn state(&self) -> InteractionState {
        InteractionState {
            dragging: self.drag.as_ref().map(|g| g.hotspot_id),
            resizing: self.resize.as_ref().map(|g| g.hotspot_id),
        }
    }

    /// Number of pointers currently captured. Zero once every gesture has
    /// ended or been cancelled.
    pub fn active_captures(&self) -> usize {
        usize::from(self.drag.is_some()) + usize::from(self.resize.is_some())
    }

    pub fn is_idle(&self) -> bool {
        self.active_captures() == 0
    }

    fn is_captured(&self, capture: PointerCapture) -> bool {
        self.drag.as_ref().is_some_and(|g| g.capture == capture)
            || self.resize.as_ref().is_some_and(|g| g.capture == capture)
    }

    // ---- drag ----

    pub fn begin_drag(&mut self, id: HotspotId, sample: PointerSample) -> Result<(), EngineError> {
        if self.drag.is_some() || self.is_captured(sample.capture()) {
            return Err(EngineError::GestureBusy(GestureKind::Drag));
        }
        let hotspot = self.store.get(id).ok_or(CoreError::NotFound {
            entity: "hotspot",
            id,
        })?;

        let (px, py) = self.store.frame().normalize(sample.x, sample.y);
        self.store.hold_position(id);
        self.drag = Some(DragGesture {
            hotspot_id: id,
            capture: sample.capture(),
            offset: (px - hotspot.x, py - hotspot.y),
        });
        tracing::debug!(hotspot_id = %id, source = ?sample.source, "Drag started");
        Ok(())
    }

    fn drag_to(&self, sample: &PointerSample) {
        let Some(drag) = &self.drag else {
            return;
        };
        let id = drag.hotspot_id;
        let Some(hotspot) = self.store.get(id) else {
            return;
        };

        let frame = self.store.frame();
        let (px, py) = frame.normalize(sample.x, sample.y);
        let target = frame.clamp(
            px - drag.offset.0,
            py - drag.offset.1,
            self.store.footprint(id),
        );
        if target.x == hotspot.x && target.y == hotspot.y {
            return;
        }
        if let Err(e) = self.store.update_position(id, target.x, target.y) {
            tracing::warn!(hotspot_id = %id, error = %e, "Drag move rejected");
        }
    }

    fn finish_drag(&mut self, outcome: GestureOutcome) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        // A cancelled drag keeps the position reached so far.
        self.store.release_position(drag.hotspot_id);
        tracing::debug!(hotspot_id = %drag.hotspot_id, ?outcome, "Drag ended");
        self.store.emit(
            EditorEventKind::GestureEnded {
                gesture: GestureKind::Drag,
                outcome,
            },
            Some(drag.hotspot_id),
        );
    }

    // ---- resize ----

    /// Start resizing `id` from a handle at `sample`. The scale follows the
    /// ratio of pointer-to-center distances.
    pub fn begin_resize(
        &mut self,
        id: HotspotId,
        sample: PointerSample,
    ) -> Result<(), EngineError> {
        if self.resize.is_some() || self.is_captured(sample.capture()) {
            return Err(EngineError::GestureBusy(GestureKind::Resize));
        }
        let hotspot = self.store.get(id).ok_or(CoreError::NotFound {
            entity: "hotspot",
            id,
        })?;

        let (cx, cy) = self.store.frame().to_pixels(hotspot.x, hotspot.y);
        let initial_distance = distance(sample.x, sample.y, cx, cy).max(MIN_RESIZE_DISTANCE_PX);
        self.resize = Some(ResizeGesture {
            hotspot_id: id,
            capture: sample.capture(),
            initial_distance,
            initial_scale: hotspot.scale,
        });
        tracing::debug!(hotspot_id = %id, initial_distance, "Resize started");
        Ok(())
    }

    fn resize_to(&self, sample: &PointerSample) {
        let Some(resize) = &self.resize else {
            return;
        };
        let id = resize.hotspot_id;
        let Some(hotspot) = self.store.get(id) else {
            return;
        };

        let frame = self.store.frame();
        let (cx, cy) = frame.to_pixels(hotspot.x, hotspot.y);
        let ratio = distance(sample.x, sample.y, cx, cy) / resize.initial_distance;
        let proposed = (resize.initial_scale * ratio).clamp(MIN_SCALE, MAX_SCALE);
        let scale = proposed.min(frame.max_scale(&hotspot)).max(MIN_SCALE);

        if (scale - hotspot.scale).abs() < SCALE_EPSILON {
            return;
        }
        if let Err(e) = self.store.update_scale(id, scale) {
            tracing::warn!(hotspot_id = %id, error = %e, "Resize rejected");
        }
    }

    fn finish_resize(&mut self, outcome: GestureOutcome) {
        let Some(resize) = self.resize.take() else {
            return;
        };
        tracing::debug!(hotspot_id = %resize.hotspot_id, ?outcome, "Resize ended");
        self.store.emit(
            EditorEventKind::GestureEnded {
                gesture: GestureKind::Resize,
                outcome,
            },
            Some(resize.hotspot_id),
        );
    }

    // ---- pointer routing ----

    /// Feed a move sample. Returns the gesture it was routed to, if any.
    pub fn pointer_move(&mut self, sample: PointerSample) -> Option<GestureKind> {
        let capture = sample.capture();
        if self.drag.as_ref().is_some_and(|g| g.capture == capture) {
            self.drag_to(&sample);
            return Some(GestureKind::Drag);
        }
        if self.resize.as_ref().is_some_and(|g| g.capture == capture) {
            self.resize_to(&sample);
            return Some(GestureKind::Resize);
        }
        None
    }

    /// Release a pointer, completing the gesture it drives.
    pub fn pointer_up(&mut self, sample: PointerSample) -> Result<GestureKind, EngineError> {
        let gesture = self
            .pointer_move(sample)
            .ok_or(EngineError::NoActiveGesture(sample.pointer_id))?;
        self.finish(gesture, GestureOutcome::Completed);
        Ok(gesture)
    }

    /// The platform cancelled a pointer (e.g. a touch was interrupted).
    pub fn pointer_cancel(&mut self, capture: PointerCapture) -> Result<GestureKind, EngineError> {
        let gesture = if self.drag.as_ref().is_some_and(|g| g.capture == capture) {
            GestureKind::Drag
        } else if self.resize.as_ref().is_some_and(|g| g.capture == capture) {
            GestureKind::Resize
        } else {
            return Err(EngineError::NoActiveGesture(capture.pointer_id));
        };
        self.finish(gesture, GestureOutcome::Cancelled);
        Ok(gesture)
    }

    /// Cancel everything and release held positions. Call before dropping
    /// the controller mid-gesture.
    pub fn cancel_all(&mut self) {
        self.finish(GestureKind::Drag, GestureOutcome::Cancelled);
        self.finish(GestureKind::Resize, GestureOutcome::Cancelled);
    }

    fn finish(&mut self, gesture: GestureKind, outcome: GestureOutcome) {
        match gesture {
            GestureKind::Drag => self.finish_drag(outcome),
            GestureKind::Resize => self.finish_resize(outcome),
        }
    }
}

fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    (ax - bx).hypot(ay - by)
}
