//! The hotspot entity and partial updates against it.
//!
//! A [`Hotspot`] is a positioned, time-bounded overlay linked to a product.
//! Mutations arrive as [`HotspotPatch`]es; applying one validates the result,
//! merges it and bumps `revision` unless only client-only fields changed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::style::HotspotStyle;
use crate::types::{DbId, HotspotId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest allowed scale multiplier.
pub const MIN_SCALE: f64 = 0.5;

/// Largest allowed scale multiplier.
pub const MAX_SCALE: f64 = 2.0;

/// Scale assigned to newly created hotspots.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Visible duration assigned to newly created hotspots (seconds).
pub const DEFAULT_DURATION_SECS: f64 = 5.0;

/// Latest start time accepted for a new hotspot (seconds). Far beyond any
/// real video, and small enough that adding a duration stays exact.
pub const MAX_START_SECS: f64 = 1.0e9;

/// Clamp a scale into `[MIN_SCALE, MAX_SCALE]`.
///
/// Returns `None` for NaN, which has no meaningful nearest bound.
pub fn clamp_scale(scale: f64) -> Option<f64> {
    if scale.is_nan() {
        None
    } else {
        Some(scale.clamp(MIN_SCALE, MAX_SCALE))
    }
}

// ---------------------------------------------------------------------------
// Opaque presentation settings
// ---------------------------------------------------------------------------

/// What happens when a viewer taps the hotspot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClickBehavior {
    #[default]
    OpenProduct,
    AddToCart,
    ExternalLink {
        url: String,
    },
    None,
}

/// Countdown badge shown while the hotspot is visible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CountdownSettings {
    pub enabled: bool,
    /// Optional label rendered next to the remaining time.
    pub label: Option<String>,
}

/// Local-only placement of the floating edit toolbar, relative to the
/// overlay center in pixels. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolbarOffset {
    pub dx: f64,
    pub dy: f64,
}

// ---------------------------------------------------------------------------
// Hotspot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub id: HotspotId,
    /// Server identity; `None` until the create call resolves.
    pub backend_id: Option<DbId>,
    pub x: f64,
    pub y: f64,
    pub time_start: f64,
    pub time_end: f64,
    pub scale: f64,
    pub product_id: Option<DbId>,
    pub style: HotspotStyle,
    pub click_behavior: ClickBehavior,
    pub countdown: CountdownSettings,
    pub revision: u64,
    pub toolbar_offset: Option<ToolbarOffset>,
}

impl Hotspot {
    /// A fresh local hotspot with default presentation, visible from `time`
    /// for [`DEFAULT_DURATION_SECS`]. `time` is coerced into
    /// `[0, MAX_START_SECS]`.
    pub fn new(id: HotspotId, x: f64, y: f64, time: f64) -> Self {
        let time_start = if time.is_finite() {
            time.clamp(0.0, MAX_START_SECS)
        } else {
            0.0
        };
        Self {
            id,
            backend_id: None,
            x: coerce_unit(x),
            y: coerce_unit(y),
            time_start,
            time_end: time_start + DEFAULT_DURATION_SECS,
            scale: DEFAULT_SCALE,
            product_id: None,
            style: HotspotStyle::default(),
            click_behavior: ClickBehavior::default(),
            countdown: CountdownSettings::default(),
            revision: 0,
            toolbar_offset: None,
        }
    }

    /// Whether the backend has acknowledged this hotspot.
    pub fn is_confirmed(&self) -> bool {
        self.backend_id.is_some()
    }

    /// Whether the overlay renders a secondary line (the linked product's
    /// price) under its label.
    pub fn has_secondary_content(&self) -> bool {
        self.product_id.is_some() && self.style.family.secondary_height() > 0.0
    }

    /// Whether the hotspot is visible at `time` (seconds).
    pub fn is_active_at(&self, time: f64) -> bool {
        time >= self.time_start && time < self.time_end
    }

    /// Validate and apply a patch.
    ///
    /// Returns `true` when `revision` was bumped, i.e. the patch touched at
    /// least one persisted field. The hotspot is left untouched on error.
    pub fn apply(&mut self, patch: &HotspotPatch) -> Result<bool, CoreError> {
        if patch.scale.is_some_and(f64::is_nan) {
            return Err(CoreError::Validation("scale must be a number".to_string()));
        }

        let mut next = self.clone();
        next.merge_patch(patch);
        next.validate()?;

        let bump = patch.touches_persisted_fields();
        if bump {
            next.revision = self.revision + 1;
        }
        *self = next;
        Ok(bump)
    }

    /// Overwrite fields present in `patch` without validation or revision
    /// bookkeeping. Positions and scale are still coerced into range.
    pub fn merge_patch(&mut self, patch: &HotspotPatch) {
        if let Some(x) = patch.x {
            self.x = coerce_unit(x);
        }
        if let Some(y) = patch.y {
            self.y = coerce_unit(y);
        }
        if let Some(time_start) = patch.time_start {
            self.time_start = time_start;
        }
        if let Some(time_end) = patch.time_end {
            self.time_end = time_end;
        }
        if let Some(scale) = patch.scale.and_then(clamp_scale) {
            self.scale = scale;
        }
        if let Some(product_id) = patch.product_id {
            self.product_id = product_id;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }
        if let Some(click_behavior) = &patch.click_behavior {
            self.click_behavior = click_behavior.clone();
        }
        if let Some(countdown) = &patch.countdown {
            self.countdown = countdown.clone();
        }
        if let Some(toolbar_offset) = patch.toolbar_offset {
            self.toolbar_offset = toolbar_offset;
        }
    }

    /// Check the entity invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(CoreError::Validation(
                "hotspot position must be finite".to_string(),
            ));
        }
        if !self.time_start.is_finite() || !self.time_end.is_finite() {
            return Err(CoreError::Validation(
                "hotspot time range must be finite".to_string(),
            ));
        }
        if self.time_start < 0.0 {
            return Err(CoreError::Validation(format!(
                "time_start must not be negative, got {}",
                self.time_start
            )));
        }
        if self.time_end <= self.time_start {
            return Err(CoreError::Validation(format!(
                "time_end ({}) must be greater than time_start ({})",
                self.time_end, self.time_start
            )));
        }
        if !(MIN_SCALE..=MAX_SCALE).contains(&self.scale) {
            return Err(CoreError::Validation(format!(
                "scale must be between {MIN_SCALE} and {MAX_SCALE}, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    /// A patch carrying every persisted field of this hotspot.
    pub fn to_full_patch(&self) -> HotspotPatch {
        HotspotPatch {
            x: Some(self.x),
            y: Some(self.y),
            time_start: Some(self.time_start),
            time_end: Some(self.time_end),
            scale: Some(self.scale),
            product_id: Some(self.product_id),
            style: Some(self.style),
            click_behavior: Some(self.click_behavior.clone()),
            countdown: Some(self.countdown.clone()),
            toolbar_offset: None,
        }
    }
}

/// Keep NaN as-is so validation rejects it; clamp everything else.
fn coerce_unit(value: f64) -> f64 {
    if value.is_nan() {
        value
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// HotspotPatch
// ---------------------------------------------------------------------------

/// A partial update. `None` leaves a field alone; nullable fields use a
/// nested `Option` so they can be explicitly cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotspotPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub time_start: Option<f64>,
    pub time_end: Option<f64>,
    pub scale: Option<f64>,
    pub product_id: Option<Option<DbId>>,
    pub style: Option<HotspotStyle>,
    pub click_behavior: Option<ClickBehavior>,
    pub countdown: Option<CountdownSettings>,
    pub toolbar_offset: Option<Option<ToolbarOffset>>,
}

impl HotspotPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn time_range(time_start: f64, time_end: f64) -> Self {
        Self {
            time_start: Some(time_start),
            time_end: Some(time_end),
            ..Self::default()
        }
    }

    pub fn toolbar_offset(offset: Option<ToolbarOffset>) -> Self {
        Self {
            toolbar_offset: Some(offset),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether any field that is sent to the backend is present.
    pub fn touches_persisted_fields(&self) -> bool {
        let client_only = Self {
            toolbar_offset: self.toolbar_offset,
            ..Self::default()
        };
        self != &client_only
    }

    /// Fold a later patch into this one; fields present in `later` win.
    pub fn merge(&mut self, later: HotspotPatch) {
        fn take<T>(slot: &mut Option<T>, later: Option<T>) {
            if later.is_some() {
                *slot = later;
            }
        }

        take(&mut self.x, later.x);
        take(&mut self.y, later.y);
        take(&mut self.time_start, later.time_start);
        take(&mut self.time_end, later.time_end);
        take(&mut self.scale, later.scale);
        take(&mut self.product_id, later.product_id);
        take(&mut self.style, later.style);
        take(&mut self.click_behavior, later.click_behavior);
        take(&mut self.countdown, later.countdown);
        take(&mut self.toolbar_offset, later.toolbar_offset);
    }

    /// Drop client-only fields, keeping what the backend cares about.
    pub fn persisted_only(mut self) -> Self {
        self.toolbar_offset = None;
        self
    }
}
