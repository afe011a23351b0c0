//! Safe-zone geometry solver.
//!
//! All positions are normalized to the video frame (`0.0..=1.0` on both
//! axes). Sizes are in pixels and are converted to normalized extents using
//! the container dimensions.
//!
//! Clamping always works on the *measured* on-screen size of an overlay,
//! which already includes its `scale`. Only [`max_scale_in_safe_zone`] deals
//! with nominal (unscaled) footprints.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hotspot::MAX_SCALE;
use crate::style::HotspotStyle;

/// Tolerance used by [`is_point_in_safe_zone`] to absorb float rounding on
/// edges produced by [`clamp`].
pub const EDGE_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// ---------------------------------------------------------------------------
// Safe-zone profiles
// ---------------------------------------------------------------------------

/// Margins reserved on each edge of the container, as fractions of the
/// container size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZoneProfile {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// All valid profile names.
const VALID_PROFILE_NAMES: &[&str] = &["none", "standard", "vertical_social", "broadcast"];

impl SafeZoneProfile {
    /// The whole frame is usable.
    pub const NONE: Self = Self::uniform(0.0);

    /// Small uniform margin for general players.
    pub const STANDARD: Self = Self::uniform(0.05);

    /// Vertical short-form feeds: platform chrome on the right and bottom.
    pub const VERTICAL_SOCIAL: Self = Self {
        top: 0.08,
        right: 0.12,
        bottom: 0.12,
        left: 0.05,
    };

    /// Broadcast title-safe area.
    pub const BROADCAST: Self = Self::uniform(0.10);

    pub const fn uniform(margin: f64) -> Self {
        Self {
            top: margin,
            right: margin,
            bottom: margin,
            left: margin,
        }
    }

    /// Resolve a named profile.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "none" => Ok(Self::NONE),
            "standard" => Ok(Self::STANDARD),
            "vertical_social" => Ok(Self::VERTICAL_SOCIAL),
            "broadcast" => Ok(Self::BROADCAST),
            _ => Err(CoreError::Validation(format!(
                "Unknown safe zone profile '{name}'. Must be one of: {}",
                VALID_PROFILE_NAMES.join(", ")
            ))),
        }
    }

    /// Margins must be finite, non-negative and leave a non-empty region.
    pub fn validate(&self) -> Result<(), CoreError> {
        let margins = [self.top, self.right, self.bottom, self.left];
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(CoreError::Validation(
                "safe zone margins must be finite and non-negative".to_string(),
            ));
        }
        if self.left + self.right >= 1.0 || self.top + self.bottom >= 1.0 {
            return Err(CoreError::Validation(format!(
                "safe zone margins leave no usable area: {self:?}"
            )));
        }
        Ok(())
    }

    fn x_bounds(&self) -> (f64, f64) {
        (self.left, 1.0 - self.right)
    }

    fn y_bounds(&self) -> (f64, f64) {
        (self.top, 1.0 - self.bottom)
    }
}

impl Default for SafeZoneProfile {
    fn default() -> Self {
        Self::STANDARD
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Result of [`clamp`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    pub x: f64,
    pub y: f64,
    /// `true` iff the center had to be translated.
    pub was_constrained: bool,
}

/// Whether a normalized point lies inside the permitted region.
pub fn is_point_in_safe_zone(x: f64, y: f64, profile: &SafeZoneProfile) -> bool {
    let (min_x, max_x) = profile.x_bounds();
    let (min_y, max_y) = profile.y_bounds();
    x >= min_x - EDGE_TOLERANCE
        && x <= max_x + EDGE_TOLERANCE
        && y >= min_y - EDGE_TOLERANCE
        && y <= max_y + EDGE_TOLERANCE
}

/// Translate a rectangle's center by the minimum amount needed to keep the
/// whole rectangle inside the safe zone.
///
/// `width`/`height` are the measured pixel size of the rectangle. A
/// rectangle larger than the zone on some axis is centered in the zone on
/// that axis. Non-finite centers are treated the same way, and an axis
/// whose margins are not finite is bounded by the frame itself.
pub fn clamp(
    cx: f64,
    cy: f64,
    width: f64,
    height: f64,
    container_width: f64,
    container_height: f64,
    profile: &SafeZoneProfile,
) -> Clamped {
    let half_w = half_extent(width, container_width);
    let half_h = half_extent(height, container_height);

    let x = clamp_axis(cx, half_w, profile.x_bounds());
    let y = clamp_axis(cy, half_h, profile.y_bounds());

    Clamped {
        x,
        y,
        was_constrained: x != cx || y != cy,
    }
}

/// Largest scale at which the nominal footprint of `style` centered at
/// `(cx, cy)` stays inside the safe zone.
///
/// Never exceeds [`MAX_SCALE`]; returns `0.0` when the center itself lies
/// outside the zone.
pub fn max_scale_in_safe_zone(
    cx: f64,
    cy: f64,
    style: &HotspotStyle,
    has_secondary_content: bool,
    container_width: f64,
    container_height: f64,
    profile: &SafeZoneProfile,
) -> f64 {
    if !cx.is_finite() || !cy.is_finite() {
        return 0.0;
    }

    let footprint = style.footprint(has_secondary_content);
    let half_w = half_extent(footprint.width, container_width);
    let half_h = half_extent(footprint.height, container_height);
    let (min_x, max_x) = profile.x_bounds();
    let (min_y, max_y) = profile.y_bounds();

    let limits = [
        (cx - min_x, half_w),
        (max_x - cx, half_w),
        (cy - min_y, half_h),
        (max_y - cy, half_h),
    ];

    limits
        .iter()
        .filter(|(_, half)| *half > 0.0)
        .map(|(room, half)| room / half)
        .fold(MAX_SCALE, f64::min)
        .max(0.0)
}

/// Half of a pixel length, normalized by the container length.
fn half_extent(length: f64, container: f64) -> f64 {
    if !length.is_finite() || !container.is_finite() || length <= 0.0 || container <= 0.0 {
        return 0.0;
    }
    length / container / 2.0
}

/// A non-finite margin falls back to the full frame on that axis.
fn clamp_axis(center: f64, half: f64, (lo, hi): (f64, f64)) -> f64 {
    let (lo, hi) = if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 1.0)
    };
    let min = lo + half;
    let max = hi - half;
    if min > max || !center.is_finite() {
        return (lo + hi) / 2.0;
    }
    center.clamp(min, max)
}
