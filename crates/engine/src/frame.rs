//! The rendered video frame overlays are positioned in.

use hotspot_core::error::CoreError;
use hotspot_core::geometry::{self, Clamped, SafeZoneProfile, Size};
use hotspot_core::hotspot::Hotspot;

/// Pixel size of the video plus the safe-zone profile applied to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasFrame {
    pub width: f64,
    pub height: f64,
    pub profile: SafeZoneProfile,
}

impl CanvasFrame {
    pub fn new(width: f64, height: f64, profile: SafeZoneProfile) -> Self {
        Self {
            width,
            height,
            profile,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(CoreError::Validation(format!(
                "container size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        self.profile.validate()
    }

    /// Pixel coordinates inside the frame to normalized `[0,1]` coordinates.
    pub fn normalize(&self, px: f64, py: f64) -> (f64, f64) {
        let x = if self.width > 0.0 { px / self.width } else { 0.0 };
        let y = if self.height > 0.0 { py / self.height } else { 0.0 };
        (x, y)
    }

    pub fn to_pixels(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.width, y * self.height)
    }

    /// Clamp a center so a rectangle of `size` pixels stays in the safe zone.
    pub fn clamp(&self, x: f64, y: f64, size: Size) -> Clamped {
        geometry::clamp(
            x,
            y,
            size.width,
            size.height,
            self.width,
            self.height,
            &self.profile,
        )
    }

    /// Largest scale the hotspot's nominal footprint can take at its center.
    pub fn max_scale(&self, hotspot: &Hotspot) -> f64 {
        geometry::max_scale_in_safe_zone(
            hotspot.x,
            hotspot.y,
            &hotspot.style,
            hotspot.has_secondary_content(),
            self.width,
            self.height,
            &self.profile,
        )
    }
}
