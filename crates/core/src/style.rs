//! Hotspot presentation styles and their nominal footprints.
//!
//! A style is a closed `(family, tone)` pair. The family decides how large
//! the overlay renders at `scale = 1.0`; the tone is purely cosmetic. The
//! wire format is the dash-joined name, e.g. `"card-dark"`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::Size;

// ---------------------------------------------------------------------------
// Style family
// ---------------------------------------------------------------------------

/// Layout family of a hotspot overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleFamily {
    /// Small pulsing marker with no text.
    Dot,
    /// Rounded label with the product name.
    Pill,
    /// Thumbnail card with name and optional price line.
    Card,
    /// Wide strip with call-to-action text.
    Banner,
}

/// All valid family strings.
const VALID_FAMILY_STRINGS: &[&str] = &["dot", "pill", "card", "banner"];

impl StyleFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Pill => "pill",
            Self::Card => "card",
            Self::Banner => "banner",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "dot" => Ok(Self::Dot),
            "pill" => Ok(Self::Pill),
            "card" => Ok(Self::Card),
            "banner" => Ok(Self::Banner),
            _ => Err(CoreError::Validation(format!(
                "Invalid style family '{name}'. Must be one of: {}",
                VALID_FAMILY_STRINGS.join(", ")
            ))),
        }
    }

    /// Rendered size in pixels at `scale = 1.0` without secondary content.
    pub fn nominal_footprint(self) -> Size {
        match self {
            Self::Dot => Size::new(44.0, 44.0),
            Self::Pill => Size::new(140.0, 40.0),
            Self::Card => Size::new(180.0, 72.0),
            Self::Banner => Size::new(260.0, 56.0),
        }
    }

    /// Extra height added by a secondary line (price, subtitle).
    ///
    /// Zero for families that never render one.
    pub fn secondary_height(self) -> f64 {
        match self {
            Self::Dot => 0.0,
            Self::Pill => 20.0,
            Self::Card => 28.0,
            Self::Banner => 24.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tone
// ---------------------------------------------------------------------------

/// Colour scheme applied on top of the family layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTone {
    Light,
    Dark,
    Brand,
}

impl StyleTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Brand => "brand",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "brand" => Ok(Self::Brand),
            _ => Err(CoreError::Validation(format!(
                "Invalid style tone '{name}'. Must be one of: light, dark, brand"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// HotspotStyle
// ---------------------------------------------------------------------------

/// Visual presentation of a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HotspotStyle {
    pub family: StyleFamily,
    pub tone: StyleTone,
}

impl HotspotStyle {
    pub const fn new(family: StyleFamily, tone: StyleTone) -> Self {
        Self { family, tone }
    }

    /// Parse a `family-tone` name. A bare family name defaults to the
    /// light tone.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        let (family, tone) = match name.split_once('-') {
            Some((family, tone)) => (family, StyleTone::from_name(tone)?),
            None => (name, StyleTone::Light),
        };
        Ok(Self::new(StyleFamily::from_name(family)?, tone))
    }

    /// Nominal (unscaled) footprint in pixels.
    pub fn footprint(&self, has_secondary_content: bool) -> Size {
        let base = self.family.nominal_footprint();
        if has_secondary_content {
            Size::new(base.width, base.height + self.family.secondary_height())
        } else {
            base
        }
    }
}

impl Default for HotspotStyle {
    fn default() -> Self {
        Self::new(StyleFamily::Pill, StyleTone::Light)
    }
}

impl fmt::Display for HotspotStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.family.as_str(), self.tone.as_str())
    }
}

impl TryFrom<String> for HotspotStyle {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<HotspotStyle> for String {
    fn from(value: HotspotStyle) -> Self {
        value.to_string()
    }
}
