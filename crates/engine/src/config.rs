use std::str::FromStr;
use std::time::Duration;

use hotspot_core::dimensions::DEFAULT_MEASURE_THRESHOLD_PX;
use hotspot_core::error::CoreError;
use hotspot_core::geometry::{SafeZoneProfile, Size};
use hotspot_core::types::DbId;

use crate::frame::CanvasFrame;

/// Engine configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against the
/// in-memory backend.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Backend base URL; `None` selects the in-memory backend.
    pub api_url: Option<String>,
    /// Bearer token sent to the backend.
    pub api_token: Option<String>,
    /// Container (video) whose hotspots are edited.
    pub container_id: DbId,
    pub safe_zone: SafeZoneProfile,
    /// Rendered video size in pixels.
    pub container_width: f64,
    pub container_height: f64,
    /// Measurement deltas at or below this are treated as layout jitter.
    pub measure_threshold_px: f64,
    /// Footprint assumed for overlays that have not been measured yet.
    pub fallback_footprint: Size,
    pub request_timeout: Duration,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default     |
    /// |--------------------------------|-------------|
    /// | `HOTSPOT_API_URL`              | unset       |
    /// | `HOTSPOT_API_TOKEN`            | unset       |
    /// | `HOTSPOT_CONTAINER_ID`         | `1`         |
    /// | `HOTSPOT_SAFE_ZONE`            | `standard`  |
    /// | `HOTSPOT_CONTAINER_WIDTH`      | `1080`      |
    /// | `HOTSPOT_CONTAINER_HEIGHT`     | `1920`      |
    /// | `HOTSPOT_MEASURE_THRESHOLD_PX` | `2`         |
    /// | `HOTSPOT_FALLBACK_WIDTH_PX`    | `120`       |
    /// | `HOTSPOT_FALLBACK_HEIGHT_PX`   | `120`       |
    /// | `HOTSPOT_REQUEST_TIMEOUT_SECS` | `15`        |
    pub fn from_env() -> Result<Self, CoreError> {
        let defaults = Self::default();

        let api_url = optional_var("HOTSPOT_API_URL");
        let api_token = optional_var("HOTSPOT_API_TOKEN");
        let container_id: DbId = parse_var("HOTSPOT_CONTAINER_ID", defaults.container_id)?;

        let safe_zone = match optional_var("HOTSPOT_SAFE_ZONE") {
            Some(name) => SafeZoneProfile::from_name(&name)?,
            None => defaults.safe_zone,
        };

        let container_width = parse_var("HOTSPOT_CONTAINER_WIDTH", defaults.container_width)?;
        let container_height = parse_var("HOTSPOT_CONTAINER_HEIGHT", defaults.container_height)?;
        let measure_threshold_px =
            parse_var("HOTSPOT_MEASURE_THRESHOLD_PX", defaults.measure_threshold_px)?;
        let fallback_footprint = Size::new(
            parse_var("HOTSPOT_FALLBACK_WIDTH_PX", defaults.fallback_footprint.width)?,
            parse_var("HOTSPOT_FALLBACK_HEIGHT_PX", defaults.fallback_footprint.height)?,
        );
        let timeout_secs: u64 = parse_var(
            "HOTSPOT_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        )?;

        let config = Self {
            api_url,
            api_token,
            container_id,
            safe_zone,
            container_width,
            container_height,
            measure_threshold_px,
            fallback_footprint,
            request_timeout: Duration::from_secs(timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.frame().validate()?;
        if !self.measure_threshold_px.is_finite() || self.measure_threshold_px < 0.0 {
            return Err(CoreError::Validation(format!(
                "measure threshold must be a non-negative number, got {}",
                self.measure_threshold_px
            )));
        }
        let Size { width, height } = self.fallback_footprint;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CoreError::Validation(format!(
                "fallback footprint must be positive, got {width}x{height}"
            )));
        }
        Ok(())
    }

    pub fn frame(&self) -> CanvasFrame {
        CanvasFrame::new(self.container_width, self.container_height, self.safe_zone)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_token: None,
            container_id: 1,
            safe_zone: SafeZoneProfile::STANDARD,
            container_width: 1080.0,
            container_height: 1920.0,
            measure_threshold_px: DEFAULT_MEASURE_THRESHOLD_PX,
            fallback_footprint: Size::new(120.0, 120.0),
            request_timeout: Duration::from_secs(15),
        }
    }
}

fn optional_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, CoreError> {
    match optional_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| CoreError::Validation(format!("{key} has an invalid value: '{raw}'"))),
        None => Ok(default),
    }
}
