//! Persistence wire format.
//!
//! Updates always carry the full [`HotspotPayload`]; the backend treats them
//! as whole-entity replacements and would null out any field left out of a
//! partial patch. Client-only fields (toolbar offset, revision) never appear
//! here.

use hotspot_core::hotspot::{
    ClickBehavior, CountdownSettings, Hotspot, HotspotPatch, DEFAULT_SCALE,
};
use hotspot_core::style::HotspotStyle;
use hotspot_core::types::{DbId, HotspotId};
use serde::{Deserialize, Serialize};

/// Every persisted field of a hotspot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotPayload {
    pub x: f64,
    pub y: f64,
    pub time_start: f64,
    pub time_end: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub product_id: Option<DbId>,
    #[serde(default)]
    pub style: HotspotStyle,
    #[serde(default)]
    pub click_behavior: ClickBehavior,
    #[serde(default)]
    pub countdown: CountdownSettings,
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

impl HotspotPayload {
    /// A patch that overwrites every persisted field with this payload.
    pub fn into_patch(self) -> HotspotPatch {
        HotspotPatch {
            x: Some(self.x),
            y: Some(self.y),
            time_start: Some(self.time_start),
            time_end: Some(self.time_end),
            scale: Some(self.scale),
            product_id: Some(self.product_id),
            style: Some(self.style),
            click_behavior: Some(self.click_behavior),
            countdown: Some(self.countdown),
            toolbar_offset: None,
        }
    }
}

impl From<&Hotspot> for HotspotPayload {
    fn from(h: &Hotspot) -> Self {
        Self {
            x: h.x,
            y: h.y,
            time_start: h.time_start,
            time_end: h.time_end,
            scale: h.scale,
            product_id: h.product_id,
            style: h.style,
            click_behavior: h.click_behavior.clone(),
            countdown: h.countdown.clone(),
        }
    }
}

/// A hotspot as returned by the backend: its server id plus the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerHotspot {
    pub id: DbId,
    #[serde(flatten)]
    pub fields: HotspotPayload,
}

impl ServerHotspot {
    /// Materialize as a confirmed client entity under a fresh client id.
    pub fn into_hotspot(self) -> Hotspot {
        let mut hotspot = Hotspot::new(HotspotId::new(), self.fields.x, self.fields.y, 0.0);
        hotspot.merge_patch(&self.fields.into_patch());
        hotspot.backend_id = Some(self.id);
        hotspot
    }
}

/// Editorial status of a container (the video the hotspots belong to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    Draft,
    Editing,
    Published,
}

/// Body of a container status transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: ContainerStatus,
    pub to: ContainerStatus,
}

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}
