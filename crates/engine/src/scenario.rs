//! Scripted editing sessions for the `hotspot-replay` binary.
//!
//! A scenario is a JSON document with a list of steps. Steps address
//! hotspots by index: loaded hotspots first, then created ones in creation
//! order.
//!
//! ```json
//! { "steps": [
//!     { "op": "create", "x": 0.9, "y": 0.9, "time": 2.0 },
//!     { "op": "measure", "target": 0, "width": 180, "height": 72 },
//!     { "op": "drag", "target": 0, "to": [540, 960] },
//!     { "op": "resize", "target": 0, "from": [640, 960], "to": [700, 960] }
//! ] }
//! ```

use hotspot_core::error::CoreError;
use hotspot_core::geometry::Size;
use hotspot_core::hotspot::{Hotspot, HotspotPatch};
use hotspot_core::style::HotspotStyle;
use hotspot_core::types::{DbId, HotspotId};
use serde::Deserialize;

use crate::error::EngineError;
use crate::interaction::{InteractionController, PointerSample};
use crate::store::HotspotStore;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Create {
        x: f64,
        y: f64,
        #[serde(default)]
        time: f64,
    },
    Measure {
        target: usize,
        width: f64,
        height: f64,
    },
    /// Grab the hotspot at its center and release it at `to` (pixels).
    Drag {
        target: usize,
        to: [f64; 2],
        #[serde(default)]
        touch: bool,
    },
    Resize {
        target: usize,
        from: [f64; 2],
        to: [f64; 2],
    },
    Update {
        target: usize,
        #[serde(default)]
        time_start: Option<f64>,
        #[serde(default)]
        time_end: Option<f64>,
        #[serde(default)]
        style: Option<HotspotStyle>,
        #[serde(default)]
        product_id: Option<DbId>,
    },
    Select {
        target: Option<usize>,
    },
    Delete {
        target: usize,
    },
    Settle,
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("invalid scenario: {e}")))
    }
}

/// Play a scenario and return the final collection.
pub async fn run(scenario: &Scenario, store: &HotspotStore) -> Result<Vec<Hotspot>, EngineError> {
    let mut ids: Vec<HotspotId> = store.hotspots().iter().map(|h| h.id).collect();
    let mut controller = InteractionController::new(store.clone());

    for (index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!(step = index, ?step, "Replaying step");
        match step {
            Step::Create { x, y, time } => {
                ids.push(store.create(*x, *y, *time).id);
            }
            Step::Measure {
                target,
                width,
                height,
            } => {
                store.report_measurement(resolve(&ids, *target)?, Size::new(*width, *height));
            }
            Step::Drag { target, to, touch } => {
                let id = resolve(&ids, *target)?;
                let hotspot = store.get(id).ok_or(CoreError::NotFound {
                    entity: "hotspot",
                    id,
                })?;
                let (cx, cy) = store.frame().to_pixels(hotspot.x, hotspot.y);
                let sample = |x, y| {
                    if *touch {
                        PointerSample::touch(7, x, y)
                    } else {
                        PointerSample::mouse(x, y)
                    }
                };
                controller.begin_drag(id, sample(cx, cy))?;
                controller.pointer_move(sample(to[0], to[1]));
                controller.pointer_up(sample(to[0], to[1]))?;
            }
            Step::Resize { target, from, to } => {
                let id = resolve(&ids, *target)?;
                controller.begin_resize(id, PointerSample::mouse(from[0], from[1]))?;
                controller.pointer_move(PointerSample::mouse(to[0], to[1]));
                controller.pointer_up(PointerSample::mouse(to[0], to[1]))?;
            }
            Step::Update {
                target,
                time_start,
                time_end,
                style,
                product_id,
            } => {
                let patch = HotspotPatch {
                    time_start: *time_start,
                    time_end: *time_end,
                    style: *style,
                    product_id: product_id.map(Some),
                    ..HotspotPatch::default()
                };
                store.update(resolve(&ids, *target)?, patch)?;
            }
            Step::Select { target } => {
                let id = target.map(|t| resolve(&ids, t)).transpose()?;
                store.select(id)?;
            }
            Step::Delete { target } => {
                store.delete(resolve(&ids, *target)?).await?;
            }
            Step::Settle => store.settle().await,
        }
    }

    controller.cancel_all();
    store.settle().await;
    Ok(store.hotspots())
}

fn resolve(ids: &[HotspotId], target: usize) -> Result<HotspotId, CoreError> {
    ids.get(target).copied().ok_or_else(|| {
        CoreError::Validation(format!(
            "step targets hotspot #{target} but only {} exist",
            ids.len()
        ))
    })
}
