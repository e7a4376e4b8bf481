//! View configuration
//!
//! Every section defaults field by field, so a config file only needs the
//! values it changes:
//!
//! ```yaml
//! layout:
//!   repulsion: 20
//!   seed: 42
//! controls:
//!   max_zoom: 2.0
//! controls_kind: free_orbit
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::controls::{ControlsConfig, ControlsKind};
use crate::error::{GraphResult, load_file};
use crate::interaction::InteractionConfig;
use crate::simulation::LayoutConfig;

/// Complete configuration of a [`GraphView`](crate::view::GraphView)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub layout: LayoutConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub controls_kind: ControlsKind,
    pub interaction: InteractionConfig,
}

impl ViewConfig {
    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: &Path) -> GraphResult<Self> {
        load_file(path)
    }
}
