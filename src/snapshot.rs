//! Serializable layout snapshots and recorded input replay
//!
//! The command-line driver writes a [`LayoutSnapshot`] after running the
//! simulation headless. A [`ReplayScript`] feeds recorded platform events
//! and frame ticks through a [`GraphView`] exactly as a browser would.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{GraphResult, load_file};
use crate::graph::Diagnostic;
use crate::input::{InputEvent, PointerInput, Viewport};
use crate::view::{FrameDriver, GraphView};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationSnapshot {
    pub source: String,
    pub target: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// Node positions and relation segment transforms at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub frames: u64,
    pub elapsed: f64,
    pub kinetic_energy: f32,
    pub nodes: Vec<NodeSnapshot>,
    pub relations: Vec<RelationSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl LayoutSnapshot {
    pub fn capture(view: &GraphView, driver: &FrameDriver) -> Self {
        let sim = view.simulation();
        let name = |id: crate::graph::NodeId| {
            sim.graph()
                .node(id)
                .map(|n| n.name().to_string())
                .unwrap_or_default()
        };

        Self {
            frames: driver.frames(),
            elapsed: driver.elapsed(),
            kinetic_energy: sim.kinetic_energy(),
            nodes: sim
                .nodes()
                .iter()
                .map(|n| NodeSnapshot {
                    name: n.name().to_string(),
                    position: n.position,
                })
                .collect(),
            relations: sim
                .connections()
                .iter()
                .map(|c| RelationSnapshot {
                    source: name(c.source),
                    target: name(c.target),
                    position: c.handle.position,
                    rotation: c.handle.rotation,
                    scale: c.handle.scale,
                })
                .collect(),
            diagnostics: sim.graph().diagnostics().to_vec(),
        }
    }
}

fn default_cancelable() -> bool {
    true
}

/// One entry of a recorded session
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ReplayStep {
    /// Deliver a platform event
    Input {
        input: PointerInput,
        #[serde(default = "default_cancelable")]
        cancelable: bool,
    },
    /// Run this many frames
    Frames { count: u64 },
    /// The canvas moved or changed size
    Resize { viewport: Viewport },
}

/// Recorded session, stored as a YAML or JSON list of steps
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ReplayScript {
    pub steps: Vec<ReplayStep>,
}

/// What happened while replaying
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    /// Selection callbacks in order; `None` is a miss
    pub selections: Vec<Option<String>>,
    /// Events whose platform default was suppressed
    pub prevented: usize,
    pub events: usize,
}

impl ReplayScript {
    pub fn load(path: &Path) -> GraphResult<Self> {
        load_file(path)
    }

    /// Play the script against `view`, returning the observed callbacks
    ///
    /// Installs its own selection callback on the view.
    pub fn run(&self, view: GraphView, driver: &mut FrameDriver) -> (GraphView, ReplayReport) {
        let selections = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&selections);
        let mut view = view.with_selection_callback(move |spec| {
            sink.borrow_mut().push(spec.map(|s| s.name.clone()))
        });

        let mut report = ReplayReport::default();
        for step in &self.steps {
            match step {
                ReplayStep::Input { input, cancelable } => {
                    let mut event = InputEvent::new(input.clone()).with_cancelable(*cancelable);
                    if view.dispatch(&mut event) {
                        report.events += 1;
                        if event.default_prevented() {
                            report.prevented += 1;
                        }
                    }
                }
                ReplayStep::Frames { count } => {
                    driver.run(&mut view, *count);
                }
                ReplayStep::Resize { viewport } => view.resize(*viewport),
            }
        }

        report.selections = selections.borrow().clone();
        (view, report)
    }
}
