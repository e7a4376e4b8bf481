//! Embedding facade and frame driver
//!
//! [`GraphView`] wires the layout simulation, camera, controller and
//! interaction coordinator together. The embedding application feeds it
//! platform events through [`GraphView::dispatch`] and drives it with a
//! [`FrameDriver`] (or its own loop calling [`GraphView::frame`]). After
//! [`GraphView::dispose`] nothing reaches the core anymore.

use tracing::{debug, info};

use crate::camera::Camera;
use crate::config::ViewConfig;
use crate::controls::ViewControls;
use crate::graph::{Graph, GraphSpec, NodeSpec};
use crate::input::{InputEvent, Viewport};
use crate::interaction::{InteractionContext, InteractionManager, MaterialTable, NodeMaterials};
use crate::simulation::Simulation;

/// Callback receiving the picked node's declaration, or `None` on a miss
pub type SelectionCallback = Box<dyn FnMut(Option<&NodeSpec>)>;

/// Interactive force-directed graph
pub struct GraphView {
    simulation: Simulation,
    camera: Camera,
    controls: Box<dyn ViewControls>,
    interaction: InteractionManager,
    materials: Box<dyn NodeMaterials>,
    on_select: SelectionCallback,
    disposed: bool,
}

impl GraphView {
    /// Build the graph, simulation and controllers for a canvas
    pub fn new(spec: &GraphSpec, config: &ViewConfig, viewport: Viewport) -> Self {
        let graph = Graph::build(spec, config.layout.initial_radius);
        let simulation = Simulation::from_graph(graph, config.layout.clone());
        let mut camera = Camera::new(&config.camera, viewport.aspect());
        camera.set_zoom(config.controls.clamp_zoom(camera.zoom()));
        let controls = config.controls_kind.build(config.controls.clone());
        let interaction =
            InteractionManager::for_nodes(viewport, &simulation, config.interaction.clone());
        let materials = Box::new(MaterialTable::new(simulation.nodes().len()));

        info!(
            nodes = simulation.nodes().len(),
            relations = simulation.connections().len(),
            dropped = simulation.graph().diagnostics().len(),
            "graph view ready"
        );

        Self {
            simulation,
            camera,
            controls,
            interaction,
            materials,
            on_select: Box::new(|_| {}),
            disposed: false,
        }
    }

    pub fn with_selection_callback(
        mut self,
        callback: impl FnMut(Option<&NodeSpec>) + 'static,
    ) -> Self {
        self.on_select = Box::new(callback);
        self
    }

    /// Replace the built-in material table with the render layer's materials
    pub fn with_materials(mut self, materials: Box<dyn NodeMaterials>) -> Self {
        self.materials = materials;
        self
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls(&self) -> &dyn ViewControls {
        self.controls.as_ref()
    }

    pub fn interaction(&self) -> &InteractionManager {
        &self.interaction
    }

    pub fn materials(&self) -> &dyn NodeMaterials {
        self.materials.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Deliver one platform event; returns `false` once disposed
    ///
    /// The controller sees events before the picking coordinator, the order
    /// their platform listeners were registered in. Multi-touch events go
    /// the other way round so a node drag is released before the pinch
    /// starts.
    pub fn dispatch(&mut self, event: &mut InputEvent) -> bool {
        if self.disposed {
            return false;
        }

        if event.input.contact_count() > 1 {
            self.dispatch_interaction(event);
            self.controls.handle_event(&mut self.camera, event);
        } else {
            self.controls.handle_event(&mut self.camera, event);
            self.dispatch_interaction(event);
        }
        true
    }

    fn dispatch_interaction(&mut self, event: &mut InputEvent) {
        let mut ctx = InteractionContext {
            camera: &self.camera,
            simulation: &mut self.simulation,
            controls: self.controls.as_mut(),
            materials: self.materials.as_mut(),
            on_select: &mut self.on_select,
        };
        self.interaction.handle_event(event, &mut ctx);
    }

    /// Advance one frame: camera inertia first, then the layout
    pub fn frame(&mut self, delta: f32) -> bool {
        if self.disposed {
            return false;
        }
        self.controls.update(&mut self.camera, delta);
        self.simulation.update(delta);
        true
    }

    /// React to the canvas moving or changing size
    pub fn resize(&mut self, viewport: Viewport) {
        if self.disposed {
            return;
        }
        self.camera.resize(viewport.width, viewport.height);
        self.interaction.set_viewport(viewport);
    }

    /// Tear down; idempotent
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.controls.dispose();
        self.simulation.reset();
        self.on_select = Box::new(|_| {});
        self.disposed = true;
        debug!("graph view disposed");
    }
}

/// Fixed-step scheduler standing in for the platform's animation frames
#[derive(Debug, Clone)]
pub struct FrameDriver {
    step: f32,
    elapsed: f64,
    frames: u64,
}

impl FrameDriver {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            elapsed: 0.0,
            frames: 0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Total simulated time
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame; returns `false` and does nothing once the view is disposed
    pub fn tick(&mut self, view: &mut GraphView) -> bool {
        if !view.frame(self.step) {
            return false;
        }
        self.elapsed += f64::from(self.step);
        self.frames += 1;
        true
    }

    /// Run up to `frames` frames, returning how many ran
    pub fn run(&mut self, view: &mut GraphView, frames: u64) -> u64 {
        let mut ran = 0;
        while ran < frames && self.tick(view) {
            ran += 1;
        }
        ran
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
