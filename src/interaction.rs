//! Picking and node dragging
//!
//! Pointer-down casts a ray from the camera through the pointer and grabs
//! the nearest node it hits. While a node is held the camera controller is
//! disabled and every pointer move is projected onto a plane through the
//! node facing the camera; the projected point (plus the initial grab
//! offset) becomes the node's drag target in the layout simulation.
//!
//! Selection outlives the drag: the picked node stays highlighted until the
//! next pick, hit or miss.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::Camera;
use crate::controls::ViewControls;
use crate::geometry::{PickShape, Plane};
use crate::graph::{NodeId, NodeSpec};
use crate::input::{InputEvent, PointerInput, Viewport};
use crate::simulation::{SegmentHandle, Simulation};

/// Emissive color (linear RGB) and intensity of a node's material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emissive {
    pub color: Vec3,
    pub intensity: f32,
}

impl Emissive {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Emissive from hue, saturation and lightness, all in `[0, 1]`
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32, intensity: f32) -> Self {
        let hue = hue.rem_euclid(1.0);
        let q = if lightness <= 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let p = 2.0 * lightness - q;
        let color = Vec3::new(
            hue_to_rgb(p, q, hue + 1.0 / 3.0),
            hue_to_rgb(p, q, hue),
            hue_to_rgb(p, q, hue - 1.0 / 3.0),
        );
        Self { color, intensity }
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Access to the emissive state the render layer keeps per node
pub trait NodeMaterials {
    /// Current emissive values, or `None` if the node's material has none
    fn emissive(&self, node: NodeId) -> Option<Emissive>;

    fn set_emissive(&mut self, node: NodeId, emissive: Emissive);
}

/// In-memory materials, one emissive entry per node
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    entries: Vec<Emissive>,
}

impl MaterialTable {
    /// Dark blue glow every node material starts with
    pub const BASE: Emissive = Emissive {
        color: Vec3::new(0.0, 0x11 as f32 / 255.0, 0x33 as f32 / 255.0),
        intensity: 1.0,
    };

    pub fn new(nodes: usize) -> Self {
        Self {
            entries: vec![Self::BASE; nodes],
        }
    }
}

impl NodeMaterials for MaterialTable {
    fn emissive(&self, node: NodeId) -> Option<Emissive> {
        self.entries.get(node.index()).copied()
    }

    fn set_emissive(&mut self, node: NodeId, emissive: Emissive) {
        if let Some(entry) = self.entries.get_mut(node.index()) {
            *entry = emissive;
        }
    }
}

/// Settings for picking and highlighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Emissive applied to the selected node
    pub highlight: Emissive,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            highlight: Emissive::from_hsl(0.0, 0.5, 1.0, 2.5),
        }
    }
}

/// Everything the coordinator reads or drives while handling an event
pub struct InteractionContext<'a, H: SegmentHandle> {
    pub camera: &'a Camera,
    pub simulation: &'a mut Simulation<H>,
    pub controls: &'a mut dyn ViewControls,
    pub materials: &'a mut dyn NodeMaterials,
    /// Receives the picked node's declaration, or `None` on a miss
    pub on_select: &'a mut dyn FnMut(Option<&NodeSpec>),
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    node: NodeId,
    plane: Plane,
    /// Node position minus the grab point on the drag plane
    offset: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    node: NodeId,
    saved: Option<Emissive>,
}

/// Turns pointer sequences into node picks and drags
#[derive(Debug, Clone)]
pub struct InteractionManager {
    viewport: Viewport,
    shapes: Vec<PickShape>,
    config: InteractionConfig,
    drag: Option<DragState>,
    selection: Option<Selection>,
}

impl InteractionManager {
    /// Create a coordinator picking against one shape per node, by node index
    pub fn new(viewport: Viewport, shapes: Vec<PickShape>, config: InteractionConfig) -> Self {
        Self {
            viewport,
            shapes,
            config,
            drag: None,
            selection: None,
        }
    }

    /// Coordinator with a cube sized from each node's declared size
    pub fn for_nodes<H: SegmentHandle>(
        viewport: Viewport,
        simulation: &Simulation<H>,
        config: InteractionConfig,
    ) -> Self {
        let shapes = simulation
            .nodes()
            .iter()
            .map(|node| PickShape::for_node_size(node.spec.size))
            .collect();
        Self::new(viewport, shapes, config)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Node currently held by the pointer
    pub fn dragged(&self) -> Option<NodeId> {
        self.drag.map(|d| d.node)
    }

    /// Node currently highlighted
    pub fn selected(&self) -> Option<NodeId> {
        self.selection.map(|s| s.node)
    }

    /// Nearest node under a point in normalized device coordinates
    pub fn pick<H: SegmentHandle>(
        &self,
        ndc: Vec2,
        camera: &Camera,
        simulation: &Simulation<H>,
    ) -> Option<NodeId> {
        let ray = camera.ray_from_ndc(ndc);

        simulation
            .nodes()
            .iter()
            .zip(&self.shapes)
            .filter_map(|(node, shape)| shape.intersect(&ray, node.position).map(|t| (node.id, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Process one platform event
    pub fn handle_event<H: SegmentHandle>(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let input = event.input.clone();
        match input {
            PointerInput::MouseDown { position } => {
                self.pointer_down(position, ctx);
            }
            PointerInput::MouseMove { position } => self.pointer_move(position, ctx),
            PointerInput::MouseUp | PointerInput::TouchEnd { .. } => self.pointer_up(ctx),
            PointerInput::TouchStart { touches } => {
                // A second finger means pinch, which beats node dragging
                if touches.len() > 1 {
                    self.pointer_up(ctx);
                    return;
                }
                if let Some(&touch) = touches.first() {
                    if self.pointer_down(touch, ctx) {
                        event.prevent_default_if_cancelable();
                    }
                }
            }
            PointerInput::TouchMove { touches } => {
                if touches.len() > 1 {
                    self.pointer_up(ctx);
                    return;
                }
                if let (Some(_), Some(&touch)) = (self.drag, touches.first()) {
                    event.prevent_default_if_cancelable();
                    self.pointer_move(touch, ctx);
                }
            }
            PointerInput::Wheel { .. } => {}
        }
    }

    /// Pick under `client`; returns whether a node was grabbed
    fn pointer_down<H: SegmentHandle>(
        &mut self,
        client: Vec2,
        ctx: &mut InteractionContext<'_, H>,
    ) -> bool {
        let ndc = self.viewport.to_ndc(client);
        let Some(node) = self.pick(ndc, ctx.camera, ctx.simulation) else {
            debug!(?ndc, "pick missed");
            self.reset_selection(ctx.materials);
            (ctx.on_select)(None);
            return false;
        };
        let Some(position) = ctx.simulation.position(node) else {
            return false;
        };

        if let Some(previous) = self.drag.take() {
            ctx.simulation.release(previous.node);
        }

        ctx.controls.set_enabled(false);

        let ray = ctx.camera.ray_from_ndc(ndc);
        let plane = Plane::from_normal_and_point(ctx.camera.view_direction(), position);
        let offset = ray
            .intersect_plane(&plane)
            .map(|t| position - ray.at(t))
            .unwrap_or(Vec3::ZERO);

        ctx.simulation.drag_to(node, position);
        self.drag = Some(DragState {
            node,
            plane,
            offset,
        });
        debug!(%node, ?offset, "node grabbed");

        if self.selected() != Some(node) {
            self.reset_selection(ctx.materials);
            self.highlight(node, ctx.materials);
            let spec = ctx.simulation.graph().node(node).map(|n| &n.spec);
            (ctx.on_select)(spec);
        }
        true
    }

    fn pointer_move<H: SegmentHandle>(
        &mut self,
        client: Vec2,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let Some(drag) = self.drag else {
            return;
        };

        let ray = ctx.camera.ray_from_ndc(self.viewport.to_ndc(client));
        if let Some(t) = ray.intersect_plane(&drag.plane) {
            ctx.simulation.drag_to(drag.node, ray.at(t) + drag.offset);
        }
    }

    fn pointer_up<H: SegmentHandle>(&mut self, ctx: &mut InteractionContext<'_, H>) {
        if let Some(drag) = self.drag.take() {
            ctx.simulation.release(drag.node);
            ctx.controls.set_enabled(true);
            debug!(node = %drag.node, "node released");
        }
    }

    fn highlight(&mut self, node: NodeId, materials: &mut dyn NodeMaterials) {
        let saved = materials.emissive(node);
        if saved.is_some() {
            materials.set_emissive(node, self.config.highlight);
        }
        self.selection = Some(Selection { node, saved });
    }

    fn reset_selection(&mut self, materials: &mut dyn NodeMaterials) {
        if let Some(selection) = self.selection.take() {
            if let Some(saved) = selection.saved {
                materials.set_emissive(selection.node, saved);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::controls::{ControlsConfig, Gesture, HorizontalControls};
    use crate::graph::{Graph, GraphSpec};
    use crate::simulation::LayoutConfig;

    /// Camera looking straight down -Z at a 2-node graph, 800x600 canvas
    struct Fixture {
        camera: Camera,
        simulation: Simulation,
        controls: HorizontalControls,
        materials: MaterialTable,
        manager: InteractionManager,
        selections: Vec<Option<String>>,
    }

    impl Fixture {
        fn new() -> Self {
            let spec = GraphSpec {
                nodes: vec![
                    NodeSpec::new("near").attached_to(["far"]),
                    NodeSpec::new("far"),
                ],
            };
            let mut simulation = Simulation::from_graph(
                Graph::build(&spec, 0.0),
                LayoutConfig {
                    seed: Some(1),
                    ..LayoutConfig::default()
                },
            );
            // Both nodes on the view axis; "near" is closer to the camera
            simulation.set_position(NodeId(0), Vec3::new(0.0, 0.0, 1.0));
            simulation.set_position(NodeId(1), Vec3::new(0.0, 0.0, -1.0));

            let camera = Camera::new(
                &CameraConfig {
                    position: Vec3::new(0.0, 0.0, 10.0),
                    ..CameraConfig::default()
                },
                800.0 / 600.0,
            );
            let manager = InteractionManager::for_nodes(
                Viewport::new(800.0, 600.0),
                &simulation,
                InteractionConfig::default(),
            );

            Self {
                camera,
                materials: MaterialTable::new(simulation.nodes().len()),
                simulation,
                controls: HorizontalControls::new(ControlsConfig::default()),
                manager,
                selections: Vec::new(),
            }
        }

        fn send(&mut self, event: InputEvent) -> InputEvent {
            let mut event = event;
            let selections = &mut self.selections;
            let mut on_select =
                |spec: Option<&NodeSpec>| selections.push(spec.map(|s| s.name.clone()));
            let mut ctx = InteractionContext {
                camera: &self.camera,
                simulation: &mut self.simulation,
                controls: &mut self.controls,
                materials: &mut self.materials,
                on_select: &mut on_select,
            };
            self.manager.handle_event(&mut event, &mut ctx);
            event
        }
    }

    const CENTER: (f32, f32) = (400.0, 300.0);

    #[test]
    fn pick_returns_nearest_hit() {
        let fx = Fixture::new();
        let hit = fx.manager.pick(Vec2::ZERO, &fx.camera, &fx.simulation);
        assert_eq!(hit, Some(NodeId(0)));
    }

    #[test]
    fn pick_misses_empty_space() {
        let fx = Fixture::new();
        let hit = fx
            .manager
            .pick(Vec2::new(0.9, 0.9), &fx.camera, &fx.simulation);
        assert_eq!(hit, None);
    }

    #[test]
    fn grabbing_disables_camera_and_binds_drag() {
        let mut fx = Fixture::new();
        fx.send(InputEvent::mouse_down(CENTER.0, CENTER.1));

        assert_eq!(fx.manager.dragged(), Some(NodeId(0)));
        assert!(!fx.controls.is_enabled());
        assert!(fx.simulation.is_dragged(NodeId(0)));
        assert_eq!(fx.selections, vec![Some("near".to_string())]);
    }

    #[test]
    fn grab_highlights_and_saves_emissive() {
        let mut fx = Fixture::new();
        fx.send(InputEvent::mouse_down(CENTER.0, CENTER.1));

        assert_eq!(fx.manager.selected(), Some(NodeId(0)));
        let highlighted = fx.materials.emissive(NodeId(0)).unwrap();
        assert_eq!(highlighted.intensity, 2.5);
        assert!((highlighted.color - Vec3::ONE).length() < 1e-5);
        assert_eq!(fx.materials.emissive(NodeId(1)), Some(MaterialTable::BASE));
    }

    #[test]
    fn miss_clears_selection_and_reports_absence() {
        let mut fx = Fixture::new();
        fx.send(InputEvent::mouse_down(CENTER.0, CENTER.1));
        fx.send(InputEvent::mouse_up());

        fx.send(InputEvent::mouse_down(10.0, 10.0));

        assert_eq!(fx.manager.selected(), None);
        assert_eq!(fx.manager.dragged(), None);
        assert_eq!(fx.materials.emissive(NodeId(0)), Some(MaterialTable::BASE));
        assert_eq!(fx.selections, vec![Some("near".to_string()), None]);
    }

    #[test]
    fn miss_without_drag_leaves_nothing_bound() {
        let mut fx = Fixture::new();
        fx.send(InputEvent::mouse_down(10.0, 10.0));

        assert_eq!(fx.selections, vec![None]);
        assert_eq!(fx.manager.dragged(), None);
        assert!(!fx.simulation.is_dragged(NodeId(0)));
        assert!(!fx.simulation.is_dragged(NodeId(1)));
        assert!(fx.controls.is_enabled());
    }

    #[test]
    fn regrabbing_selected_node_does_not_renotify() {
        let mut fx = Fixture::new();
        fx.send(InputEvent::mouse_down(CENTER.0, CENTER.1));
        fx.send(InputEvent::mouse_up());
        fx.send(InputEvent::mouse_down(CENTER.0, CENTER.1));

        assert_eq!(fx.selections.len(), 1);
        assert_eq!(fx.manager.dragged(), Some(NodeId(0)));
        // Saved emissive is still the original, not the highlight
        fx.send(InputEvent::mouse_up());
        fx.send(InputEvent::mouse_down(10.0, 10.0));
        assert_eq!(fx.materials.emissive(NodeId(0)), Some(MaterialTable::BASE));
    }

    #[test]
    fn moving_forwards_target_with_grab_offset() {
        let mut fx = Fixture::new();
        // Grab slightly off the node center
        fx.send(InputEvent::mouse_down(CENTER.0 + 4.0, CENTER.1));
        let node = fx.simulation.position(NodeId(0)).unwrap();
        assert_eq!(fx.simulation.drag_target(NodeId(0)), Some(node));

        fx.send(InputEvent::mouse_move(CENTER.0 + 104.0, CENTER.1));
        let target = fx.simulation.drag_target(NodeId(0)).unwrap();

        // 100 px of a 9-unit-high frustum on a 600 px canvas
        let expected_dx = 100.0 * 9.0 / 600.0;
        assert!((target.x - node.x - expected_dx).abs() < 1e-3);
        assert!((target.y - node.y).abs() < 1e-3);
        // The drag plane faces the camera, so depth is preserved
        assert!((target.z - node.z).abs() < 1e-3);
    }

    #[test]
    fn every_move_updates_target() {
        let mut fx = Fixture::new();
        fx.send(InputEvent::mouse_down(CENTER.0, CENTER.1));

        let mut last = fx.simulation.drag_target(NodeId(0)).unwrap();
        for step in 1..5 {
            fx.send(InputEvent::mouse_move(CENTER.0, CENTER.1 - step as f32));
            let target = fx.simulation.drag_target(NodeId(0)).unwrap();
            assert!(target.y > last.y);
            last = target;
        }
    }

    #[test]
    fn release_unbinds_and_reenables_camera() {
        let mut fx = Fixture::new();
        fx.send(InputEvent::mouse_down(CENTER.0, CENTER.1));
        fx.send(InputEvent::mouse_up());

        assert_eq!(fx.manager.dragged(), None);
        assert!(!fx.simulation.is_dragged(NodeId(0)));
        assert!(fx.controls.is_enabled());
        // Selection survives the release
        assert_eq!(fx.manager.selected(), Some(NodeId(0)));
    }

    #[test]
    fn touch_hit_blocks_scroll_and_miss_does_not() {
        let mut fx = Fixture::new();
        let miss = fx.send(InputEvent::touch_start(&[(10.0, 10.0)]));
        assert!(!miss.default_prevented());

        fx.send(InputEvent::touch_end(&[]));
        let hit = fx.send(InputEvent::touch_start(&[CENTER]));
        assert!(hit.default_prevented());
        assert_eq!(fx.manager.dragged(), Some(NodeId(0)));

        let moved = fx.send(InputEvent::touch_move(&[(CENTER.0 + 10.0, CENTER.1)]));
        assert!(moved.default_prevented());
    }

    #[test]
    fn second_finger_releases_drag() {
        let mut fx = Fixture::new();
        fx.send(InputEvent::touch_start(&[CENTER]));
        assert_eq!(fx.manager.dragged(), Some(NodeId(0)));

        fx.send(InputEvent::touch_start(&[CENTER, (600.0, 300.0)]));

        assert_eq!(fx.manager.dragged(), None);
        assert!(!fx.simulation.is_dragged(NodeId(0)));
        assert!(fx.controls.is_enabled());
        assert_eq!(fx.controls.gesture(), Gesture::Idle);
    }

    #[test]
    fn two_finger_move_also_releases_drag() {
        let mut fx = Fixture::new();
        fx.send(InputEvent::touch_start(&[CENTER]));
        fx.send(InputEvent::touch_move(&[CENTER, (600.0, 300.0)]));

        assert_eq!(fx.manager.dragged(), None);
        assert!(fx.controls.is_enabled());
    }

    #[test]
    fn hsl_white_and_red() {
        let white = Emissive::from_hsl(0.0, 0.5, 1.0, 1.0);
        assert!((white.color - Vec3::ONE).length() < 1e-6);

        let red = Emissive::from_hsl(0.0, 1.0, 0.5, 1.0);
        assert!((red.color - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    }
}
