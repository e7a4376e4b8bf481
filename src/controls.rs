//! Camera controllers
//!
//! A controller turns pointer and touch sequences into camera motion and
//! keeps spinning the camera after release with decaying angular velocity.
//! Two variants share the [`ViewControls`] capability set:
//!
//! - [`HorizontalControls`] only orbits about the vertical axis and tells a
//!   horizontal swipe (rotate the view) apart from a vertical one (let the
//!   page scroll).
//! - [`FreeOrbitControls`] orbits freely in azimuth and elevation and zooms
//!   with the wheel.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::Camera;
use crate::input::{InputEvent, PointerInput};

/// Tuning shared by both controller variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Per-frame (at 60 fps) retention of angular velocity after release
    pub friction: f32,
    /// Radians of orbit per pixel of horizontal movement
    pub sensitivity: f32,
    /// Zoom change per pixel of vertical mouse movement or pinch distance
    pub zoom_sensitivity: f32,
    /// Zoom change per unit of wheel delta
    pub wheel_sensitivity: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Pixels a touch must travel before its direction is decided
    pub gesture_threshold: f32,
    /// Pixels of vertical mouse movement ignored before zooming
    pub vertical_zoom_threshold: f32,
    /// Angular speed below which inertia stops entirely
    pub stop_threshold: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            friction: 0.95,
            sensitivity: 0.002,
            zoom_sensitivity: 0.01,
            wheel_sensitivity: 0.001,
            min_zoom: 0.6,
            max_zoom: 1.5,
            gesture_threshold: 5.0,
            vertical_zoom_threshold: 1.0,
            stop_threshold: 1e-4,
        }
    }
}

impl ControlsConfig {
    /// Clamp a zoom factor to `[min_zoom, max_zoom]`
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    /// Frame-rate normalized decay of an angular velocity
    fn decay(&self, velocity: f32, delta: f32) -> f32 {
        let decayed = velocity * self.friction.powf(delta * 60.0);
        if decayed.abs() < self.stop_threshold {
            0.0
        } else {
            decayed
        }
    }
}

/// Capability set every camera controller provides
pub trait ViewControls {
    /// Process one platform event
    fn handle_event(&mut self, camera: &mut Camera, event: &mut InputEvent);

    /// Advance inertia by `delta` time units
    fn update(&mut self, camera: &mut Camera, delta: f32);

    /// Suspend or resume gesture processing; disabling drops the gesture in progress
    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Stop for good; every later call is a no-op
    fn dispose(&mut self);
}

/// Which controller variant to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlsKind {
    #[default]
    Horizontal,
    FreeOrbit,
}

impl ControlsKind {
    pub fn build(self, config: ControlsConfig) -> Box<dyn ViewControls> {
        match self {
            ControlsKind::Horizontal => Box::new(HorizontalControls::new(config)),
            ControlsKind::FreeOrbit => Box::new(FreeOrbitControls::new(config)),
        }
    }
}

/// Observable gesture state of [`HorizontalControls`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    /// A single touch that has not yet moved far enough to tell direction
    Deciding,
    Rotating,
    Pinching,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Deciding { start: Vec2 },
    Rotating { mouse: bool },
    Pinching { distance: f32 },
}

/// Orbits the camera about the vertical axis through its target
#[derive(Debug, Clone)]
pub struct HorizontalControls {
    config: ControlsConfig,
    state: State,
    previous: Vec2,
    velocity: f32,
    enabled: bool,
    disposed: bool,
}

impl HorizontalControls {
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            config,
            state: State::Idle,
            previous: Vec2::ZERO,
            velocity: 0.0,
            enabled: true,
            disposed: false,
        }
    }

    pub fn gesture(&self) -> Gesture {
        match self.state {
            State::Idle => Gesture::Idle,
            State::Deciding { .. } => Gesture::Deciding,
            State::Rotating { .. } => Gesture::Rotating,
            State::Pinching { .. } => Gesture::Pinching,
        }
    }

    /// Orbit angle applied per frame while coasting
    pub fn angular_velocity(&self) -> f32 {
        self.velocity
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    fn set_state(&mut self, state: State) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "gesture transition");
            self.state = state;
        }
    }

    fn start_rotation(&mut self, position: Vec2, mouse: bool) {
        self.set_state(State::Rotating { mouse });
        self.previous = position;
    }

    fn rotate_to(&mut self, camera: &mut Camera, position: Vec2, mouse: bool) {
        let delta = position - self.previous;

        let angle = -delta.x * self.config.sensitivity;
        camera.rotate_about_target(angle);
        self.velocity = angle;

        if mouse && delta.y.abs() > self.config.vertical_zoom_threshold {
            let zoom = camera.zoom() - delta.y * self.config.zoom_sensitivity;
            camera.set_zoom(self.config.clamp_zoom(zoom));
        }

        self.previous = position;
    }

    fn pinch(&mut self, camera: &mut Camera, touches: &[Vec2]) {
        let distance = pinch_distance(touches);
        if let State::Pinching { distance: previous } = self.state {
            let zoom = camera.zoom() + (distance - previous) * self.config.zoom_sensitivity * 0.5;
            camera.set_zoom(self.config.clamp_zoom(zoom));
        }
        self.set_state(State::Pinching { distance });
    }

    fn touch_start(&mut self, event: &mut InputEvent, touches: &[Vec2]) {
        match touches {
            [] => self.set_state(State::Idle),
            // Direction is unknown yet, so page scrolling is not blocked
            [touch] => {
                self.set_state(State::Deciding { start: *touch });
                self.previous = *touch;
            }
            [..] => {
                event.prevent_default();
                self.set_state(State::Pinching {
                    distance: pinch_distance(touches),
                });
            }
        }
    }

    fn touch_move(&mut self, camera: &mut Camera, event: &mut InputEvent, touches: &[Vec2]) {
        if touches.len() >= 2 {
            event.prevent_default();
            self.pinch(camera, touches);
            return;
        }
        let Some(&touch) = touches.first() else {
            return;
        };

        match self.state {
            State::Deciding { start } => {
                let d = touch - start;
                let threshold = self.config.gesture_threshold;
                if d.x.abs() > threshold || d.y.abs() > threshold {
                    if d.y.abs() > d.x.abs() {
                        // Vertical swipe: hand the gesture back to the page
                        self.set_state(State::Idle);
                    } else {
                        self.set_state(State::Rotating { mouse: false });
                        event.prevent_default_if_cancelable();
                    }
                }
            }
            State::Rotating { .. } => {
                event.prevent_default_if_cancelable();
                self.rotate_to(camera, touch, false);
            }
            State::Idle | State::Pinching { .. } => {}
        }
    }

    fn release(&mut self) {
        self.set_state(State::Idle);
    }
}

impl ViewControls for HorizontalControls {
    fn handle_event(&mut self, camera: &mut Camera, event: &mut InputEvent) {
        if self.disposed {
            return;
        }

        // Releases are honored even while disabled
        if matches!(
            event.input,
            PointerInput::MouseUp | PointerInput::TouchEnd { .. }
        ) {
            self.release();
            return;
        }

        if !self.enabled {
            self.set_state(State::Idle);
            return;
        }

        let input = event.input.clone();
        match input {
            PointerInput::MouseDown { position } => {
                self.start_rotation(position, true);
                self.velocity = 0.0;
            }
            PointerInput::MouseMove { position } => {
                if let State::Rotating { mouse } = self.state {
                    self.rotate_to(camera, position, mouse);
                }
            }
            PointerInput::TouchStart { touches } => self.touch_start(event, &touches),
            PointerInput::TouchMove { touches } => self.touch_move(camera, event, &touches),
            PointerInput::Wheel { .. } | PointerInput::MouseUp | PointerInput::TouchEnd { .. } => {}
        }
    }

    fn update(&mut self, camera: &mut Camera, delta: f32) {
        if self.disposed || matches!(self.state, State::Rotating { .. }) {
            return;
        }

        if self.velocity != 0.0 {
            camera.rotate_about_target(self.velocity);
            self.velocity = self.config.decay(self.velocity, delta);
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.disposed {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.set_state(State::Idle);
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled && !self.disposed
    }

    fn dispose(&mut self) {
        self.state = State::Idle;
        self.velocity = 0.0;
        self.enabled = false;
        self.disposed = true;
    }
}

/// Orbits freely in azimuth and elevation, zooms with wheel and pinch
#[derive(Debug, Clone)]
pub struct FreeOrbitControls {
    config: ControlsConfig,
    dragging: bool,
    pinch_distance: Option<f32>,
    previous: Vec2,
    /// (azimuth, polar) radians per frame
    velocity: Vec2,
    enabled: bool,
    disposed: bool,
}

impl FreeOrbitControls {
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            config,
            dragging: false,
            pinch_distance: None,
            previous: Vec2::ZERO,
            velocity: Vec2::ZERO,
            enabled: true,
            disposed: false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn angular_velocity(&self) -> Vec2 {
        self.velocity
    }

    fn begin(&mut self, position: Vec2) {
        self.dragging = true;
        self.pinch_distance = None;
        self.previous = position;
        self.velocity = Vec2::ZERO;
    }

    fn drag_to(&mut self, camera: &mut Camera, position: Vec2) {
        let delta = position - self.previous;
        let angles = -delta * self.config.sensitivity;
        camera.orbit(angles.x, angles.y);
        self.velocity = angles;
        self.previous = position;
    }

    fn zoom_by(&self, camera: &mut Camera, change: f32) {
        camera.set_zoom(self.config.clamp_zoom(camera.zoom() + change));
    }
}

impl ViewControls for FreeOrbitControls {
    fn handle_event(&mut self, camera: &mut Camera, event: &mut InputEvent) {
        if self.disposed {
            return;
        }
        if matches!(
            event.input,
            PointerInput::MouseUp | PointerInput::TouchEnd { .. }
        ) {
            self.dragging = false;
            self.pinch_distance = None;
            return;
        }
        if !self.enabled {
            self.dragging = false;
            self.pinch_distance = None;
            return;
        }

        let input = event.input.clone();
        match input {
            PointerInput::MouseDown { position } => self.begin(position),
            PointerInput::MouseMove { position } if self.dragging => {
                self.drag_to(camera, position)
            }
            PointerInput::Wheel { delta } => {
                event.prevent_default_if_cancelable();
                self.zoom_by(camera, -delta * self.config.wheel_sensitivity);
            }
            PointerInput::TouchStart { touches } | PointerInput::TouchMove { touches }
                if touches.len() >= 2 =>
            {
                event.prevent_default();
                self.dragging = false;
                let distance = pinch_distance(&touches);
                if let Some(previous) = self.pinch_distance {
                    self.zoom_by(
                        camera,
                        (distance - previous) * self.config.zoom_sensitivity * 0.5,
                    );
                }
                self.pinch_distance = Some(distance);
            }
            PointerInput::TouchStart { touches } => {
                if let Some(&touch) = touches.first() {
                    event.prevent_default_if_cancelable();
                    self.begin(touch);
                }
            }
            PointerInput::TouchMove { touches } if self.dragging => {
                if let Some(&touch) = touches.first() {
                    event.prevent_default_if_cancelable();
                    self.drag_to(camera, touch);
                }
            }
            _ => {}
        }
    }

    fn update(&mut self, camera: &mut Camera, delta: f32) {
        if self.disposed || self.dragging {
            return;
        }

        if self.velocity != Vec2::ZERO {
            camera.orbit(self.velocity.x, self.velocity.y);
            self.velocity = Vec2::new(
                self.config.decay(self.velocity.x, delta),
                self.config.decay(self.velocity.y, delta),
            );
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.disposed {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.dragging = false;
            self.pinch_distance = None;
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled && !self.disposed
    }

    fn dispose(&mut self) {
        self.dragging = false;
        self.pinch_distance = None;
        self.velocity = Vec2::ZERO;
        self.enabled = false;
        self.disposed = true;
    }
}

/// Distance between the first two contacts
fn pinch_distance(touches: &[Vec2]) -> f32 {
    match touches {
        [a, b, ..] => a.distance(*b),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use glam::Vec3;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), 1.5)
    }

    fn controls() -> HorizontalControls {
        HorizontalControls::new(ControlsConfig::default())
    }

    fn send(
        controls: &mut impl ViewControls,
        camera: &mut Camera,
        event: InputEvent,
    ) -> InputEvent {
        let mut event = event;
        controls.handle_event(camera, &mut event);
        event
    }

    #[test]
    fn mouse_drag_rotates_camera() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::mouse_down(100.0, 100.0));
        assert_eq!(ctl.gesture(), Gesture::Rotating);

        send(&mut ctl, &mut cam, InputEvent::mouse_move(150.0, 100.0));

        assert!((ctl.angular_velocity() - (-50.0 * 0.002)).abs() < 1e-6);
        assert!((cam.position.y - 5.0).abs() < 1e-5);
        assert_ne!(cam.position, Vec3::new(5.0, 5.0, 5.0));

        send(&mut ctl, &mut cam, InputEvent::mouse_up());
        assert_eq!(ctl.gesture(), Gesture::Idle);
    }

    #[test]
    fn vertical_mouse_movement_zooms_within_limits() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        send(&mut ctl, &mut cam, InputEvent::mouse_move(0.0, -20.0));
        assert!((cam.zoom() - 1.2).abs() < 1e-5);

        // Below the one pixel threshold nothing changes
        send(&mut ctl, &mut cam, InputEvent::mouse_move(0.0, -20.5));
        assert!((cam.zoom() - 1.2).abs() < 1e-5);

        for i in 0..50 {
            send(
                &mut ctl,
                &mut cam,
                InputEvent::mouse_move(0.0, -20.5 - 30.0 * (i as f32 + 1.0)),
            );
            assert!(cam.zoom() <= 1.5);
        }
        assert_eq!(cam.zoom(), 1.5);

        for i in 0..100 {
            send(&mut ctl, &mut cam, InputEvent::mouse_move(0.0, 30.0 * i as f32));
            assert!(cam.zoom() >= 0.6);
        }
        assert_eq!(cam.zoom(), 0.6);
    }

    #[test]
    fn touch_stays_undecided_within_threshold() {
        let mut cam = camera();
        let mut ctl = controls();

        let start = send(&mut ctl, &mut cam, InputEvent::touch_start(&[(100.0, 100.0)]));
        assert!(!start.default_prevented());
        assert_eq!(ctl.gesture(), Gesture::Deciding);

        for (x, y) in [(103.0, 102.0), (95.0, 105.0), (105.0, 95.0)] {
            let event = send(&mut ctl, &mut cam, InputEvent::touch_move(&[(x, y)]));
            assert!(!event.default_prevented());
            assert_eq!(ctl.gesture(), Gesture::Deciding);
        }
        assert_eq!(cam.position, Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn vertical_swipe_becomes_page_scroll_for_whole_gesture() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::touch_start(&[(100.0, 100.0)]));
        let decided = send(&mut ctl, &mut cam, InputEvent::touch_move(&[(102.0, 110.0)]));
        assert!(!decided.default_prevented());
        assert_eq!(ctl.gesture(), Gesture::Idle);

        // A later horizontal stretch does not turn it into a rotation
        for x in [150.0, 200.0, 300.0] {
            let event = send(&mut ctl, &mut cam, InputEvent::touch_move(&[(x, 112.0)]));
            assert!(!event.default_prevented());
            assert_eq!(ctl.gesture(), Gesture::Idle);
        }
        assert_eq!(cam.position, Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn horizontal_swipe_rotates_and_blocks_scroll() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::touch_start(&[(100.0, 100.0)]));
        let decided = send(&mut ctl, &mut cam, InputEvent::touch_move(&[(110.0, 102.0)]));
        assert!(decided.default_prevented());
        assert_eq!(ctl.gesture(), Gesture::Rotating);

        let moved = send(&mut ctl, &mut cam, InputEvent::touch_move(&[(130.0, 150.0)]));
        assert!(moved.default_prevented());
        // Measured from the touch start; vertical travel never zooms a touch
        assert!((ctl.angular_velocity() - (-30.0 * 0.002)).abs() < 1e-6);
        assert_eq!(cam.zoom(), 1.0);

        send(&mut ctl, &mut cam, InputEvent::touch_end(&[]));
        assert_eq!(ctl.gesture(), Gesture::Idle);
    }

    #[test]
    fn non_cancelable_moves_are_not_prevented() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::touch_start(&[(0.0, 0.0)]));
        let event = send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_move(&[(20.0, 0.0)]).with_cancelable(false),
        );
        assert_eq!(ctl.gesture(), Gesture::Rotating);
        assert!(!event.default_prevented());
    }

    #[test]
    fn second_finger_switches_to_pinch_zoom() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::touch_start(&[(100.0, 100.0)]));
        send(&mut ctl, &mut cam, InputEvent::touch_move(&[(120.0, 100.0)]));
        assert_eq!(ctl.gesture(), Gesture::Rotating);

        let start = send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_start(&[(100.0, 100.0), (200.0, 100.0)]),
        );
        assert!(start.default_prevented());
        assert_eq!(ctl.gesture(), Gesture::Pinching);

        send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_move(&[(100.0, 100.0), (220.0, 100.0)]),
        );
        assert!((cam.zoom() - (1.0 + 20.0 * 0.01 * 0.5)).abs() < 1e-5);
    }

    #[test]
    fn pinch_zoom_is_clamped() {
        let mut cam = camera();
        let mut ctl = controls();

        send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_start(&[(0.0, 0.0), (10.0, 0.0)]),
        );
        send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_move(&[(0.0, 0.0), (1000.0, 0.0)]),
        );
        assert_eq!(cam.zoom(), 1.5);

        send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_move(&[(0.0, 0.0), (1.0, 0.0)]),
        );
        assert_eq!(cam.zoom(), 0.6);
    }

    #[test]
    fn inertia_decays_monotonically_to_exact_zero() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        send(&mut ctl, &mut cam, InputEvent::mouse_move(40.0, 0.0));
        send(&mut ctl, &mut cam, InputEvent::mouse_up());

        let mut previous = ctl.angular_velocity().abs();
        assert!(previous > 0.0);
        for _ in 0..1000 {
            ctl.update(&mut cam, 1.0 / 60.0);
            let current = ctl.angular_velocity().abs();
            assert!(current <= previous);
            assert!(current == 0.0 || current >= 1e-4);
            previous = current;
        }
        assert_eq!(ctl.angular_velocity(), 0.0);

        // Once stopped the camera stays put
        let resting = cam.position;
        ctl.update(&mut cam, 1.0 / 60.0);
        assert_eq!(cam.position, resting);
    }

    #[test]
    fn inertia_waits_while_rotating() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        send(&mut ctl, &mut cam, InputEvent::mouse_move(40.0, 0.0));
        let held = cam.position;
        let velocity = ctl.angular_velocity();

        ctl.update(&mut cam, 1.0 / 60.0);

        assert_eq!(cam.position, held);
        assert_eq!(ctl.angular_velocity(), velocity);
    }

    #[test]
    fn disabling_forces_idle_and_ignores_gestures() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        ctl.set_enabled(false);
        assert_eq!(ctl.gesture(), Gesture::Idle);
        assert!(!ctl.is_enabled());

        send(&mut ctl, &mut cam, InputEvent::mouse_move(80.0, 0.0));
        send(&mut ctl, &mut cam, InputEvent::touch_start(&[(0.0, 0.0)]));
        assert_eq!(ctl.gesture(), Gesture::Idle);
        assert_eq!(cam.position, Vec3::new(5.0, 5.0, 5.0));

        ctl.set_enabled(true);
        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        assert_eq!(ctl.gesture(), Gesture::Rotating);
    }

    #[test]
    fn disposed_controls_do_nothing() {
        let mut cam = camera();
        let mut ctl = controls();

        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        send(&mut ctl, &mut cam, InputEvent::mouse_move(40.0, 0.0));
        ctl.dispose();
        let resting = cam.position;

        ctl.set_enabled(true);
        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        send(&mut ctl, &mut cam, InputEvent::mouse_move(90.0, 0.0));
        ctl.update(&mut cam, 1.0 / 60.0);

        assert!(!ctl.is_enabled());
        assert_eq!(cam.position, resting);
    }

    #[test]
    fn free_orbit_rotates_both_axes() {
        let mut cam = camera();
        let mut ctl = FreeOrbitControls::new(ControlsConfig::default());
        let start_polar = cam.polar_angle();

        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        send(&mut ctl, &mut cam, InputEvent::mouse_move(30.0, -40.0));

        assert!(ctl.is_dragging());
        assert!((cam.polar_angle() - (start_polar + 40.0 * 0.002)).abs() < 1e-4);
        assert_ne!(cam.position.x, 5.0);

        send(&mut ctl, &mut cam, InputEvent::mouse_up());
        assert!(!ctl.is_dragging());
        assert_ne!(ctl.angular_velocity(), Vec2::ZERO);
    }

    #[test]
    fn free_orbit_wheel_zoom_is_clamped() {
        let mut cam = camera();
        let mut ctl = FreeOrbitControls::new(ControlsConfig::default());

        let event = send(&mut ctl, &mut cam, InputEvent::wheel(-200.0));
        assert!(event.default_prevented());
        assert!((cam.zoom() - 1.2).abs() < 1e-5);

        for _ in 0..20 {
            send(&mut ctl, &mut cam, InputEvent::wheel(-500.0));
        }
        assert_eq!(cam.zoom(), 1.5);
        for _ in 0..20 {
            send(&mut ctl, &mut cam, InputEvent::wheel(500.0));
        }
        assert_eq!(cam.zoom(), 0.6);
    }

    #[test]
    fn free_orbit_pinch_zoom_is_clamped() {
        let mut cam = camera();
        let mut ctl = FreeOrbitControls::new(ControlsConfig::default());

        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        assert!(ctl.is_dragging());

        // The first two-finger event only records the baseline distance
        let start = send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_start(&[(0.0, 0.0), (10.0, 0.0)]),
        );
        assert!(start.default_prevented());
        assert!(!ctl.is_dragging());
        assert_eq!(cam.zoom(), 1.0);

        let moved = send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_move(&[(0.0, 0.0), (30.0, 0.0)]),
        );
        assert!(moved.default_prevented());
        assert!((cam.zoom() - (1.0 + 20.0 * 0.01 * 0.5)).abs() < 1e-5);

        send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_move(&[(0.0, 0.0), (1000.0, 0.0)]),
        );
        assert_eq!(cam.zoom(), 1.5);

        send(
            &mut ctl,
            &mut cam,
            InputEvent::touch_move(&[(0.0, 0.0), (1.0, 0.0)]),
        );
        assert_eq!(cam.zoom(), 0.6);
    }

    #[test]
    fn free_orbit_inertia_stops() {
        let mut cam = camera();
        let mut ctl = FreeOrbitControls::new(ControlsConfig::default());

        send(&mut ctl, &mut cam, InputEvent::mouse_down(0.0, 0.0));
        send(&mut ctl, &mut cam, InputEvent::mouse_move(25.0, 5.0));
        send(&mut ctl, &mut cam, InputEvent::mouse_up());

        for _ in 0..1000 {
            ctl.update(&mut cam, 1.0 / 60.0);
        }
        assert_eq!(ctl.angular_velocity(), Vec2::ZERO);
    }

    #[test]
    fn controls_kind_builds_variants() {
        let mut cam = camera();
        for kind in [ControlsKind::Horizontal, ControlsKind::FreeOrbit] {
            let mut ctl = kind.build(ControlsConfig::default());
            assert!(ctl.is_enabled());
            ctl.set_enabled(false);
            assert!(!ctl.is_enabled());
            ctl.update(&mut cam, 0.016);
            ctl.dispose();
            assert!(!ctl.is_enabled());
        }
    }
}
