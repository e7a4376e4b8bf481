//! Platform pointer and touch events
//!
//! Events arrive one at a time in the order the platform delivers them.
//! Handlers mark an event with [`InputEvent::prevent_default`] when the
//! platform's own behavior (page scroll, pinch zoom) must be suppressed; the
//! embedding reads [`InputEvent::default_prevented`] afterwards.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What happened, with client-space coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerInput {
    MouseDown { position: Vec2 },
    MouseMove { position: Vec2 },
    MouseUp,
    /// Scroll wheel; positive `delta` scrolls down (zooms out)
    Wheel { delta: f32 },
    /// A finger touched down; `touches` lists every active contact
    TouchStart { touches: Vec<Vec2> },
    TouchMove { touches: Vec<Vec2> },
    /// A finger lifted; `touches` lists the contacts still down
    TouchEnd { touches: Vec<Vec2> },
}

impl PointerInput {
    /// Active contacts for touch events, the pointer for mouse events
    pub fn contact_count(&self) -> usize {
        match self {
            PointerInput::MouseDown { .. } | PointerInput::MouseMove { .. } => 1,
            PointerInput::MouseUp | PointerInput::Wheel { .. } => 0,
            PointerInput::TouchStart { touches }
            | PointerInput::TouchMove { touches }
            | PointerInput::TouchEnd { touches } => touches.len(),
        }
    }
}

/// An input plus the platform's cancelation flags
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub input: PointerInput,
    /// Whether the platform allows suppressing its default behavior
    pub cancelable: bool,
    default_prevented: bool,
}

impl InputEvent {
    pub fn new(input: PointerInput) -> Self {
        Self {
            input,
            cancelable: true,
            default_prevented: false,
        }
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn mouse_down(x: f32, y: f32) -> Self {
        Self::new(PointerInput::MouseDown {
            position: Vec2::new(x, y),
        })
    }

    pub fn mouse_move(x: f32, y: f32) -> Self {
        Self::new(PointerInput::MouseMove {
            position: Vec2::new(x, y),
        })
    }

    pub fn mouse_up() -> Self {
        Self::new(PointerInput::MouseUp)
    }

    pub fn wheel(delta: f32) -> Self {
        Self::new(PointerInput::Wheel { delta })
    }

    pub fn touch_start(touches: &[(f32, f32)]) -> Self {
        Self::new(PointerInput::TouchStart {
            touches: to_points(touches),
        })
    }

    pub fn touch_move(touches: &[(f32, f32)]) -> Self {
        Self::new(PointerInput::TouchMove {
            touches: to_points(touches),
        })
    }

    pub fn touch_end(remaining: &[(f32, f32)]) -> Self {
        Self::new(PointerInput::TouchEnd {
            touches: to_points(remaining),
        })
    }

    /// Ask the platform to skip its default handling of this event
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Like [`prevent_default`](Self::prevent_default) but only when the
    /// platform reports the event as cancelable
    pub fn prevent_default_if_cancelable(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

fn to_points(touches: &[(f32, f32)]) -> Vec<Vec2> {
    touches.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
}

/// On-screen rectangle of the canvas in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Convert client coordinates to normalized device coordinates
    ///
    /// The canvas maps to `[-1, 1]` on both axes with +Y up.
    pub fn to_ndc(&self, client: Vec2) -> Vec2 {
        let width = self.width.max(f32::EPSILON);
        let height = self.height.max(f32::EPSILON);
        Vec2::new(
            (client.x - self.left) / width * 2.0 - 1.0,
            -((client.y - self.top) / height) * 2.0 + 1.0,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
