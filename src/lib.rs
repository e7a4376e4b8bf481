//! graphorbit - an interactive force-directed 3D graph view.
//!
//! Nodes repel each other, relations pull like springs and a weak gravity
//! keeps the layout centered. A camera controller orbits the scene with
//! inertia and pinch zoom while leaving vertical touch swipes to the page,
//! and a picking coordinator lets nodes be grabbed and dragged elastically.
//!
//! Everything is headless: the embedding layer renders [`geometry::SegmentTransform`]s
//! and node positions, and feeds platform input through [`view::GraphView`].

pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod input;
pub mod interaction;
pub mod simulation;
pub mod snapshot;
pub mod view;

pub use config::ViewConfig;
pub use error::{GraphError, GraphResult};
pub use graph::{Graph, GraphSpec, NodeId, NodeSpec};
pub use input::{InputEvent, PointerInput, Viewport};
pub use view::{FrameDriver, GraphView};
