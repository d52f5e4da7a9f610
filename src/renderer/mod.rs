//! Rendering
//!
//! `scene` turns a `GameState` into screen-space triangles and text labels;
//! `pipeline` pushes the triangles through wgpu. Labels are drawn by the
//! browser shell on a 2D canvas layered above the GPU surface.

pub mod indicators;
pub mod painter;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use indicators::{Indicator, ThreatTier, edge_point};
pub use painter::{Label, Painter, TextAlign};
pub use pipeline::RenderState;
pub use scene::{Frame, SceneOptions, build_frame};
pub use vertex::Vertex;
