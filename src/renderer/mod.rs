//! Rendering module
//!
//! Turns detector render parameters into vertex geometry. No detection logic.

pub mod presenter;
pub mod shapes;
pub mod vertex;

pub use presenter::{BeamStyle, MeshPresenter, Presenter};
pub use vertex::Vertex;
