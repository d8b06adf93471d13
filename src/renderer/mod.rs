//! Rendering
//!
//! `scene` turns the world into an ordered sprite list without touching the
//! GPU; `pipeline` draws that list with WebGPU.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod texture;
pub mod vertex;

pub use pipeline::{RenderError, RenderState};
pub use scene::{Shape, Sprite};
