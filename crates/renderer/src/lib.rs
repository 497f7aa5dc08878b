//! Rendering system using wgpu for Starscape.

pub mod camera;
pub mod error;
pub mod mesh;
pub mod pipeline;
pub mod post;
pub mod renderer;
pub mod scene;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use error::*;
pub use mesh::*;
pub use post::*;
pub use renderer::*;
pub use scene::*;
pub use texture::*;
pub use vertex::*;
