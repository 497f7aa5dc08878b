//! Procedural generation for the space scene: star shells, nebula, mountain
//! silhouettes, and the atmosphere shell.
//!
//! Generators only produce CPU-side geometry and material parameters; uploading
//! them to the GPU is the renderer's job.

pub mod atmosphere;
pub mod color;
pub mod geometry;
pub mod layers;
pub mod mountains;
pub mod nebula;
pub mod starfield;

pub use atmosphere::*;
pub use geometry::*;
pub use layers::*;
pub use mountains::*;
pub use nebula::*;
pub use starfield::*;
