//! Core engine types and utilities for Starscape.
//!
//! This crate provides the foundational types used across the viewer:
//! - Transform and spatial positioning
//! - Frame time management

pub mod time;
pub mod transform;

pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
