//! Errors surfaced by the renderer's resource API.

use crate::scene::ObjectId;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("object {0:?} has no GPU resources (never uploaded or already disposed)")]
    UnknownObject(ObjectId),
    #[error("object {0:?} was already uploaded")]
    DuplicateObject(ObjectId),
    #[error("render surface has been disposed")]
    SurfaceDisposed,
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl RenderError {
    /// Errors after which no further frame can be presented.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RenderError::SurfaceDisposed | RenderError::Surface(wgpu::SurfaceError::OutOfMemory)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_and_missing_surface_are_fatal() {
        assert!(RenderError::SurfaceDisposed.is_fatal());
        assert!(RenderError::from(wgpu::SurfaceError::OutOfMemory).is_fatal());
        assert!(!RenderError::Surface(wgpu::SurfaceError::Timeout).is_fatal());
        assert!(!RenderError::UnknownObject(ObjectId(3)).is_fatal());
    }
}
