//! The seam between the viewer and the GPU renderer.

use renderer::{Camera, ObjectId, RenderError, Renderer, Scene, SceneObject};

/// Everything the viewer needs from a render backend.
pub trait RenderBackend {
    /// Create GPU resources for a newly generated object.
    fn upload(&mut self, object: &SceneObject) -> Result<(), RenderError>;
    /// Composite and present one frame.
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError>;
    /// Resize output targets. Zero sizes are ignored.
    fn resize(&mut self, width: u32, height: u32);
    fn dispose_object(&mut self, id: ObjectId) -> Result<(), RenderError>;
    /// Release the output surface and render targets.
    fn dispose_surface(&mut self) -> Result<(), RenderError>;
}

impl RenderBackend for Renderer {
    fn upload(&mut self, object: &SceneObject) -> Result<(), RenderError> {
        Renderer::upload(self, object)
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        Renderer::render(self, scene, camera)
    }

    fn resize(&mut self, width: u32, height: u32) {
        Renderer::resize(self, width, height)
    }

    fn dispose_object(&mut self, id: ObjectId) -> Result<(), RenderError> {
        Renderer::dispose_object(self, id)
    }

    fn dispose_surface(&mut self) -> Result<(), RenderError> {
        Renderer::dispose_surface(self)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};
    use std::rc::Rc;

    /// What a [`RecordingBackend`] saw. Shared so tests can inspect it after
    /// the backend has been moved into (and dropped by) the viewport.
    #[derive(Debug, Default)]
    pub struct Record {
        pub uploaded: Vec<ObjectId>,
        pub live: BTreeSet<ObjectId>,
        pub disposed: BTreeMap<ObjectId, u32>,
        pub surface_disposals: u32,
        pub frames: u32,
        pub resizes: Vec<(u32, u32)>,
        pub last_camera_position: Option<glam::Vec3>,
    }

    /// GPU-free backend that records every call.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingBackend {
        pub record: Rc<RefCell<Record>>,
        /// Objects whose upload is rejected.
        pub fail_upload: BTreeSet<ObjectId>,
        /// Objects whose disposal fails once.
        pub fail_dispose: BTreeSet<ObjectId>,
    }

    impl RecordingBackend {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl RenderBackend for RecordingBackend {
        fn upload(&mut self, object: &SceneObject) -> Result<(), RenderError> {
            if self.fail_upload.contains(&object.id) {
                return Err(RenderError::DuplicateObject(object.id));
            }
            let mut r = self.record.borrow_mut();
            if !r.live.insert(object.id) {
                return Err(RenderError::DuplicateObject(object.id));
            }
            r.uploaded.push(object.id);
            Ok(())
        }

        fn render(&mut self, _scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
            let mut r = self.record.borrow_mut();
            r.frames += 1;
            r.last_camera_position = Some(camera.position());
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.record.borrow_mut().resizes.push((width, height));
        }

        fn dispose_object(&mut self, id: ObjectId) -> Result<(), RenderError> {
            let mut r = self.record.borrow_mut();
            *r.disposed.entry(id).or_insert(0) += 1;
            if self.fail_dispose.contains(&id) {
                return Err(RenderError::UnknownObject(id));
            }
            if !r.live.remove(&id) {
                return Err(RenderError::UnknownObject(id));
            }
            Ok(())
        }

        fn dispose_surface(&mut self) -> Result<(), RenderError> {
            self.record.borrow_mut().surface_disposals += 1;
            Ok(())
        }
    }
}
