//! Scene context: the scene graph, camera, render backend, and the handles
//! the clock and scroll mapper animate. Also turns generator output into
//! renderer objects.

use glam::Vec3;
use procgen::{
    Atmosphere, AtmosphereParams, Geometry, MountainLayer, Nebula, NebulaParams, StarFieldParams, StarShell,
    MOUNTAIN_LAYERS, STAR_SHELLS,
};
use rand::prelude::*;
use renderer::{
    Camera, Material, MeshData, ObjectId, RenderError, Scene, SceneGeometry, SceneObject, StarInstance, Vertex,
};

use crate::backend::RenderBackend;

/// Where the camera is placed before the first scroll target arrives.
pub const INITIAL_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 20.0, 100.0);
/// Starting point of the smoothed camera position.
pub const INITIAL_SMOOTHED_POSITION: Vec3 = Vec3::new(0.0, 30.0, 100.0);

/// Generation and camera parameters for one mounted view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    pub stars_per_shell: usize,
    pub seed: Option<u64>,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            stars_per_shell: procgen::DEFAULT_STARS_PER_SHELL,
            seed: None,
            fov_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl SceneSettings {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Resting depth of each mountain layer, captured once after generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomePositions {
    depths: Vec<f32>,
}

impl HomePositions {
    pub fn capture(scene: &Scene, mountains: &[ObjectId]) -> Self {
        let depths = mountains
            .iter()
            .filter_map(|id| scene.get(*id))
            .map(|o| o.transform.position.z)
            .collect();
        Self { depths }
    }

    pub fn depth(&self, layer: usize) -> Option<f32> {
        self.depths.get(layer).copied()
    }
}

/// One mounted view's scene state plus the backend that draws it.
pub struct SceneContext<B> {
    pub scene: Scene,
    pub camera: Camera,
    pub backend: B,
    /// Smoothed camera position, eased toward `camera_target` by the clock.
    pub smoothed_position: Vec3,
    /// Written by the scroll mapper, read by the clock.
    pub camera_target: Option<Vec3>,
    pub star_shells: Vec<ObjectId>,
    pub nebula: Option<ObjectId>,
    /// Mountain objects, indexed by layer.
    pub mountains: Vec<ObjectId>,
    pub atmosphere: Option<ObjectId>,
    pub homes: HomePositions,
}

impl<B: RenderBackend> SceneContext<B> {
    pub fn new(backend: B, settings: &SceneSettings, width: u32, height: u32) -> Self {
        let mut camera = Camera::new(INITIAL_CAMERA_POSITION);
        camera.fov_degrees = settings.fov_degrees;
        camera.near = settings.near;
        camera.far = settings.far;
        camera.set_aspect(width, height);

        Self {
            scene: Scene::new(),
            camera,
            backend,
            smoothed_position: INITIAL_SMOOTHED_POSITION,
            camera_target: None,
            star_shells: Vec::new(),
            nebula: None,
            mountains: Vec::new(),
            atmosphere: None,
            homes: HomePositions::default(),
        }
    }

    /// Upload an object and add it to the scene.
    fn register(&mut self, object: SceneObject) -> Result<ObjectId, RenderError> {
        self.backend.upload(&object)?;
        Ok(self.scene.add(object))
    }

    pub fn build_star_shells<R: Rng + ?Sized>(&mut self, params: &StarFieldParams, rng: &mut R) -> Result<(), RenderError> {
        for descriptor in STAR_SHELLS {
            let shell = StarShell::generate(descriptor, params, rng);
            let stars = shell
                .stars
                .iter()
                .map(|s| StarInstance {
                    position: s.position.to_array(),
                    size: s.size,
                    color: s.color.extend(1.0).to_array(),
                })
                .collect();
            let id = self.scene.allocate_id();
            let object = SceneObject::new(
                id,
                format!("Star Shell {}", descriptor.depth),
                Material::Stars {
                    angular_speed: descriptor.angular_speed(),
                },
                SceneGeometry::Stars(stars),
            );
            let id = self.register(object)?;
            self.star_shells.push(id);
        }
        Ok(())
    }

    pub fn build_nebula(&mut self, params: NebulaParams) -> Result<(), RenderError> {
        let nebula = Nebula::generate(params);
        let id = self.scene.allocate_id();
        let object = SceneObject::new(
            id,
            "Nebula",
            Material::Nebula {
                color_a: params.color_a,
                color_b: params.color_b,
                opacity: params.opacity,
            },
            SceneGeometry::Surface(mesh_data(&nebula.geometry)),
        )
        .with_position(Vec3::new(0.0, 0.0, params.depth));
        self.nebula = Some(self.register(object)?);
        Ok(())
    }

    pub fn build_mountains<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), RenderError> {
        for (index, descriptor) in MOUNTAIN_LAYERS.iter().enumerate() {
            let layer = MountainLayer::generate(index, *descriptor, rng);
            let id = self.scene.allocate_id();
            let object = SceneObject::new(
                id,
                format!("Mountain Layer {index}"),
                Material::Mountain,
                SceneGeometry::Surface(mesh_data(&layer.geometry)),
            )
            .with_position(Vec3::new(0.0, descriptor.distance, descriptor.distance))
            .with_layer(index);
            let id = self.register(object)?;
            self.mountains.push(id);
        }
        Ok(())
    }

    pub fn build_atmosphere(&mut self, params: AtmosphereParams) -> Result<(), RenderError> {
        let atmosphere = Atmosphere::generate(params);
        let id = self.scene.allocate_id();
        let object = SceneObject::new(
            id,
            "Atmosphere",
            Material::Atmosphere { tint: params.tint },
            SceneGeometry::Surface(mesh_data(&atmosphere.geometry)),
        );
        self.atmosphere = Some(self.register(object)?);
        Ok(())
    }

    /// Run every generator in mount order, then record the mountains' home depths.
    pub fn populate<R: Rng + ?Sized>(&mut self, settings: &SceneSettings, rng: &mut R) -> Result<(), RenderError> {
        let star_params = StarFieldParams {
            stars_per_shell: settings.stars_per_shell,
            ..Default::default()
        };
        self.build_star_shells(&star_params, rng)?;
        self.build_nebula(NebulaParams::default())?;
        self.build_mountains(rng)?;
        self.build_atmosphere(AtmosphereParams::default())?;
        self.homes = HomePositions::capture(&self.scene, &self.mountains);
        log::info!(
            "Generated {} objects ({} star shells, {} mountain layers)",
            self.scene.len(),
            self.star_shells.len(),
            self.mountains.len()
        );
        Ok(())
    }

    /// Camera aspect and backend targets always change together.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect(width, height);
        self.backend.resize(width, height);
    }

    pub fn render(&mut self) -> Result<(), RenderError> {
        self.backend.render(&self.scene, &self.camera)
    }
}

/// Convert generator geometry into renderer mesh data.
pub fn mesh_data(geometry: &Geometry) -> MeshData {
    MeshData {
        vertices: geometry
            .vertices
            .iter()
            .map(|v| Vertex::with_color(v.position, v.normal, v.uv, v.color))
            .collect(),
        indices: geometry.indices.clone(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::backend::testing::RecordingBackend;

    /// A small fully generated scene on a recording backend.
    pub fn populated(seed: u64) -> SceneContext<RecordingBackend> {
        let settings = SceneSettings {
            stars_per_shell: 50,
            seed: Some(seed),
            ..Default::default()
        };
        let mut ctx = SceneContext::new(RecordingBackend::new(), &settings, 1000, 500);
        let mut rng = settings.rng();
        ctx.populate(&settings, &mut rng).unwrap();
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::testing::populated;
    use super::*;

    #[test]
    fn populate_builds_every_object_in_order() {
        let ctx = populated(1);
        assert_eq!(ctx.star_shells.len(), 3);
        assert_eq!(ctx.mountains.len(), 4);
        assert!(ctx.nebula.is_some() && ctx.atmosphere.is_some());
        assert_eq!(ctx.scene.len(), 9);

        let uploaded = ctx.backend.record.borrow().uploaded.clone();
        let mut expected = ctx.star_shells.clone();
        expected.push(ctx.nebula.unwrap());
        expected.extend(&ctx.mountains);
        expected.push(ctx.atmosphere.unwrap());
        assert_eq!(uploaded, expected);
    }

    #[test]
    fn mountains_start_at_layer_distance_and_home_is_captured() {
        let ctx = populated(2);
        for (i, id) in ctx.mountains.iter().enumerate() {
            let obj = ctx.scene.get(*id).unwrap();
            let d = MOUNTAIN_LAYERS[i].distance;
            assert_eq!(obj.transform.position, Vec3::new(0.0, d, d));
            assert_eq!(obj.layer, Some(i));
            assert_eq!(ctx.homes.depth(i), Some(d));
        }
        assert_eq!(ctx.homes.depth(4), None);
    }

    #[test]
    fn star_shell_materials_spin_slower_with_depth() {
        let ctx = populated(3);
        let speeds: Vec<f32> = ctx
            .star_shells
            .iter()
            .map(|id| match ctx.scene.get(*id).unwrap().material {
                Material::Stars { angular_speed } => angular_speed,
                _ => panic!("not a star shell"),
            })
            .collect();
        assert!(speeds[0] > speeds[1] && speeds[1] > speeds[2]);
    }

    #[test]
    fn stars_nearer_than_the_front_mountain_draw_after_it() {
        let ctx = populated(1);
        let front = MOUNTAIN_LAYERS[0].distance;
        let near_stars = ctx
            .star_shells
            .iter()
            .filter_map(|id| match &ctx.scene.get(*id).unwrap().geometry {
                SceneGeometry::Stars(stars) => Some(stars),
                _ => None,
            })
            .flatten()
            .filter(|s| s.position[2] > front && s.position[2] < 300.0)
            .count();
        assert!(near_stars > 0);

        let order: Vec<ObjectId> = ctx.scene.draw_list().iter().map(|o| o.id).collect();
        let position = |id: &ObjectId| order.iter().position(|o| o == id).unwrap();
        let last_mountain = ctx.mountains.iter().map(position).max().unwrap();
        let first_star = ctx.star_shells.iter().map(position).min().unwrap();
        assert!(first_star > last_mountain, "{order:?}");
    }

    #[test]
    fn nebula_starts_behind_everything() {
        let ctx = populated(4);
        let nebula = ctx.scene.get(ctx.nebula.unwrap()).unwrap();
        assert_eq!(nebula.transform.position.z, -1050.0);
    }

    #[test]
    fn resize_updates_camera_and_backend_together() {
        let mut ctx = populated(5);
        ctx.resize(1600, 400);
        assert_eq!(ctx.camera.aspect, 4.0);
        assert_eq!(ctx.backend.record.borrow().resizes, vec![(1600, 400)]);

        ctx.resize(0, 400);
        assert_eq!(ctx.camera.aspect, 4.0);
        assert_eq!(ctx.backend.record.borrow().resizes.len(), 1);
    }

    #[test]
    fn mesh_data_keeps_vertex_colors() {
        let g = Geometry::plane(10.0, 10.0, 1, 1).with_color([0.1, 0.2, 0.3, 0.4]);
        let mesh = mesh_data(&g);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.vertices[0].color, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(mesh.indices, g.indices);
    }
}
