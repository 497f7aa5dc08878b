//! Scene graph: the flat list of generated objects the renderer draws.

use bytemuck::{Pod, Zeroable};
use engine_core::Transform;
use glam::Vec3;

use crate::mesh::MeshData;
use crate::vertex::StarInstance;

/// Stable handle for a scene object and its GPU resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Shading model of an object. Each variant maps to one pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Soft additive sprites spun about the view axis.
    Stars { angular_speed: f32 },
    /// Rippled additive plane blending two colors.
    Nebula { color_a: Vec3, color_b: Vec3, opacity: f32 },
    /// Flat-shaded, fogged, depth-writing silhouette. Color comes from the vertices.
    Mountain,
    /// Rim glow on the inside of a sphere.
    Atmosphere { tint: Vec3 },
}

impl Material {
    /// Draw bucket: lower buckets are drawn first. Depth-writing mountains
    /// lead; the additive layers after them are depth tested against the
    /// silhouettes.
    pub fn draw_order(&self) -> u8 {
        match self {
            Material::Mountain => 0,
            Material::Atmosphere { .. } => 1,
            Material::Stars { .. } => 2,
            Material::Nebula { .. } => 3,
        }
    }
}

/// CPU geometry of a scene object, uploaded once.
#[derive(Debug, Clone)]
pub enum SceneGeometry {
    Surface(MeshData),
    Stars(Vec<StarInstance>),
}

/// One generated object: geometry, material, transform and its time uniform.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub material: Material,
    pub geometry: SceneGeometry,
    pub transform: Transform,
    /// Shader time in seconds, written every frame by the animation clock.
    pub time: f32,
    /// Index into the mountain layer table for layered objects.
    pub layer: Option<usize>,
}

impl SceneObject {
    pub fn new(id: ObjectId, name: impl Into<String>, material: Material, geometry: SceneGeometry) -> Self {
        Self {
            id,
            name: name.into(),
            material,
            geometry,
            transform: Transform::default(),
            time: 0.0,
            layer: None,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_layer(mut self, layer: usize) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Per-object uniform for this frame.
    pub fn uniform(&self) -> ObjectUniform {
        let (color_a, color_b, speed_or_opacity) = match self.material {
            Material::Stars { angular_speed } => (Vec3::ONE, Vec3::ONE, angular_speed),
            Material::Nebula { color_a, color_b, opacity } => (color_a, color_b, opacity),
            Material::Mountain => (Vec3::ONE, Vec3::ONE, 1.0),
            Material::Atmosphere { tint } => (tint, tint, 1.0),
        };
        ObjectUniform {
            model: self.transform.to_matrix().to_cols_array_2d(),
            color_a: color_a.extend(1.0).to_array(),
            color_b: color_b.extend(1.0).to_array(),
            params: [self.time, speed_or_opacity, 0.0, 0.0],
        }
    }
}

/// Per-object uniform (must match `Object` in every scene shader).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color_a: [f32; 4],
    pub color_b: [f32; 4],
    /// x = time, y = angular speed (stars) or opacity (nebula), zw unused.
    pub params: [f32; 4],
}

/// Owns every object in the view.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh object id.
    pub fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.next_id = self.next_id.max(id.0 + 1);
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Objects in draw order. Mountains are sorted far to near; other buckets
    /// keep insertion order.
    pub fn draw_list(&self) -> Vec<&SceneObject> {
        let mut list: Vec<&SceneObject> = self.objects.iter().collect();
        list.sort_by(|a, b| {
            a.material.draw_order().cmp(&b.material.draw_order()).then_with(|| {
                if matches!(a.material, Material::Mountain) {
                    a.transform.position.z.total_cmp(&b.transform.position.z)
                } else {
                    std::cmp::Ordering::Equal
                }
            })
        });
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(scene: &mut Scene, material: Material, z: f32) -> ObjectId {
        let id = scene.allocate_id();
        scene.add(
            SceneObject::new(id, "obj", material, SceneGeometry::Stars(Vec::new()))
                .with_position(Vec3::new(0.0, 0.0, z)),
        )
    }

    #[test]
    fn ids_are_unique() {
        let mut scene = Scene::new();
        let a = object(&mut scene, Material::Mountain, 0.0);
        let b = object(&mut scene, Material::Mountain, 0.0);
        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn draw_list_orders_buckets_and_mountains_far_to_near() {
        let mut scene = Scene::new();
        let near = object(&mut scene, Material::Mountain, -50.0);
        let far = object(&mut scene, Material::Mountain, -200.0);
        let stars = object(&mut scene, Material::Stars { angular_speed: 0.05 }, 0.0);
        let atmo = object(&mut scene, Material::Atmosphere { tint: Vec3::ONE }, 0.0);
        let nebula = object(
            &mut scene,
            Material::Nebula { color_a: Vec3::X, color_b: Vec3::Y, opacity: 0.3 },
            -1050.0,
        );

        let order: Vec<ObjectId> = scene.draw_list().iter().map(|o| o.id).collect();
        assert_eq!(order, vec![far, near, atmo, stars, nebula]);
    }

    #[test]
    fn stars_in_front_of_mountains_are_drawn_after_them() {
        let mut scene = Scene::new();
        let stars = object(&mut scene, Material::Stars { angular_speed: 0.05 }, -20.0);
        let mountains: Vec<ObjectId> = [-50.0, -100.0, -150.0, -200.0]
            .into_iter()
            .map(|z| object(&mut scene, Material::Mountain, z))
            .collect();

        let order: Vec<ObjectId> = scene.draw_list().iter().map(|o| o.id).collect();
        let star_pos = order.iter().position(|id| *id == stars).unwrap();
        for id in &mountains {
            let mountain_pos = order.iter().position(|o| o == id).unwrap();
            assert!(mountain_pos < star_pos, "{id:?} drawn after stars");
        }
    }

    #[test]
    fn uniform_carries_time_and_material_params() {
        let mut obj = SceneObject::new(
            ObjectId(0),
            "nebula",
            Material::Nebula { color_a: Vec3::X, color_b: Vec3::Z, opacity: 0.3 },
            SceneGeometry::Surface(MeshData::new()),
        );
        obj.time = 2.5;
        let u = obj.uniform();
        assert_eq!(u.params[0], 2.5);
        assert_eq!(u.params[1], 0.3);
        assert_eq!(u.color_b, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 112);
    }
}
