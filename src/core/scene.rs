// Copyright @yucwang 2026

use std::sync::{Arc, Weak};

use crate::core::bvh::AccelerationStructure;
use crate::core::integrator::Traceable;
use crate::core::interaction::{HitPayload, SurfaceHit};
use crate::core::resources::BufferHandle;
use crate::math::constants::{ Matrix4f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;
use crate::shapes::triangle::Triangle;
use crate::shapes::triangle_mesh::{TriangleMesh, Vertex};

// Scene-graph object that owns render commands. Only its placement is needed here.
pub trait Drawable: Send + Sync {
    fn name(&self) -> &str;
    fn model_matrix(&self) -> Matrix4f;
}

#[derive(Debug, Clone)]
pub struct StaticDrawable {
    name: String,
    transform: Transform,
}

impl StaticDrawable {
    pub fn new<S: Into<String>>(name: S, transform: Transform) -> Self {
        Self { name: name.into(), transform }
    }

    pub fn identity<S: Into<String>>(name: S) -> Self {
        Self::new(name, Transform::default())
    }
}

impl Drawable for StaticDrawable {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_matrix(&self) -> Matrix4f {
        *self.transform.matrix()
    }
}

pub struct RenderCommand {
    owner: Weak<dyn Drawable>,
    mesh: TriangleMesh,
    triangles: Vec<Triangle>,
    override_color: Vector3f,
    acceleration: AccelerationStructure,
    transfer_coeffs: Vec<Vector3f>,
    coeffs_buffer: Option<BufferHandle>,
}

impl RenderCommand {
    pub fn new(owner: &Arc<dyn Drawable>, mesh: TriangleMesh, override_color: Vector3f) -> Self {
        let triangles = mesh.triangles();
        Self {
            owner: Arc::downgrade(owner),
            mesh,
            triangles,
            override_color,
            acceleration: AccelerationStructure::new(),
            transfer_coeffs: Vec::new(),
            coeffs_buffer: None,
        }
    }

    pub fn owner(&self) -> Option<Arc<dyn Drawable>> {
        self.owner.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.owner.strong_count() > 0
    }

    pub fn is_traceable(&self) -> bool {
        !self.triangles.is_empty()
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    pub fn override_color(&self) -> Vector3f {
        self.override_color
    }

    pub fn acceleration(&self) -> &AccelerationStructure {
        &self.acceleration
    }

    // Geometry moved or was replaced: the next prepare pass rebuilds the tree.
    pub fn invalidate(&mut self) {
        self.acceleration.invalidate();
    }

    pub fn world_vertices(&self) -> Option<Vec<Vertex>> {
        self.owner()
            .map(|owner| self.mesh.transformed_vertices(&Transform::new(owner.model_matrix())))
    }

    pub fn transfer_coeffs(&self) -> &[Vector3f] {
        &self.transfer_coeffs
    }

    pub fn set_transfer_coeffs(&mut self, coeffs: Vec<Vector3f>) {
        self.transfer_coeffs = coeffs;
    }

    pub fn coeffs_buffer(&self) -> Option<BufferHandle> {
        self.coeffs_buffer
    }

    pub fn set_coeffs_buffer(&mut self, handle: BufferHandle) {
        self.coeffs_buffer = Some(handle);
    }

    fn prepare(&mut self, max_leaf_size: usize) {
        if !self.is_traceable() || self.acceleration.is_valid() {
            return;
        }
        let owner = match self.owner.upgrade() {
            Some(owner) => owner,
            None => {
                log::debug!("Skipping render command with expired owner");
                return;
            }
        };

        let model = Transform::new(owner.model_matrix());
        let world: Vec<Triangle> = self.triangles.iter().map(|t| t.transformed(&model)).collect();
        log::debug!("Building BVH for '{}' ({} triangles)", owner.name(), world.len());
        self.acceleration.build(world, max_leaf_size);
    }
}

// Closest hit across all commands plus the winning command's color.
#[derive(Debug, Clone, Copy)]
pub struct SceneHit<'a> {
    pub payload: HitPayload<'a>,
    pub color: Vector3f,
}

#[derive(Default)]
pub struct Scene {
    commands: Vec<RenderCommand>,
    environment: Option<Vector3f>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut [RenderCommand] {
        &mut self.commands
    }

    pub fn set_environment(&mut self, color: Option<Vector3f>) {
        self.environment = color;
    }

    // Lazy single-threaded build; commands already built are left alone.
    pub fn prepare_acceleration(&mut self, max_leaf_size: usize) {
        for command in &mut self.commands {
            command.prepare(max_leaf_size);
        }
    }

    pub fn trace(&self, ray: &Ray3f) -> Option<SceneHit<'_>> {
        let mut best: Option<SceneHit<'_>> = None;
        for command in &self.commands {
            if !command.is_traceable() || !command.acceleration.is_valid() {
                continue;
            }
            if !command.is_alive() {
                log::debug!("Skipping render command with expired owner");
                continue;
            }

            let mut payload = HitPayload::default();
            if !command.acceleration.trace(ray, &mut payload) {
                continue;
            }
            if best.map_or(true, |b| payload.distance < b.payload.distance) {
                best = Some(SceneHit { payload, color: command.override_color });
            }
        }
        best
    }
}

impl Traceable for Scene {
    fn trace(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        let hit = Scene::trace(self, ray)?;
        let normal = hit.payload.normal()?;
        Some(SurfaceHit {
            distance: hit.payload.distance,
            point: ray.at(hit.payload.distance),
            normal,
            color: hit.color,
        })
    }

    fn environment(&self, _dir: &Vector3f) -> Option<Vector3f> {
        self.environment
    }

    fn occluded(&self, ray: &Ray3f) -> bool {
        self.commands
            .iter()
            .filter(|c| c.is_traceable() && c.is_alive())
            .any(|c| c.acceleration.occluded(ray))
    }
}
