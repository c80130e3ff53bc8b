// Copyright @yucwang 2026

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::config::ShSettings;
use crate::core::error::Result;
use crate::core::resources::{DisplaySurface, GpuResources};
use crate::core::scene::Scene;
use crate::emitters::light::{LightKind, LightSet};
use crate::math::constants::{ Float, Vector3f, Vector4f };
use crate::sh::projection::{project_light, project_vertex_transfer};
use crate::sh::rotation::ShRotation;
use crate::sh::samples::ShSampleSet;

use super::renderer::{FrameView, Renderer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedPointLight {
    pub position: Vector4f,
    pub color: Vector4f,
    pub linear: Float,
    pub quadratic: Float,
}

// Frame-constant lighting data handed to the shading pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingConstants {
    pub use_directional_light: bool,
    pub directional_light_direction: Vector3f,
    pub point_lights: Vec<PackedPointLight>,
    pub light_coeffs: Vec<Vector4f>,
}

pub struct ShLightingRenderer {
    settings: ShSettings,
    bvh_max_leaf_size: usize,
    light_coeffs: Vec<Vector4f>,
    rotation: ShRotation,
    initialized: bool,
    constants: Option<LightingConstants>,
}

impl ShLightingRenderer {
    pub fn new(settings: ShSettings) -> Self {
        Self {
            settings,
            bvh_max_leaf_size: 4,
            light_coeffs: Vec::new(),
            rotation: ShRotation::new(settings.bands),
            initialized: false,
            constants: None,
        }
    }

    pub fn settings(&self) -> &ShSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn light_coeffs(&self) -> &[Vector4f] {
        &self.light_coeffs
    }

    pub fn constants(&self) -> Option<&LightingConstants> {
        self.constants.as_ref()
    }

    // One-time precompute: per-vertex shadowed transfer for every live command, uploaded
    // as `vertexCount * basisCount * 3` floats, then the sun's light coefficients.
    pub fn init_gi(&mut self, scene: &mut Scene, gpu: &mut dyn GpuResources) -> Result<()> {
        let samples = ShSampleSet::from_settings(&self.settings);
        let coefficient_count = samples.coefficient_count();

        log::info!("Building BVH");
        scene.prepare_acceleration(self.bvh_max_leaf_size);

        let world_vertices: Vec<_> = scene.commands()
            .iter()
            .map(|command| {
                let vertices = command.world_vertices();
                if vertices.is_none() {
                    log::debug!("Skipping SH transfer for render command with expired owner");
                }
                vertices
            })
            .collect();
        let total: usize = world_vertices.iter().flatten().map(|v| v.len()).sum();
        log::info!("Tracing SH transfer: {} vertices, {} samples each", total, samples.len());

        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} vertices")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut transfers = Vec::with_capacity(world_vertices.len());
        for vertices in &world_vertices {
            let vertices = match vertices {
                Some(vertices) if !vertices.is_empty() => vertices,
                _ => {
                    transfers.push(None);
                    continue;
                }
            };

            let mut coeffs = vec![Vector3f::zeros(); vertices.len() * coefficient_count];
            for (vertex, out) in vertices.iter().zip(coeffs.chunks_mut(coefficient_count.max(1))) {
                project_vertex_transfer(&*scene, vertex, &samples, self.settings.transfer_offset, out);
                progress.inc(1);
            }
            transfers.push(Some(coeffs));
        }
        progress.finish_and_clear();

        for (command, coeffs) in scene.commands_mut().iter_mut().zip(transfers) {
            let coeffs = match coeffs {
                Some(coeffs) => coeffs,
                None => continue,
            };
            let flat: Vec<f32> = coeffs.iter().flat_map(|c| [c.x, c.y, c.z]).collect();
            let handle = gpu.create_buffer(flat.len() * std::mem::size_of::<f32>());
            gpu.upload_buffer(handle, &flat)?;
            command.set_transfer_coeffs(coeffs);
            command.set_coeffs_buffer(handle);
        }

        log::info!("Projecting SH light");
        self.light_coeffs = project_light(&samples, self.settings.sun_cone_degrees);
        self.initialized = true;
        Ok(())
    }

    // The lights' frame constants and the sun coefficients rotated by the primary light.
    pub fn lighting_constants(&self, lights: &LightSet) -> Result<LightingConstants> {
        let directional = lights.directional()?;
        let primary = lights.primary()?;

        let point_lights = lights
            .points()
            .filter_map(|light| match light.kind {
                LightKind::Point { linear, quadratic } => Some(PackedPointLight {
                    position: Vector4f::new(light.position.x, light.position.y, light.position.z, 0.0),
                    color: Vector4f::new(light.color.x, light.color.y, light.color.z, 0.0),
                    linear,
                    quadratic,
                }),
                LightKind::Directional => None,
            })
            .collect();

        Ok(LightingConstants {
            use_directional_light: directional.is_some(),
            directional_light_direction: directional
                .map(|light| light.direction().normalize())
                .unwrap_or_else(Vector3f::zeros),
            point_lights,
            light_coeffs: self.rotation.rotate(&primary.rotation, &self.light_coeffs),
        })
    }
}

impl Renderer for ShLightingRenderer {
    // Shading itself happens in the raster pass; this keeps its inputs current.
    fn draw(&mut self,
            scene: &mut Scene,
            view: &FrameView<'_>,
            gpu: &mut dyn GpuResources,
            _surface: &mut dyn DisplaySurface) -> Result<()> {
        if !self.initialized {
            self.bvh_max_leaf_size = view.settings.bvh_max_leaf_size;
            self.init_gi(scene, gpu)?;
        }
        self.constants = Some(self.lighting_constants(view.lights)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RenderSettings;
    use crate::core::error::LumiereError;
    use crate::core::resources::{HostResources, HostSurface};
    use crate::core::scene::{Drawable, RenderCommand, StaticDrawable};
    use crate::emitters::light::LightSource;
    use crate::math::constants::Quaternionf;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::shapes::triangle_mesh::TriangleMesh;
    use std::sync::Arc;

    fn small_settings() -> ShSettings {
        ShSettings { sqrt_sample_count: 8, ..ShSettings::default() }
    }

    fn ground_scene(owner: &Arc<dyn Drawable>) -> Scene {
        let mut scene = Scene::new();
        scene.add_command(RenderCommand::new(owner, TriangleMesh::ground_quad(2.0), Vector3f::new(1.0, 1.0, 1.0)));
        scene
    }

    #[test]
    fn test_init_gi_uploads_transfer_buffers() {
        let owner: Arc<dyn Drawable> = Arc::new(StaticDrawable::identity("ground"));
        let mut scene = ground_scene(&owner);
        let mut gpu = HostResources::new();
        let mut renderer = ShLightingRenderer::new(small_settings());
        renderer.init_gi(&mut scene, &mut gpu).expect("init_gi failed");
        assert!(renderer.is_initialized());

        let command = &scene.commands()[0];
        assert_eq!(command.transfer_coeffs().len(), 4 * 9);
        let handle = command.coeffs_buffer().expect("coefficient buffer");
        let uploaded = gpu.buffer(handle).expect("uploaded buffer");
        assert_eq!(uploaded.len(), 4 * 9 * 3);
        assert_eq!(uploaded[0], command.transfer_coeffs()[0].x);

        // An open ground plane sees its whole upper hemisphere.
        let expected = 2.0 * crate::math::constants::PI * 0.282_095;
        assert!((command.transfer_coeffs()[0].x - expected).abs() < 0.1 * expected);
        assert_eq!(renderer.light_coeffs().len(), 9);
    }

    #[test]
    fn test_expired_commands_are_skipped() {
        let owner: Arc<dyn Drawable> = Arc::new(StaticDrawable::identity("ground"));
        let mut scene = ground_scene(&owner);
        drop(owner);

        let mut gpu = HostResources::new();
        let mut renderer = ShLightingRenderer::new(small_settings());
        renderer.init_gi(&mut scene, &mut gpu).expect("init_gi failed");
        assert!(scene.commands()[0].transfer_coeffs().is_empty());
        assert!(scene.commands()[0].coeffs_buffer().is_none());
    }

    #[test]
    fn test_lighting_constants() {
        let mut renderer = ShLightingRenderer::new(small_settings());
        let owner: Arc<dyn Drawable> = Arc::new(StaticDrawable::identity("ground"));
        let mut scene = ground_scene(&owner);
        renderer.init_gi(&mut scene, &mut HostResources::new()).expect("init_gi failed");

        let identity = LightSet::new(vec![
            LightSource::point("lamp", Vector3f::new(1.0, 2.0, 3.0), Vector3f::new(1.0, 0.5, 0.25), 0.09, 0.032),
            LightSource::directional("sun", Quaternionf::identity(), Vector3f::new(1.0, 1.0, 1.0)),
        ]);
        let constants = renderer.lighting_constants(&identity).expect("constants");
        assert!(constants.use_directional_light);
        assert!((constants.directional_light_direction - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        assert_eq!(constants.point_lights.len(), 1);
        assert_eq!(constants.point_lights[0].position, Vector4f::new(1.0, 2.0, 3.0, 0.0));
        assert_eq!(constants.point_lights[0].quadratic, 0.032);
        for (a, b) in constants.light_coeffs.iter().zip(renderer.light_coeffs()) {
            assert!((a - b).norm() < 1e-4);
        }

        let lamps_only = LightSet::new(vec![
            LightSource::point("lamp", Vector3f::zeros(), Vector3f::new(1.0, 1.0, 1.0), 0.0, 1.0),
        ]);
        let constants = renderer.lighting_constants(&lamps_only).expect("constants");
        assert!(!constants.use_directional_light);
        assert_eq!(constants.directional_light_direction, Vector3f::zeros());

        assert!(matches!(renderer.lighting_constants(&LightSet::default()), Err(LumiereError::NoLights)));
    }

    #[test]
    fn test_draw_initializes_once() {
        let owner: Arc<dyn Drawable> = Arc::new(StaticDrawable::identity("ground"));
        let mut scene = ground_scene(&owner);
        let camera = PerspectiveCamera::look_at(Vector3f::new(0.0, 3.0, 5.0), Vector3f::zeros());
        let lights = LightSet::new(vec![
            LightSource::directional("sun", Quaternionf::from_axis_angle(&Vector3f::x_axis(), 0.5), Vector3f::new(1.0, 1.0, 1.0)),
        ]);
        let view = FrameView { camera: &camera, lights: &lights, settings: RenderSettings::default() };

        let mut gpu = HostResources::new();
        let mut surface = HostSurface::new();
        let mut renderer = ShLightingRenderer::new(small_settings());
        renderer.draw(&mut scene, &view, &mut gpu, &mut surface).expect("draw failed");
        let handle = scene.commands()[0].coeffs_buffer();
        renderer.draw(&mut scene, &view, &mut gpu, &mut surface).expect("draw failed");
        assert_eq!(scene.commands()[0].coeffs_buffer(), handle);
        assert!(renderer.constants().is_some());
        assert_eq!(surface.presented_count(), 0);
    }
}
