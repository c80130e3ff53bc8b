// Copyright @yucwang 2021

use rayon::prelude::*;

use crate::core::config::RenderSettings;
use crate::core::error::{LumiereError, Result};
use crate::core::integrator::{Integrator, Traceable};
use crate::core::resources::{DisplaySurface, GpuResources, TextureHandle};
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::emitters::light::LightSet;
use crate::integrators::path::PathIntegrator;
use crate::math::bitmap::{Bitmap, PixelBuffer};
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::to_rgba8;
use crate::sensors::perspective::PerspectiveCamera;

use super::accumulation::AccumulationBuffer;
pub use super::renderer::{FrameView, Renderer};

pub struct PathTracingRenderer {
    integrator: PathIntegrator,
    accumulation: AccumulationBuffer,
    output: PixelBuffer,
    texture: Option<TextureHandle>,
    frame_index: u64,
}

// Direction the light travels in. Scenes without lights keep tracing with a sun overhead.
pub fn light_direction(lights: &LightSet) -> Result<Vector3f> {
    match lights.primary() {
        Ok(light) => Ok(light.direction().normalize()),
        Err(LumiereError::NoLights) => {
            log::warn!("Scene has no lights, using the default light direction");
            Ok(Vector3f::new(0.0, 1.0, 0.0))
        }
        Err(e) => Err(e),
    }
}

impl PathTracingRenderer {
    pub fn new(width: usize, height: usize, integrator: PathIntegrator) -> Self {
        Self {
            integrator,
            accumulation: AccumulationBuffer::new(width, height),
            output: PixelBuffer::new(width, height),
            texture: None,
            frame_index: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.output.width()
    }

    pub fn height(&self) -> usize {
        self.output.height()
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.accumulation.resize(width, height);
        self.output = PixelBuffer::new(width, height);
        self.texture = None;
    }

    pub fn reset_accumulation(&mut self) {
        self.accumulation.reset();
    }

    pub fn frame_count(&self) -> u32 {
        self.accumulation.frame_count()
    }

    pub fn output(&self) -> &PixelBuffer {
        &self.output
    }

    // Averaged color before quantization.
    pub fn accumulated(&self) -> Bitmap {
        self.accumulation.average()
    }

    // Traces one frame: rows in parallel, pixels within a row in parallel.
    pub fn render_frame(&mut self,
                        scene: &dyn Traceable,
                        camera: &PerspectiveCamera,
                        light_dir: &Vector3f,
                        settings: &RenderSettings) {
        let (width, height) = (self.width(), self.height());
        if width == 0 || height == 0 {
            return;
        }

        let frame_count = self.accumulation.begin_frame(settings.use_accumulation);
        let inv_count = 1.0 / frame_count as Float;
        let integrator = self.integrator.with_max_bounces(settings.max_bounces);
        let rays = camera.primary_rays(width, height);
        let seed = settings.seed;
        let frame = self.frame_index;

        let sums = self.accumulation.sums_mut();
        let bytes = self.output.as_bytes_mut();
        sums.par_chunks_mut(width)
            .zip(bytes.par_chunks_mut(width * PixelBuffer::CHANNELS))
            .enumerate()
            .for_each(|(y, (sum_row, out_row))| {
                sum_row.par_iter_mut()
                    .zip(out_row.par_chunks_mut(PixelBuffer::CHANNELS))
                    .enumerate()
                    .for_each(|(x, (sum, out))| {
                        let mut rng = LcgRng::for_pixel(seed, frame, (y * width + x) as u64);
                        *sum += integrator.li(scene, &rays.ray(x, y), light_dir, &mut rng);
                        out.copy_from_slice(&to_rgba8(&(*sum * inv_count)));
                    });
            });

        self.frame_index += 1;
        log::debug!("Traced frame {} ({} accumulated)", frame, frame_count);
    }
}

impl Renderer for PathTracingRenderer {
    fn draw(&mut self,
            scene: &mut Scene,
            view: &FrameView<'_>,
            gpu: &mut dyn GpuResources,
            surface: &mut dyn DisplaySurface) -> Result<()> {
        scene.prepare_acceleration(view.settings.bvh_max_leaf_size);
        let light_dir = light_direction(view.lights)?;
        self.render_frame(&*scene, view.camera, &light_dir, &view.settings);

        let texture = match self.texture {
            Some(texture) => texture,
            None => {
                let texture = gpu.create_texture(self.width(), self.height());
                self.texture = Some(texture);
                texture
            }
        };
        gpu.upload_texture(texture, &self.output)?;
        surface.present(&self.output)
    }
}
