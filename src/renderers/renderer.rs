// Copyright @yucwang 2021

use crate::core::config::RenderSettings;
use crate::core::error::Result;
use crate::core::resources::{DisplaySurface, GpuResources};
use crate::core::scene::Scene;
use crate::emitters::light::LightSet;
use crate::sensors::perspective::PerspectiveCamera;

// Per-frame inputs that are not owned by the scene.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub camera: &'a PerspectiveCamera,
    pub lights: &'a LightSet,
    pub settings: RenderSettings,
}

pub trait Renderer {
    fn draw(&mut self,
            scene: &mut Scene,
            view: &FrameView<'_>,
            gpu: &mut dyn GpuResources,
            surface: &mut dyn DisplaySurface) -> Result<()>;
}
