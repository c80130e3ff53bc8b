// Copyright @yucwang 2026

use crate::core::error::{LumiereError, Result};
use crate::math::constants::{ Float, Quaternionf, Vector3f };

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Point { linear: Float, quadratic: Float },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightSource {
    pub name: String,
    pub kind: LightKind,
    pub position: Vector3f,
    pub rotation: Quaternionf,
    pub color: Vector3f,
}

impl LightSource {
    pub fn directional<S: Into<String>>(name: S, rotation: Quaternionf, color: Vector3f) -> Self {
        Self { name: name.into(), kind: LightKind::Directional, position: Vector3f::zeros(), rotation, color }
    }

    pub fn point<S: Into<String>>(name: S, position: Vector3f, color: Vector3f, linear: Float, quadratic: Float) -> Self {
        Self {
            name: name.into(),
            kind: LightKind::Point { linear, quadratic },
            position,
            rotation: Quaternionf::identity(),
            color,
        }
    }

    pub fn is_directional(&self) -> bool {
        self.kind == LightKind::Directional
    }

    // Lights shine along their local +Z.
    pub fn direction(&self) -> Vector3f {
        self.rotation * Vector3f::new(0.0, 0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LightSet {
    lights: Vec<LightSource>,
}

impl LightSet {
    pub fn new(lights: Vec<LightSource>) -> Self {
        Self { lights }
    }

    pub fn push(&mut self, light: LightSource) {
        self.lights.push(light);
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    pub fn directional(&self) -> Result<Option<&LightSource>> {
        let mut directional = self.lights.iter().filter(|l| l.is_directional());
        let first = directional.next();
        let extra = directional.count();
        if extra > 0 {
            return Err(LumiereError::TooManyDirectionalLights { count: extra + 1 });
        }
        Ok(first)
    }

    pub fn points(&self) -> impl Iterator<Item = &LightSource> + '_ {
        self.lights.iter().filter(|l| !l.is_directional())
    }

    // The light whose orientation drives the path tracer and the SH rotation:
    // the directional light when there is one, otherwise the first light.
    pub fn primary(&self) -> Result<&LightSource> {
        match self.directional()? {
            Some(light) => Ok(light),
            None => self.lights.first().ok_or(LumiereError::NoLights),
        }
    }
}
