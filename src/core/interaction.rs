// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector3f };
use crate::shapes::triangle::Triangle;

// Closest-hit record. A payload is a hit exactly when its distance is finite.
#[derive(Debug, Clone, Copy)]
pub struct HitPayload<'a> {
    pub distance: Float,
    pub triangle: Option<&'a Triangle>,
    pub triangle_index: usize,
    pub barycentric: Vector3f,
}

impl<'a> Default for HitPayload<'a> {
    fn default() -> Self {
        Self {
            distance: std::f32::INFINITY,
            triangle: None,
            triangle_index: 0,
            barycentric: Vector3f::zeros(),
        }
    }
}

impl<'a> HitPayload<'a> {
    pub fn is_hit(&self) -> bool {
        self.distance.is_finite()
    }

    pub fn normal(&self) -> Option<Vector3f> {
        self.triangle.map(|t| t.normal())
    }
}

// What the integrator needs to know about a surface, independent of the geometry type.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit {
    pub distance: Float,
    pub point: Vector3f,
    pub normal: Vector3f,
    pub color: Vector3f,
}
