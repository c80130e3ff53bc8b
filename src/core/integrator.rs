// Copyright @yucwang 2026

use crate::core::interaction::SurfaceHit;
use crate::core::rng::LcgRng;
use crate::math::constants::{ Vector3f, Vector4f };
use crate::math::ray::Ray3f;

// Anything a ray can be shot into: triangle scenes, analytic sphere lists.
pub trait Traceable: Sync {
    fn trace(&self, ray: &Ray3f) -> Option<SurfaceHit>;

    // Color seen by a primary ray that escapes the scene. None means black.
    fn environment(&self, _dir: &Vector3f) -> Option<Vector3f> {
        None
    }

    fn occluded(&self, ray: &Ray3f) -> bool {
        self.trace(ray).is_some()
    }
}

pub trait Integrator: Sync {
    // Display-ready (gamma-corrected) RGBA for one primary ray.
    fn li(&self, scene: &dyn Traceable, ray: &Ray3f, light_dir: &Vector3f, rng: &mut LcgRng) -> Vector4f;
}
