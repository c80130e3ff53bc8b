// Copyright @yucwang 2026

use crate::core::config::DEFAULT_MAX_BOUNCES;
use crate::core::integrator::{Integrator, Traceable};
use crate::core::rng::LcgRng;
use crate::math::constants::{ EPSILON, Float, Vector3f, Vector4f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::{gamma_correct, opaque_black, rgb_to_rgba};
use crate::math::warp::{near_zero, random_in_unit_sphere};

// Diffuse bounce loop with a single directional light. Light reaching the sky after
// `i` bounces is weighted by 1/i; paths that never escape are treated as occluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathIntegrator {
    max_bounces: u32,
    scatter_offset: Float,
    bounce_attenuation: Float,
    shade_late_misses: bool,
}

impl Default for PathIntegrator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BOUNCES)
    }
}

impl PathIntegrator {
    pub fn new(max_bounces: u32) -> Self {
        Self {
            max_bounces,
            scatter_offset: EPSILON,
            bounce_attenuation: 1.0,
            shade_late_misses: false,
        }
    }

    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    // Scale applied to the contribution weight after every bounce.
    pub fn with_bounce_attenuation(mut self, attenuation: Float) -> Self {
        self.bounce_attenuation = attenuation;
        self
    }

    // Weight an escaping path by the light factor of the last surface it left.
    pub fn with_late_miss_shading(mut self, enabled: bool) -> Self {
        self.shade_late_misses = enabled;
        self
    }
}

fn light_factor(normal: &Vector3f, light_dir: &Vector3f) -> Float {
    normal.dot(&-light_dir).max(0.1).min(1.0)
}

// A jitter that cancels the normal would leave no direction to follow.
fn scatter_direction(normal: &Vector3f, jitter: &Vector3f) -> Vector3f {
    let scatter = normal + jitter;
    if near_zero(&scatter) {
        *normal
    } else {
        scatter
    }
}

impl Integrator for PathIntegrator {
    fn li(&self, scene: &dyn Traceable, ray: &Ray3f, light_dir: &Vector3f, rng: &mut LcgRng) -> Vector4f {
        let mut ray = *ray;
        let mut color = Vector3f::zeros();
        let mut multiplier: Float = 1.0;
        let mut last_normal = Vector3f::new(0.0, 1.0, 0.0);

        for bounce in 0..self.max_bounces {
            let hit = match scene.trace(&ray) {
                Some(hit) => hit,
                None if bounce == 0 => {
                    let background = scene.environment(&ray.dir())
                        .map(|sky| rgb_to_rgba(&sky, 1.0))
                        .unwrap_or_else(opaque_black);
                    return gamma_correct(&background);
                }
                None => {
                    let mut scale = 1.0 / bounce as Float;
                    if self.shade_late_misses {
                        scale *= light_factor(&last_normal, light_dir);
                    }
                    return gamma_correct(&rgb_to_rgba(&(color * scale), 1.0));
                }
            };

            let normal = hit.normal;
            let scatter = scatter_direction(&normal, &random_in_unit_sphere(rng));
            ray = Ray3f::new(hit.point + normal * self.scatter_offset, scatter, None, None);

            color += hit.color * light_factor(&normal, light_dir) * multiplier;
            multiplier *= self.bounce_attenuation;
            last_normal = normal;
        }

        opaque_black()
    }
}
