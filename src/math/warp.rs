// Copyright @yucwang 2023

use super::constants::{ PI, Float, Vector2f, Vector3f };
use crate::core::rng::LcgRng;

// Rejection sampling in the [-1, 1]^3 cube.
pub fn random_in_unit_sphere(rng: &mut LcgRng) -> Vector3f {
    loop {
        let p = Vector3f::new(rng.next_range(-1.0, 1.0),
                              rng.next_range(-1.0, 1.0),
                              rng.next_range(-1.0, 1.0));
        if p.norm_squared() < 1.0 {
            return p;
        }
    }
}

pub fn random_unit_vector(rng: &mut LcgRng) -> Vector3f {
    loop {
        let p = random_in_unit_sphere(rng);
        let len = p.norm();
        if len > 1e-6 {
            return p / len;
        }
    }
}

pub fn near_zero(v: &Vector3f) -> bool {
    const S: Float = 1e-8;
    v.x.abs() < S && v.y.abs() < S && v.z.abs() < S
}

// Uniform sphere parameterization: theta measured from +Z.
pub fn square_to_sphere_angles(u: &Vector2f) -> (Float, Float) {
    let theta = 2.0 * (1.0 - u.x).max(0.0).sqrt().min(1.0).acos();
    let phi = 2.0 * PI * u.y;
    (theta, phi)
}

pub fn spherical_to_direction(theta: Float, phi: Float) -> Vector3f {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

pub fn direction_to_spherical(d: &Vector3f) -> (Float, Float) {
    let theta = d.z.max(-1.0).min(1.0).acos();
    let mut phi = d.y.atan2(d.x);
    if phi < 0.0 {
        phi += 2.0 * PI;
    }
    (theta, phi)
}

// Evenly spread directions on the sphere (golden-angle spiral).
pub fn fibonacci_sphere(count: usize) -> Vec<Vector3f> {
    let golden_angle = PI * (3.0 - (5.0 as Float).sqrt());
    (0..count)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as Float + 0.5) / count as Float;
            let r = (1.0 - z * z).max(0.0).sqrt();
            let phi = golden_angle * i as Float;
            Vector3f::new(r * phi.cos(), r * phi.sin(), z)
        })
        .collect()
}
