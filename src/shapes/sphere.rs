// Copyright @yucwang 2023

use crate::core::integrator::Traceable;
use crate::core::interaction::SurfaceHit;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub origin: Vector3f,
    pub radius: Float,
    pub color: Vector3f,
}

impl Sphere {
    pub fn new(origin: Vector3f, radius: Float, color: Vector3f) -> Self {
        Self { origin, radius, color }
    }

    // Closest root of |o + t*d - c|^2 = r^2 inside the ray's range.
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.origin;
        let b = oc.dot(&ray.dir());
        let c = oc.norm_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        [-b - sqrt_d, -b + sqrt_d].into_iter().find(|t| ray.in_range(*t))
    }

    pub fn normal_at(&self, p: &Vector3f) -> Vector3f {
        (p - self.origin) / self.radius
    }
}

// Sphere list lit by a vertical sky gradient.
#[derive(Debug, Clone, Default)]
pub struct SphereScene {
    spheres: Vec<Sphere>,
}

impl SphereScene {
    pub fn new(spheres: Vec<Sphere>) -> Self {
        Self { spheres }
    }

    // Red ball, blue ball and a large green ground sphere.
    pub fn showcase() -> Self {
        Self::new(vec![
            Sphere::new(Vector3f::new(0.0, 0.0, 0.0), 5.0, Vector3f::new(1.0, 0.0, 0.0)),
            Sphere::new(Vector3f::new(15.0, 0.0, 0.0), 5.0, Vector3f::new(0.0, 0.2, 0.5)),
            Sphere::new(Vector3f::new(0.0, -50.0, 0.0), 45.0, Vector3f::new(0.0, 1.0, 0.0)),
        ])
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn push(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }
}

impl Traceable for SphereScene {
    fn trace(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        let mut closest: Option<(Float, &Sphere)> = None;
        for sphere in &self.spheres {
            if let Some(t) = sphere.ray_intersection(ray) {
                if closest.map_or(true, |(best, _)| t < best) {
                    closest = Some((t, sphere));
                }
            }
        }

        closest.map(|(distance, sphere)| {
            let point = ray.at(distance);
            SurfaceHit { distance, point, normal: sphere.normal_at(&point), color: sphere.color }
        })
    }

    fn environment(&self, dir: &Vector3f) -> Option<Vector3f> {
        let a = 0.5 * (dir.y + 1.0);
        Some(Vector3f::new(1.0, 1.0, 1.0) * (1.0 - a) + Vector3f::new(0.5, 0.7, 1.0) * a)
    }
}
