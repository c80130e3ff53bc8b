// Copyright @yucwang 2023

use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    v: [Vector3f; 3],
    normal: Vector3f,
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f) -> Self {
        let normal = (p1 - p0).cross(&(p2 - p0))
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3f::zeros);
        Triangle { v: [p0, p1, p2], normal }
    }

    pub fn vertices(&self) -> &[Vector3f; 3] {
        &self.v
    }

    // Precomputed unit face normal, zero for degenerate triangles.
    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal == Vector3f::zeros()
    }

    pub fn transformed(&self, transform: &Transform) -> Triangle {
        Triangle::new(transform.apply_point(self.v[0]),
                      transform.apply_point(self.v[1]),
                      transform.apply_point(self.v[2]))
    }

    pub fn bounding_box(&self) -> AABB {
        AABB::from_points(self.v.iter())
    }

    pub fn centroid(&self) -> Vector3f {
        (self.v[0] + self.v[1] + self.v[2]) / 3.0
    }

    pub fn surface_area(&self) -> Float {
        0.5 * (self.v[1] - self.v[0]).cross(&(self.v[2] - self.v[0])).norm()
    }

    // Plane hit followed by an edge-side test. Returns (t, barycentric).
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<(Float, Vector3f)> {
        let n_dot_dir = self.normal.dot(&ray.dir());
        if n_dot_dir.abs() < 1e-8 {
            return None;
        }

        let plane_d = self.normal.dot(&self.v[0]);
        let t = (plane_d - self.normal.dot(&ray.origin())) / n_dot_dir;
        if !ray.in_range(t) {
            return None;
        }

        let p = ray.at(t);
        if !self.contains(&p) {
            return None;
        }

        Some((t, self.barycentric(&p)))
    }

    fn contains(&self, p: &Vector3f) -> bool {
        let [p0, p1, p2] = self.v;
        let n0 = (p1 - p0).cross(&(p - p0));
        let n1 = (p2 - p1).cross(&(p - p1));
        let n2 = (p0 - p2).cross(&(p - p2));

        n0.dot(&self.normal) >= 0.0 && n1.dot(&self.normal) >= 0.0 && n2.dot(&self.normal) >= 0.0
    }

    pub fn barycentric(&self, p: &Vector3f) -> Vector3f {
        let v0 = self.v[1] - self.v[0];
        let v1 = self.v[2] - self.v[0];
        let v2 = *p - self.v[0];

        let d00 = v0.dot(&v0);
        let d01 = v0.dot(&v1);
        let d11 = v1.dot(&v1);
        let d20 = v2.dot(&v0);
        let d21 = v2.dot(&v1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < 1e-12 {
            return Vector3f::new(1.0, 0.0, 0.0);
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Vector3f::new(1.0 - v - w, v, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Quaternionf;

    fn unit_triangle_at(z: Float) -> Triangle {
        Triangle::new(Vector3f::new(-1.0, -1.0, z),
                      Vector3f::new(1.0, -1.0, z),
                      Vector3f::new(0.0, 1.0, z))
    }

    #[test]
    fn test_bounding_box() {
        let triangle = Triangle::new(Vector3f::new(1.0, 1.0, 1.0),
                                     Vector3f::new(1.5, 4.0, -1.0),
                                     Vector3f::new(-1.0, 2.0, 2.5));
        let bounding_box = triangle.bounding_box();

        assert_eq!(bounding_box.p_min, Vector3f::new(-1.0, 1.0, -1.0));
        assert_eq!(bounding_box.p_max, Vector3f::new(1.5, 4.0, 2.5));
    }

    #[test]
    fn test_precomputed_normal() {
        let triangle = unit_triangle_at(-3.0);
        assert!((triangle.normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);

        let degenerate = Triangle::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(2.0, 0.0, 0.0));
        assert!(degenerate.is_degenerate());
        let ray = Ray3f::new(Vector3f::new(0.5, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(degenerate.ray_intersection(&ray).is_none());
    }

    #[test]
    fn test_ray_intersection_distance() {
        let triangle = unit_triangle_at(-5.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let (t, bary) = triangle.ray_intersection(&ray).expect("expected hit");
        assert!((t - 5.0).abs() < 1e-4);
        assert!((bary.sum() - 1.0).abs() < 1e-5);

        // Oblique ray through the same point: distance is the analytic |(0,0,-5) - o|.
        let origin = Vector3f::new(3.0, 0.0, -1.0);
        let ray = Ray3f::new(origin, Vector3f::new(0.0, 0.0, -5.0) - origin, None, None);
        let (t, _) = triangle.ray_intersection(&ray).expect("expected hit");
        assert!((t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_intersection_miss_and_backwards() {
        let triangle = unit_triangle_at(-5.0);
        let away = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(triangle.ray_intersection(&away).is_none());

        let beside = Ray3f::new(Vector3f::new(5.0, 5.0, 0.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(triangle.ray_intersection(&beside).is_none());

        let short = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), None, Some(4.0));
        assert!(triangle.ray_intersection(&short).is_none());
    }

    #[test]
    fn test_transformed_recomputes_normal() {
        let rotation = Quaternionf::from_axis_angle(&Vector3f::x_axis(), -std::f32::consts::FRAC_PI_2);
        let transform = Transform::from_trs(&Vector3f::new(0.0, 2.0, 0.0), &rotation, &Vector3f::new(1.0, 1.0, 1.0));
        let world = unit_triangle_at(0.0).transformed(&transform);
        assert!((world.normal() - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-5);
        assert!((world.centroid().y - 2.0).abs() < 1e-5);
    }
}
