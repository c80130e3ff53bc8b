// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, FLOAT_MIN, FLOAT_MAX };
use super::ray::{ Ray3f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

impl Default for AABB {
    fn default() -> Self {
        Self { p_min: Vector3f::new(FLOAT_MAX, FLOAT_MAX, FLOAT_MAX),
               p_max: Vector3f::new(FLOAT_MIN, FLOAT_MIN, FLOAT_MIN) }
    }
}

impl AABB {
    pub fn new(a: Vector3f, b: Vector3f) -> Self {
        Self { p_min: a.inf(&b), p_max: a.sup(&b) }
    }

    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vector3f>,
    {
        let mut bounds = Self::default();
        for p in points {
            bounds.expand_by_point(p);
        }
        bounds
    }

    pub fn center(&self) -> Vector3f {
        0.5 * (self.p_min + self.p_max)
    }

    pub fn expand_by_point(&mut self, p: &Vector3f) {
        self.p_min = self.p_min.inf(p);
        self.p_max = self.p_max.sup(p);
    }

    pub fn expand_by_aabb(&mut self, other: &AABB) {
        self.p_min = self.p_min.inf(&other.p_min);
        self.p_max = self.p_max.sup(&other.p_max);
    }

    // Slab test clipped to the ray's [min_t, max_t]. Returns the entry distance.
    pub fn ray_entry(&self, ray: &Ray3f, max_t: Float) -> Option<Float> {
        if !self.is_valid() {
            return None;
        }

        let o = ray.origin();
        let d = ray.dir();
        let mut t_min = ray.min_t;
        let mut t_max = max_t.min(ray.max_t);

        for idx in 0..3 {
            if d[idx].abs() < 1e-8 {
                if o[idx] < self.p_min[idx] || o[idx] > self.p_max[idx] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d[idx];
            let mut t0 = (self.p_min[idx] - o[idx]) * inv;
            let mut t1 = (self.p_max[idx] - o[idx]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }

        Some(t_min)
    }

    pub fn ray_intersect(&self, ray: &Ray3f) -> bool {
        self.ray_entry(ray, ray.max_t).is_some()
    }

    pub fn surface_area(&self) -> Float {
        if !self.is_valid() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn max_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    pub fn is_valid(&self) -> bool {
        (0..3).all(|idx| self.p_min[idx] <= self.p_max[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::AABB;
    use super::Ray3f;
    use super::Vector3f;

    #[test]
    fn test_aabb_geometry() {
        let mut bbox = AABB::new(Vector3f::new(1.0, 7.0, 3.0), Vector3f::new(4.0, 4.0, 4.0));
        assert_eq!(bbox.p_min, Vector3f::new(1.0, 4.0, 3.0));
        assert_eq!(bbox.p_max, Vector3f::new(4.0, 7.0, 4.0));
        assert!((bbox.center() - Vector3f::new(2.5, 5.5, 3.5)).norm() < 1e-6);
        assert!((bbox.surface_area() - 30.0).abs() < 1e-5);

        bbox.expand_by_point(&Vector3f::new(-1.0, 5.0, 6.0));
        assert_eq!(bbox.p_min.x, -1.0);
        assert_eq!(bbox.p_max.z, 6.0);
        assert_eq!(bbox.max_extent(), 0);

        let mut empty = AABB::default();
        assert!(!empty.is_valid());
        assert_eq!(empty.surface_area(), 0.0);
        empty.expand_by_aabb(&bbox);
        assert_eq!(empty, bbox);
    }

    #[test]
    fn test_aabb_intersect() {
        let bbox = AABB::new(Vector3f::new(-1.0, -1.0, -1.0),
                             Vector3f::new(1.0, 1.0, 1.0));

        let inside = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 1.0, 1.0), None, Some(1.0));
        assert!(bbox.ray_intersect(&inside));

        let outside = Ray3f::new(Vector3f::new(-1.1, 0.0, 0.0), Vector3f::new(-0.1, 10.0, 10.0), None, None);
        assert!(!bbox.ray_intersect(&outside));

        let towards = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let entry = bbox.ray_entry(&towards, std::f32::INFINITY).expect("expected entry");
        assert!((entry - 4.0).abs() < 1e-5);
        assert!(bbox.ray_entry(&towards, 3.0).is_none());
    }
}
