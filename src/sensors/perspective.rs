// Copyright @yucwang 2026

use nalgebra::{Isometry3, Point3};

use crate::math::constants::{ Float, Matrix4f, Vector3f, Vector4f };
use crate::math::ray::Ray3f;

pub const DEFAULT_FOV_Y_DEGREES: Float = 45.0;
pub const DEFAULT_NEAR_CLIP: Float = 0.1;
pub const DEFAULT_FAR_CLIP: Float = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    position: Vector3f,
    target: Vector3f,
    up: Vector3f,
    fov_y_degrees: Float,
    near_clip: Float,
    far_clip: Float,
}

impl PerspectiveCamera {
    pub fn new(position: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_degrees: Float,
               near_clip: Float,
               far_clip: Float) -> Self {
        Self { position, target, up, fov_y_degrees, near_clip, far_clip }
    }

    pub fn look_at(position: Vector3f, target: Vector3f) -> Self {
        Self::new(position, target, Vector3f::new(0.0, 1.0, 0.0),
                  DEFAULT_FOV_Y_DEGREES, DEFAULT_NEAR_CLIP, DEFAULT_FAR_CLIP)
    }

    pub fn position(&self) -> Vector3f {
        self.position
    }

    pub fn fov_y_degrees(&self) -> Float {
        self.fov_y_degrees
    }

    pub fn near_clip(&self) -> Float {
        self.near_clip
    }

    pub fn far_clip(&self) -> Float {
        self.far_clip
    }

    fn view(&self) -> Isometry3<Float> {
        Isometry3::look_at_rh(&Point3::from(self.position), &Point3::from(self.target), &self.up)
    }

    pub fn view_matrix(&self) -> Matrix4f {
        self.view().to_homogeneous()
    }

    pub fn inverse_view_matrix(&self) -> Matrix4f {
        self.view().inverse().to_homogeneous()
    }

    // Right-handed, depth mapped to [0, 1].
    pub fn projection_matrix(&self, aspect: Float) -> Matrix4f {
        let f = 1.0 / (0.5 * self.fov_y_degrees.to_radians()).tan();
        let (near, far) = (self.near_clip, self.far_clip);
        Matrix4f::new(f / aspect, 0.0, 0.0, 0.0,
                      0.0, f, 0.0, 0.0,
                      0.0, 0.0, far / (near - far), -(far * near) / (far - near),
                      0.0, 0.0, -1.0, 0.0)
    }

    pub fn inverse_projection_matrix(&self, aspect: Float) -> Matrix4f {
        self.projection_matrix(aspect)
            .try_inverse()
            .unwrap_or_else(Matrix4f::identity)
    }

    // Matrices are inverted once per frame, rays are generated per pixel.
    pub fn primary_rays(&self, width: usize, height: usize) -> PrimaryRays {
        let aspect = width.max(1) as Float / height.max(1) as Float;
        PrimaryRays {
            inv_proj: self.inverse_projection_matrix(aspect),
            inv_view: self.view().inverse(),
            position: self.position,
            width: width.max(1) as Float,
            height: height.max(1) as Float,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PrimaryRays {
    inv_proj: Matrix4f,
    inv_view: Isometry3<Float>,
    position: Vector3f,
    width: Float,
    height: Float,
}

impl PrimaryRays {
    // Row 0 is the top of the image.
    pub fn ray(&self, x: usize, y: usize) -> Ray3f {
        let ndc_x = x as Float / self.width * 2.0 - 1.0;
        let ndc_y = 1.0 - y as Float / self.height * 2.0;

        let clip = self.inv_proj * Vector4f::new(ndc_x, ndc_y, 1.0, 1.0);
        let camera_dir = Vector3f::new(clip.x, clip.y, clip.z) / clip.w;
        let world_dir = self.inv_view.transform_vector(&camera_dir.normalize());
        Ray3f::new(self.position, world_dir, None, None)
    }
}
