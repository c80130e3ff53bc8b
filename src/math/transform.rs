// Copyright 2020 @TwoCookingMice

use super::constants::{ Matrix3f, Matrix4f, Quaternionf, Vector3f, Vector4f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix,
               inv_matrix: matrix.try_inverse().unwrap_or_else(Matrix4f::identity) }
    }

    // Scale first, then rotate, then translate.
    pub fn from_trs(translate: &Vector3f, rotation: &Quaternionf, scale: &Vector3f) -> Self {
        let matrix = Matrix4f::new_translation(translate)
            * rotation.to_homogeneous()
            * Matrix4f::new_nonuniform_scaling(scale);
        Self::new(matrix)
    }

    pub fn matrix(&self) -> &Matrix4f {
        &self.matrix
    }

    pub fn inverse_matrix(&self) -> &Matrix4f {
        &self.inv_matrix
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        let h = self.matrix * Vector4f::new(p.x, p.y, p.z, 1.0);
        Vector3f::new(h.x / h.w, h.y / h.w, h.z / h.w)
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        upper_3x3(&self.matrix) * v
    }

    // Normals go through the inverse transpose so that n^T x = 0 survives the transform.
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        upper_3x3(&self.inv_matrix).transpose() * n
    }
}

fn upper_3x3(m: &Matrix4f) -> Matrix3f {
    Matrix3f::from_fn(|r, c| m[(r, c)])
}
