// Copyright @yucwang 2023

use super::triangle::Triangle;

use crate::core::error::Result;
use crate::io::obj_utils::{self, ObjGeometry};
use crate::math::constants::{ Float, PI, Vector3f };
use crate::math::transform::Transform;

use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector3f,
    pub normal: Vector3f,
}

// Indexed triangle mesh in object space.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    vertices: Vec<Vertex>,
    indices: Vec<[usize; 3]>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<[usize; 3]>) -> Self {
        Self { vertices, indices }
    }

    // Vertex normals from area-weighted face normals.
    pub fn from_positions(positions: Vec<Vector3f>, indices: Vec<[usize; 3]>) -> Self {
        let mut normals = vec![Vector3f::zeros(); positions.len()];
        for [a, b, c] in &indices {
            let face = (positions[*b] - positions[*a]).cross(&(positions[*c] - positions[*a]));
            normals[*a] += face;
            normals[*b] += face;
            normals[*c] += face;
        }

        let vertices = positions
            .into_iter()
            .zip(normals)
            .map(|(position, n)| Vertex {
                position,
                normal: n.try_normalize(1e-12).unwrap_or_else(|| Vector3f::new(0.0, 1.0, 0.0)),
            })
            .collect();
        Self { vertices, indices }
    }

    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let geometry = obj_utils::load_obj_from_file(path)?;
        Ok(Self::from_obj_geometry(geometry))
    }

    pub fn from_obj_str(input: &str) -> Result<Self> {
        let geometry = obj_utils::load_obj_from_str(input)?;
        Ok(Self::from_obj_geometry(geometry))
    }

    fn from_obj_geometry(geometry: ObjGeometry) -> Self {
        let has_normals = geometry.faces.iter().all(|f| f.iter().all(|c| c.normal.is_some()));
        if !has_normals {
            let indices = geometry.faces.iter()
                .map(|f| [f[0].position, f[1].position, f[2].position])
                .collect();
            return Self::from_positions(geometry.positions, indices);
        }

        // One vertex per distinct (position, normal) pair keeps hard edges hard.
        let mut remap: HashMap<(usize, usize), usize> = HashMap::new();
        let mut vertices = Vec::new();
        let mut indices = Vec::with_capacity(geometry.faces.len());
        for face in &geometry.faces {
            let mut tri = [0usize; 3];
            for (slot, corner) in tri.iter_mut().zip(face.iter()) {
                let normal_idx = corner.normal.unwrap_or(0);
                *slot = *remap.entry((corner.position, normal_idx)).or_insert_with(|| {
                    vertices.push(Vertex {
                        position: geometry.positions[corner.position],
                        normal: geometry.normals[normal_idx].normalize(),
                    });
                    vertices.len() - 1
                });
            }
            indices.push(tri);
        }

        Self { vertices, indices }
    }

    pub fn uv_sphere(radius: Float, rings: usize, segments: usize) -> Self {
        let rings = rings.max(2);
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity((rings + 1) * (segments + 1));
        for r in 0..=rings {
            let theta = PI * r as Float / rings as Float;
            for s in 0..=segments {
                let phi = 2.0 * PI * s as Float / segments as Float;
                let normal = Vector3f::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                vertices.push(Vertex { position: normal * radius, normal });
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity(rings * segments * 2);
        for r in 0..rings {
            for s in 0..segments {
                let a = r * stride + s;
                let b = a + stride;
                // Counter-clockwise seen from outside.
                if r != 0 {
                    indices.push([a, a + 1, b]);
                }
                if r != rings - 1 {
                    indices.push([a + 1, b + 1, b]);
                }
            }
        }
        Self { vertices, indices }
    }

    // Square in the XZ plane facing +Y.
    pub fn ground_quad(half_extent: Float) -> Self {
        let h = half_extent;
        let positions = vec![
            Vector3f::new(-h, 0.0, -h),
            Vector3f::new(h, 0.0, -h),
            Vector3f::new(h, 0.0, h),
            Vector3f::new(-h, 0.0, h),
        ];
        Self::from_positions(positions, vec![[0, 2, 1], [0, 3, 2]])
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[[usize; 3]] {
        &self.indices
    }

    pub fn triangles(&self) -> Vec<Triangle> {
        self.indices
            .iter()
            .map(|[a, b, c]| Triangle::new(self.vertices[*a].position,
                                           self.vertices[*b].position,
                                           self.vertices[*c].position))
            .collect()
    }

    pub fn transformed_vertices(&self, transform: &Transform) -> Vec<Vertex> {
        self.vertices
            .iter()
            .map(|v| Vertex {
                position: transform.apply_point(v.position),
                normal: transform.apply_normal(v.normal)
                    .try_normalize(1e-12)
                    .unwrap_or(v.normal),
            })
            .collect()
    }
}
