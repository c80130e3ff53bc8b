// Copyright @yucwang 2026

use super::samples::ShSampleSet;

use crate::core::integrator::Traceable;
use crate::math::constants::{ FOUR_PI, Float, Vector3f, Vector4f };
use crate::math::ray::Ray3f;
use crate::shapes::triangle_mesh::Vertex;

// Monte Carlo weight of a uniform sphere sample: 1 / pdf = 4 pi, averaged over the set.
pub fn normalization_factor(sample_count: usize) -> Float {
    if sample_count == 0 {
        return 0.0;
    }
    FOUR_PI / sample_count as Float
}

// Shadowed, unit-albedo transfer of one vertex. `out` holds one RGB triple per coefficient.
pub fn project_vertex_transfer(scene: &dyn Traceable,
                               vertex: &Vertex,
                               samples: &ShSampleSet,
                               offset: Float,
                               out: &mut [Vector3f]) {
    let unit_color = Vector3f::new(1.0, 1.0, 1.0);
    let origin = vertex.position + vertex.normal * offset;
    out.iter_mut().for_each(|c| *c = Vector3f::zeros());

    for sample in samples.samples() {
        if vertex.normal.dot(&sample.direction) < 0.0 {
            continue;
        }
        let ray = Ray3f::new(origin, sample.direction, None, None);
        if scene.occluded(&ray) {
            continue;
        }
        for (coeff, basis) in out.iter_mut().zip(&sample.coeffs) {
            *coeff += unit_color * *basis;
        }
    }

    let factor = normalization_factor(samples.len());
    out.iter_mut().for_each(|c| *c *= factor);
}

// Vertex-major: coefficient `i` of vertex `v` lives at `v * count + i`.
pub fn project_transfer(scene: &dyn Traceable,
                        vertices: &[Vertex],
                        samples: &ShSampleSet,
                        offset: Float) -> Vec<Vector3f> {
    let count = samples.coefficient_count();
    let mut coeffs = vec![Vector3f::zeros(); vertices.len() * count];
    for (vertex, out) in vertices.iter().zip(coeffs.chunks_mut(count.max(1))) {
        project_vertex_transfer(scene, vertex, samples, offset, out);
    }
    coeffs
}

// A white disc of `sun_cone_degrees` around +Z. The fourth channel integrates the
// constant 1 and ends up as the total sphere weight.
pub fn project_light(samples: &ShSampleSet, sun_cone_degrees: Float) -> Vec<Vector4f> {
    let cone = sun_cone_degrees.to_radians();
    let mut coeffs = vec![Vector4f::zeros(); samples.coefficient_count()];

    for sample in samples.samples() {
        let value = if sample.theta < cone { Vector3f::new(1.0, 1.0, 1.0) } else { Vector3f::zeros() };
        for (coeff, basis) in coeffs.iter_mut().zip(&sample.coeffs) {
            let res = value * *basis;
            *coeff += Vector4f::new(res.x, res.y, res.z, 1.0);
        }
    }

    let factor = normalization_factor(samples.len());
    coeffs.iter_mut().for_each(|c| *c *= factor);
    coeffs
}
