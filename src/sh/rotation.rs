// Copyright @yucwang 2026

use super::basis;

use crate::math::constants::{ Float, MatrixXF, Quaternionf, Vector3f, Vector4f };
use crate::math::warp::{direction_to_spherical, fibonacci_sphere};

// Band-by-band rotation of SH coefficient vectors.
//
// A rotated band-l function is still a band-l function, so each band is re-fit by
// least squares from point evaluations of the rotated function on a fixed set of
// directions. The fit matrices are computed once; a rotation costs one basis
// evaluation per direction plus a few small matrix products.
pub struct ShRotation {
    bands: usize,
    directions: Vec<Vector3f>,
    // Per band: (2l + 1) x directions, the pseudo-inverse of the basis matrix.
    projectors: Vec<MatrixXF>,
}

impl ShRotation {
    pub fn new(bands: usize) -> Self {
        let directions = fibonacci_sphere((8 * bands * bands).max(64));
        let projectors = (0..bands as i32)
            .map(|l| {
                let a = band_matrix(l, directions.iter().copied());
                let normal = a.transpose() * &a;
                match normal.try_inverse() {
                    Some(inv) => inv * a.transpose(),
                    None => {
                        log::warn!("SH band {} fit matrix is singular, rotation disabled for it", l);
                        MatrixXF::zeros(0, 0)
                    }
                }
            })
            .collect();
        Self { bands, directions, projectors }
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    // RGB channels are rotated; the weight channel and any coefficients past the
    // configured bands are copied through.
    pub fn rotate(&self, rotation: &Quaternionf, coeffs: &[Vector4f]) -> Vec<Vector4f> {
        let mut rotated = coeffs.to_vec();
        let inverse = rotation.inverse();
        let source_dirs: Vec<Vector3f> = self.directions.iter().map(|d| inverse * d).collect();

        for (l, projector) in self.projectors.iter().enumerate() {
            let l = l as i32;
            let start = basis::index(l, -l);
            let width = (2 * l + 1) as usize;
            if start + width > coeffs.len() || projector.nrows() != width {
                continue;
            }

            let band = MatrixXF::from_fn(width, 3, |m, c| coeffs[start + m][c]);
            let samples = band_matrix(l, source_dirs.iter().copied()) * band;
            let fitted = projector * samples;
            for m in 0..width {
                for c in 0..3 {
                    rotated[start + m][c] = fitted[(m, c)];
                }
            }
        }
        rotated
    }
}

// Rows are directions, columns are the 2l + 1 basis functions of band l.
fn band_matrix<I>(l: i32, directions: I) -> MatrixXF
where
    I: ExactSizeIterator<Item = Vector3f>,
{
    let rows = directions.len();
    let width = (2 * l + 1) as usize;
    let mut a = MatrixXF::zeros(rows, width);
    for (i, d) in directions.enumerate() {
        let (theta, phi) = direction_to_spherical(&d);
        for m in -l..=l {
            a[(i, (m + l) as usize)] = basis::evaluate(l, m, theta, phi);
        }
    }
    a
}

pub fn band_energy(coeffs: &[Vector4f], l: i32, channel: usize) -> Float {
    let start = basis::index(l, -l);
    coeffs[start..start + (2 * l + 1) as usize]
        .iter()
        .map(|c| c[channel] * c[channel])
        .sum()
}
