// Copyright @yucwang 2026

//! Real spherical harmonics, Z up, ordered by `l * (l + 1) + m`.

use crate::math::constants::{ Float, Vector3f };
use crate::math::warp::direction_to_spherical;

pub fn coefficient_count(bands: usize) -> usize {
    bands * bands
}

pub fn index(l: i32, m: i32) -> usize {
    (l * (l + 1) + m) as usize
}

// Associated Legendre polynomial P(l, m, x) for 0 <= m <= l, evaluated by upward recurrence in l.
pub fn legendre(l: i32, m: i32, x: Float) -> Float {
    let x = x as f64;
    let mut pmm = 1.0f64;
    if m > 0 {
        let somx2 = ((1.0 - x) * (1.0 + x)).max(0.0).sqrt();
        let mut fact = 1.0f64;
        for _ in 1..=m {
            pmm *= -fact * somx2;
            fact += 2.0;
        }
    }
    if l == m {
        return pmm as Float;
    }

    let mut pmmp1 = x * (2.0 * m as f64 + 1.0) * pmm;
    if l == m + 1 {
        return pmmp1 as Float;
    }

    let mut pll = 0.0f64;
    for ll in (m + 2)..=l {
        pll = ((2.0 * ll as f64 - 1.0) * x * pmmp1 - (ll + m - 1) as f64 * pmm) / (ll - m) as f64;
        pmm = pmmp1;
        pmmp1 = pll;
    }
    pll as Float
}

fn factorial(n: i32) -> f64 {
    (1..=n).fold(1.0f64, |acc, k| acc * k as f64)
}

pub fn normalization(l: i32, m: i32) -> Float {
    let m = m.abs();
    let k = ((2 * l + 1) as f64 * factorial(l - m))
        / (4.0 * std::f64::consts::PI * factorial(l + m));
    k.sqrt() as Float
}

pub fn evaluate(l: i32, m: i32, theta: Float, phi: Float) -> Float {
    let cos_theta = theta.cos();
    if m == 0 {
        return normalization(l, 0) * legendre(l, 0, cos_theta);
    }

    let sqrt2 = std::f32::consts::SQRT_2;
    if m > 0 {
        sqrt2 * normalization(l, m) * (m as Float * phi).cos() * legendre(l, m, cos_theta)
    } else {
        sqrt2 * normalization(l, -m) * (-m as Float * phi).sin() * legendre(l, -m, cos_theta)
    }
}

pub fn evaluate_all(bands: usize, theta: Float, phi: Float) -> Vec<Float> {
    let mut values = vec![0.0; coefficient_count(bands)];
    for l in 0..bands as i32 {
        for m in -l..=l {
            values[index(l, m)] = evaluate(l, m, theta, phi);
        }
    }
    values
}

pub fn evaluate_direction(bands: usize, dir: &Vector3f) -> Vec<Float> {
    let (theta, phi) = direction_to_spherical(dir);
    evaluate_all(bands, theta, phi)
}

// Inverse of the projection: sum of c_i * Y_i(dir).
pub fn reconstruct(coeffs: &[Float], dir: &Vector3f) -> Float {
    let bands = (coeffs.len() as f64).sqrt() as usize;
    evaluate_direction(bands, dir)
        .iter()
        .zip(coeffs)
        .map(|(y, c)| y * c)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::PI;

    #[test]
    fn test_indexing() {
        assert_eq!(index(0, 0), 0);
        assert_eq!(index(1, -1), 1);
        assert_eq!(index(1, 1), 3);
        assert_eq!(index(2, -2), 4);
        assert_eq!(index(2, 2), 8);
        assert_eq!(coefficient_count(3), 9);
    }

    #[test]
    fn test_known_values() {
        assert!((evaluate(0, 0, 0.3, 1.2) - 0.282_095).abs() < 1e-5);
        // Y(1, 0) = 0.488603 * z
        assert!((evaluate(1, 0, 0.0, 0.0) - 0.488_603).abs() < 1e-5);
        assert!(evaluate(1, 0, 0.5 * PI, 0.0).abs() < 1e-5);

        // Band one is linear in the direction.
        let d = Vector3f::new(0.36, 0.48, 0.8);
        let values = evaluate_direction(2, &d);
        assert!((values[index(1, -1)] + 0.488_603 * d.y).abs() < 1e-4);
        assert!((values[index(1, 0)] - 0.488_603 * d.z).abs() < 1e-4);
        assert!((values[index(1, 1)] + 0.488_603 * d.x).abs() < 1e-4);

        // Y(2, 0) = 0.315392 * (3z^2 - 1)
        assert_eq!(values.len(), 4);
        let y20 = evaluate(2, 0, 0.0, 0.0);
        assert!((y20 - 0.315_392 * 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_legendre_low_orders() {
        let x = 0.3;
        assert!((legendre(0, 0, x) - 1.0).abs() < 1e-6);
        assert!((legendre(1, 0, x) - x).abs() < 1e-6);
        assert!((legendre(2, 0, x) - 0.5 * (3.0 * x * x - 1.0)).abs() < 1e-6);
        assert!((legendre(1, 1, x) + (1.0 - x * x).sqrt()).abs() < 1e-6);
        assert!((legendre(2, 2, x) - 3.0 * (1.0 - x * x)).abs() < 1e-5);
    }

    #[test]
    fn test_reconstruct_single_basis() {
        let mut coeffs = vec![0.0; 9];
        coeffs[index(1, 0)] = 1.0;
        let up = reconstruct(&coeffs, &Vector3f::new(0.0, 0.0, 1.0));
        let down = reconstruct(&coeffs, &Vector3f::new(0.0, 0.0, -1.0));
        assert!((up - 0.488_603).abs() < 1e-5);
        assert!((down + 0.488_603).abs() < 1e-5);
    }
}
