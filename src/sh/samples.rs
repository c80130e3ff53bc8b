// Copyright @yucwang 2026

use super::basis;

use crate::core::config::ShSettings;
use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::warp::{spherical_to_direction, square_to_sphere_angles};

#[derive(Debug, Clone, PartialEq)]
pub struct ShSample {
    pub direction: Vector3f,
    pub theta: Float,
    pub phi: Float,
    pub coeffs: Vec<Float>,
}

impl ShSample {
    pub fn new(theta: Float, phi: Float, bands: usize) -> Self {
        Self {
            direction: spherical_to_direction(theta, phi),
            theta,
            phi,
            coeffs: basis::evaluate_all(bands, theta, phi),
        }
    }
}

// Uniform sphere samples with their basis values cached.
#[derive(Debug, Clone)]
pub struct ShSampleSet {
    bands: usize,
    samples: Vec<ShSample>,
}

impl ShSampleSet {
    // Jittered stratification of the unit square, one sample per cell.
    pub fn stratified(bands: usize, sqrt_count: usize, rng: &mut LcgRng) -> Self {
        let inv = 1.0 / sqrt_count.max(1) as Float;
        let mut samples = Vec::with_capacity(sqrt_count * sqrt_count);
        for a in 0..sqrt_count {
            for b in 0..sqrt_count {
                let u = Vector2f::new((a as Float + rng.next_f32()) * inv,
                                      (b as Float + rng.next_f32()) * inv);
                let (theta, phi) = square_to_sphere_angles(&u);
                samples.push(ShSample::new(theta, phi, bands));
            }
        }
        Self { bands, samples }
    }

    pub fn from_settings(settings: &ShSettings) -> Self {
        log::info!("Initializing SH samples: {} bands, {} samples",
                   settings.bands, settings.sample_count());
        let mut rng = LcgRng::new(settings.seed);
        Self::stratified(settings.bands, settings.sqrt_sample_count, &mut rng)
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn coefficient_count(&self) -> usize {
        basis::coefficient_count(self.bands)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[ShSample] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stratified_samples() {
        let mut rng = LcgRng::new(11);
        let set = ShSampleSet::stratified(3, 16, &mut rng);
        assert_eq!(set.len(), 256);
        assert_eq!(set.coefficient_count(), 9);

        let mut upper = 0;
        for sample in set.samples() {
            assert!((sample.direction.norm() - 1.0).abs() < 1e-5);
            assert_eq!(sample.coeffs.len(), 9);
            assert!((sample.direction.z - sample.theta.cos()).abs() < 1e-5);
            if sample.direction.z >= 0.0 {
                upper += 1;
            }
        }
        // One sample per stratum splits the sphere evenly between the hemispheres.
        assert_eq!(upper, 128);
    }

    #[test]
    fn test_seeded_sets_are_reproducible() {
        let settings = ShSettings { sqrt_sample_count: 4, seed: 3, ..ShSettings::default() };
        let a = ShSampleSet::from_settings(&settings);
        let b = ShSampleSet::from_settings(&settings);
        assert_eq!(a.samples(), b.samples());
    }
}
