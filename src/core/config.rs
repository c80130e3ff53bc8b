// Copyright @yucwang 2026

use crate::math::constants::Float;

pub const DEFAULT_MAX_BOUNCES: u32 = 5;
pub const DEFAULT_SH_BANDS: usize = 3;
pub const DEFAULT_SH_SQRT_SAMPLES: usize = 64;
pub const DEFAULT_SUN_CONE_DEGREES: Float = 30.0;

// Runtime toggles, sampled once at frame start and handed to the tracer by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub use_accumulation: bool,
    pub max_bounces: u32,
    pub seed: u64,
    pub bvh_max_leaf_size: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            use_accumulation: true,
            max_bounces: DEFAULT_MAX_BOUNCES,
            seed: 0,
            bvh_max_leaf_size: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShSettings {
    pub bands: usize,
    pub sqrt_sample_count: usize,
    pub sun_cone_degrees: Float,
    pub transfer_offset: Float,
    pub seed: u64,
}

impl ShSettings {
    pub fn coefficient_count(&self) -> usize {
        self.bands * self.bands
    }

    pub fn sample_count(&self) -> usize {
        self.sqrt_sample_count * self.sqrt_sample_count
    }
}

impl Default for ShSettings {
    fn default() -> Self {
        Self {
            bands: DEFAULT_SH_BANDS,
            sqrt_sample_count: DEFAULT_SH_SQRT_SAMPLES,
            sun_cone_degrees: DEFAULT_SUN_CONE_DEGREES,
            transfer_offset: 1e-3,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert!(settings.use_accumulation);
        assert_eq!(settings.max_bounces, 5);

        let sh = ShSettings::default();
        assert_eq!(sh.coefficient_count(), 9);
        assert_eq!(sh.sample_count(), 64 * 64);
    }
}
