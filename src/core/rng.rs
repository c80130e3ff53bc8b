// Copyright @yucwang 2026

use crate::math::constants::Float;

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    // Independent stream per (session seed, frame, pixel) so parallel workers never share state.
    pub fn for_pixel(seed: u64, frame: u64, pixel_index: u64) -> Self {
        let mixed = splitmix64(seed ^ splitmix64(frame.wrapping_add(0x9E37_79B9_7F4A_7C15)))
            ^ splitmix64(pixel_index);
        Self::new(splitmix64(mixed))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    // Uniform in [0, 1).
    pub fn next_f32(&mut self) -> Float {
        (self.next_u32() >> 8) as Float * (1.0 / (1u32 << 24) as Float)
    }

    pub fn next_range(&mut self, min: Float, max: Float) -> Float {
        min + (max - min) * self.next_f32()
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
