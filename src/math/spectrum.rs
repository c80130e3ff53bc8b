// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f, Vector4f, INV_GAMMA};

pub fn opaque_black() -> Vector4f {
    Vector4f::new(0.0, 0.0, 0.0, 1.0)
}

pub fn rgb_to_rgba(rgb: &Vector3f, alpha: Float) -> Vector4f {
    Vector4f::new(rgb.x, rgb.y, rgb.z, alpha)
}

pub fn is_black(rgb: &Vector3f) -> bool {
    rgb.iter().all(|c| *c == 0.0)
}

// Display gamma 2.2 on the color channels; alpha passes through.
pub fn gamma_correct(color: &Vector4f) -> Vector4f {
    Vector4f::new(color.x.max(0.0).powf(INV_GAMMA),
                  color.y.max(0.0).powf(INV_GAMMA),
                  color.z.max(0.0).powf(INV_GAMMA),
                  color.w)
}

pub fn to_rgba8(color: &Vector4f) -> [u8; 4] {
    let quantize = |c: Float| (c.max(0.0).min(1.0) * 255.0) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z), quantize(color.w)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_correct() {
        let linear = Vector4f::new(0.25, 0.5, 1.0, 1.0);
        let corrected = gamma_correct(&linear);
        assert!((corrected.x - 0.25f32.powf(1.0 / 2.2)).abs() < 1e-6);
        assert!((corrected.y - 0.5f32.powf(1.0 / 2.2)).abs() < 1e-6);
        assert!((corrected.z - 1.0).abs() < 1e-6);
        assert_eq!(corrected.w, 1.0);
        assert_eq!(gamma_correct(&opaque_black()), opaque_black());
    }

    #[test]
    fn test_to_rgba8_clamps() {
        assert_eq!(to_rgba8(&Vector4f::new(2.0, -1.0, 0.5, 1.0)), [255, 0, 127, 255]);
        assert!(is_black(&Vector3f::zeros()));
        assert!(!is_black(&Vector3f::new(0.0, 0.1, 0.0)));
    }
}
