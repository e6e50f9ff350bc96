//! ACES filmic tone mapping, shared by the globe and starfield shaders.
//!
//! Shaders are assembled at pipeline creation by prepending
//! [`TONE_MAPPING_WGSL`] to the shader body. [`aces_filmic`] is the same
//! curve on the CPU.

use glam::{Mat3, Vec3};

/// WGSL definition of `aces_filmic(color: vec3<f32>) -> vec3<f32>`.
pub const TONE_MAPPING_WGSL: &str = r#"
fn rrt_and_odt_fit(v: vec3<f32>) -> vec3<f32> {
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.4329510) + 0.238081;
    return a / b;
}

// sRGB => XYZ => D65_2_D60 => AP1 => RRT_SAT
const ACES_INPUT: mat3x3<f32> = mat3x3<f32>(
    vec3<f32>(0.59719, 0.07600, 0.02840),
    vec3<f32>(0.35458, 0.90834, 0.13383),
    vec3<f32>(0.04823, 0.01566, 0.83777),
);

// ODT_SAT => XYZ => D60_2_D65 => sRGB
const ACES_OUTPUT: mat3x3<f32> = mat3x3<f32>(
    vec3<f32>(1.60475, -0.10208, -0.00327),
    vec3<f32>(-0.53108, 1.10813, -0.07276),
    vec3<f32>(-0.07367, -0.00605, 1.07602),
);

fn aces_filmic(color: vec3<f32>) -> vec3<f32> {
    var c = color / 0.6;
    c = ACES_INPUT * c;
    c = rrt_and_odt_fit(c);
    c = ACES_OUTPUT * c;
    return clamp(c, vec3<f32>(0.0), vec3<f32>(1.0));
}
"#;

/// Prepend the tone-mapping functions to a shader body.
pub fn with_tone_mapping(body: &str) -> String {
    format!("{TONE_MAPPING_WGSL}\n{body}")
}

const ACES_INPUT: Mat3 = Mat3::from_cols_array(&[
    0.59719, 0.07600, 0.02840, //
    0.35458, 0.90834, 0.13383, //
    0.04823, 0.01566, 0.83777,
]);

const ACES_OUTPUT: Mat3 = Mat3::from_cols_array(&[
    1.60475, -0.10208, -0.00327, //
    -0.53108, 1.10813, -0.07276, //
    -0.07367, -0.00605, 1.07602,
]);

fn rrt_and_odt_fit(v: Vec3) -> Vec3 {
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.4329510) + 0.238081;
    a / b
}

/// Linear scene color to display-referred linear color in `[0, 1]`.
pub fn aces_filmic(color: Vec3) -> Vec3 {
    let c = ACES_INPUT * (color / 0.6);
    (ACES_OUTPUT * rrt_and_odt_fit(c)).clamp(Vec3::ZERO, Vec3::ONE)
}

/// sRGB-encoded channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_stays_near_black() {
        let out = aces_filmic(Vec3::ZERO);
        assert!(out.max_element() < 1e-3);
    }

    #[test]
    fn test_output_saturates_at_white() {
        let out = aces_filmic(Vec3::splat(1000.0));
        assert!(out.min_element() > 0.99);
        assert!(out.max_element() <= 1.0);
    }

    #[test]
    fn test_curve_is_monotonic_for_grey() {
        let mut last = 0.0;
        for i in 1..50 {
            let v = aces_filmic(Vec3::splat(i as f32 * 0.1)).x;
            assert!(v >= last, "dropped at step {i}");
            last = v;
        }
    }

    #[test]
    fn test_mid_grey_compresses() {
        // Exposure-scaled 0.18 lands a bit above 0.18 but well below 0.5.
        let out = aces_filmic(Vec3::splat(0.18)).x;
        assert!(out > 0.18 && out < 0.5, "got {out}");
    }

    #[test]
    fn test_srgb_to_linear_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214).abs() < 1e-3);
    }

    #[test]
    fn test_shader_source_has_entry_function() {
        let source = with_tone_mapping("fn main() {}");
        assert!(source.contains("fn aces_filmic"));
        assert!(source.ends_with("fn main() {}"));
    }
}
