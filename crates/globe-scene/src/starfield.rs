//! Procedural starfield: a deterministic point cloud on a spherical shell
//! around the globe, generated once and never mutated.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Inner radius of the shell stars are placed on.
pub const MIN_STAR_RADIUS: f32 = 25.0;
/// Outer radius (exclusive) of the shell stars are placed on.
pub const MAX_STAR_RADIUS: f32 = 50.0;
/// Hue shared by every star: a faint blue.
pub const STAR_HUE: f32 = 0.6;
/// Saturation shared by every star.
pub const STAR_SATURATION: f32 = 0.2;
/// World-space edge length of a star's billboard.
pub const STAR_SIZE: f32 = 0.2;

/// A single star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    /// World-space position.
    pub position: Vec3,
    /// RGB color in `[0, 1]`.
    pub color: [f32; 3],
}

/// Generates a deterministic set of stars from a seed.
pub struct StarfieldGenerator {
    seed: u64,
    star_count: u32,
}

impl StarfieldGenerator {
    pub fn new(seed: u64, star_count: u32) -> Self {
        Self { seed, star_count }
    }

    /// Generate the starfield. Deterministic for a given seed.
    pub fn generate(&self) -> Starfield {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut stars = Vec::with_capacity(self.star_count as usize);

        for _ in 0..self.star_count {
            let radius = MIN_STAR_RADIUS + rng.random::<f32>() * (MAX_STAR_RADIUS - MIN_STAR_RADIUS);
            let theta = rng.random::<f32>() * std::f32::consts::TAU;
            let phi = (1.0 - 2.0 * rng.random::<f32>()).clamp(-1.0, 1.0).acos();

            let direction = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            let lightness: f32 = rng.random();

            stars.push(Star {
                position: direction * radius,
                color: hsl_to_rgb(STAR_HUE, STAR_SATURATION, lightness),
            });
        }

        tracing::debug!(seed = self.seed, count = stars.len(), "Generated starfield");
        Starfield { stars }
    }
}

/// Immutable collection of stars.
#[derive(Clone, Debug)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

/// Convert HSL (each component in `[0, 1]`) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    if saturation <= 0.0 {
        return [lightness; 3];
    }
    let q = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    [
        hue_to_channel(p, q, hue + 1.0 / 3.0),
        hue_to_channel(p, q, hue),
        hue_to_channel(p, q, hue - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}
