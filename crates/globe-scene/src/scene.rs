//! Scene composition: the globe, the starfield backdrop, and the sun.

use glam::Vec3;
use globe_config::Config;

use crate::{CelestialBody, Starfield, StarfieldGenerator};

/// A white directional light shining from `position` toward the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for SunLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 2.0,
            position: Vec3::new(-2.0, 0.5, 1.5),
        }
    }
}

impl SunLight {
    /// Unit vector from the origin toward the light.
    pub fn direction_to_light(&self) -> Vec3 {
        self.position.normalize_or(Vec3::Y)
    }

    /// Color premultiplied by intensity.
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

/// Everything that gets drawn: exactly one body, one starfield, one sun.
#[derive(Debug)]
pub struct Scene {
    pub body: CelestialBody,
    starfield: Starfield,
    sun: SunLight,
}

impl Scene {
    pub fn compose(body: CelestialBody, starfield: Starfield, sun: SunLight) -> Self {
        Self {
            body,
            starfield,
            sun,
        }
    }

    /// Build the body, starfield and default sun from configuration.
    pub fn from_config(config: &Config) -> Self {
        let body = CelestialBody::new(config.globe.radius, config.globe.detail, config.globe.tilt)
            .with_animation_rate(config.globe.animation_rate);
        let starfield =
            StarfieldGenerator::new(config.starfield.seed, config.starfield.count).generate();

        tracing::info!(
            detail = config.globe.detail,
            stars = starfield.len(),
            "Composed scene"
        );

        Self::compose(body, starfield, SunLight::default())
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn sun(&self) -> &SunLight {
        &self.sun
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayerKind;

    #[test]
    fn test_from_config_uses_settings() {
        let mut config = Config::default();
        config.globe.detail = 2;
        config.globe.animation_rate = 0.002;
        config.starfield.count = 300;
        let scene = Scene::from_config(&config);
        assert_eq!(scene.body.detail(), 2);
        assert_eq!(scene.body.animation_rate(), 0.002);
        assert_eq!(scene.starfield().len(), 300);
        assert_eq!(*scene.sun(), SunLight::default());
    }

    #[test]
    fn test_sun_defaults() {
        let sun = SunLight::default();
        assert_eq!(sun.intensity, 2.0);
        assert_eq!(sun.radiance(), Vec3::splat(2.0));
        let dir = sun.direction_to_light();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x < 0.0 && dir.z > 0.0);
    }

    #[test]
    fn test_starfield_unchanged_by_body_updates() {
        let mut config = Config::default();
        config.globe.detail = 1;
        config.starfield.count = 100;
        let mut scene = Scene::from_config(&config);
        let before = scene.starfield().stars().to_vec();
        scene.body.toggle(LayerKind::Clouds);
        for _ in 0..50 {
            scene.body.animate();
        }
        assert_eq!(scene.starfield().stars(), before.as_slice());
    }
}
