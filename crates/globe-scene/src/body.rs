//! The layered celestial body: one shared icosphere drawn as four layers
//! that can be attached to and detached from the scene group.

use std::sync::Arc;

use glam::Mat4;

use crate::{Geometry, Group, Layer, LayerKind, LayerSet};

/// Extra y rotation the clouds layer gains per animation step, on top of
/// the shared animation rate.
pub const CLOUD_DRIFT_PER_FRAME: f32 = 0.0003;

/// A globe made of four co-located layers sharing one geometry.
#[derive(Debug, Clone)]
pub struct CelestialBody {
    radius: f32,
    detail: u32,
    animation_rate: f32,
    geometry: Arc<Geometry>,
    layers: LayerSet,
    group: Group,
}

impl CelestialBody {
    /// Build a body with all four layers attached and a zero animation rate.
    ///
    /// `rotation` is the group's tilt about the z axis in radians.
    pub fn new(radius: f32, detail: u32, rotation: f32) -> Self {
        let geometry = Arc::new(Geometry::icosahedron(radius, detail));
        let layers = LayerSet::new(&geometry);
        let mut group = Group::new(rotation);
        for kind in LayerKind::ALL {
            group.add(kind);
        }

        tracing::debug!(
            radius,
            detail,
            triangles = geometry.indices.len() / 3,
            "Built celestial body"
        );

        Self {
            radius,
            detail,
            animation_rate: 0.0,
            geometry,
            layers,
            group,
        }
    }

    /// Set the per-step y rotation applied to every layer.
    pub fn with_animation_rate(mut self, rate: f32) -> Self {
        self.animation_rate = rate.max(0.0);
        self
    }

    /// Flip a layer's attachment and return the new state.
    ///
    /// Attaching adds the layer to the group unless it is already a child;
    /// detaching removes it unless it is already absent.
    pub fn toggle(&mut self, kind: LayerKind) -> bool {
        let layer = self.layers.get_mut(kind);
        layer.attached = !layer.attached;
        let attached = layer.attached;

        if attached {
            self.group.add(kind);
        } else {
            self.group.remove(kind);
        }

        tracing::debug!(layer = %kind, attached, "Toggled layer");
        attached
    }

    /// Advance every layer's y rotation by one step, attached or not.
    pub fn animate(&mut self) {
        let rate = self.animation_rate;
        for (kind, layer) in self.layers.iter_mut() {
            layer.mesh.transform.rotation_y += rate;
            if kind == LayerKind::Clouds {
                layer.mesh.transform.rotation_y += CLOUD_DRIFT_PER_FRAME;
            }
        }
    }

    pub fn is_attached(&self, kind: LayerKind) -> bool {
        self.layers.get(kind).is_attached()
    }

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        self.layers.get(kind)
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    /// The geometry every layer mesh references.
    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    /// Attached layers in draw order.
    pub fn attached_layers(&self) -> impl Iterator<Item = LayerKind> + '_ {
        LayerKind::ALL
            .into_iter()
            .filter(|&kind| self.is_attached(kind))
    }

    /// World matrix of a layer: group tilt, then the layer's own spin and scale.
    pub fn model_matrix(&self, kind: LayerKind) -> Mat4 {
        self.group.matrix() * self.layers.get(kind).mesh.transform.matrix()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn detail(&self) -> u32 {
        self.detail
    }

    pub fn animation_rate(&self) -> f32 {
        self.animation_rate
    }

    /// Whether group membership agrees with every layer's attachment flag.
    pub fn attachment_consistent(&self) -> bool {
        LayerKind::ALL.iter().all(|&kind| {
            let expected = usize::from(self.is_attached(kind));
            self.group.occurrences(kind) == expected
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earth() -> CelestialBody {
        CelestialBody::new(1.0, 12, 0.0)
    }

    #[test]
    fn test_new_body_shares_one_geometry() {
        let body = earth();
        for kind in LayerKind::ALL {
            assert!(Arc::ptr_eq(&body.layer(kind).mesh.geometry, body.geometry()));
            assert!(body.is_attached(kind));
        }
        // The body's handle plus one per layer.
        assert_eq!(Arc::strong_count(body.geometry()), 5);
        assert_eq!(body.group().children().len(), 4);
        assert_eq!(body.geometry().indices.len() / 3, 3380);
    }

    #[test]
    fn test_toggle_returns_new_state() {
        let mut body = earth();
        assert!(!body.toggle(LayerKind::Lights));
        assert!(!body.is_attached(LayerKind::Lights));
        assert!(body.toggle(LayerKind::Lights));
        assert!(body.is_attached(LayerKind::Lights));
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        for kind in LayerKind::ALL {
            let mut body = earth();
            body.toggle(kind);
            body.toggle(kind);
            assert!(body.is_attached(kind));
            assert!(body.group().contains(kind));
        }
    }

    #[test]
    fn test_odd_toggle_count_flips_once() {
        let mut body = earth();
        for _ in 0..7 {
            body.toggle(LayerKind::Glow);
        }
        assert!(!body.is_attached(LayerKind::Glow));
        assert!(!body.group().contains(LayerKind::Glow));
    }

    #[test]
    fn test_attachment_invariant_over_toggle_sequence() {
        let mut body = earth();
        let sequence = [
            LayerKind::Clouds,
            LayerKind::Surface,
            LayerKind::Clouds,
            LayerKind::Glow,
            LayerKind::Lights,
            LayerKind::Glow,
            LayerKind::Surface,
            LayerKind::Lights,
            LayerKind::Lights,
        ];
        for kind in sequence {
            body.toggle(kind);
            assert!(body.attachment_consistent(), "after toggling {kind}");
        }
        let attached: Vec<_> = body.attached_layers().collect();
        assert_eq!(
            attached,
            vec![LayerKind::Surface, LayerKind::Clouds, LayerKind::Glow]
        );
    }

    #[test]
    fn test_animation_advances_detached_layers() {
        let mut body = earth().with_animation_rate(0.01);
        body.toggle(LayerKind::Surface);
        body.toggle(LayerKind::Clouds);
        for _ in 0..10 {
            body.animate();
        }
        let surface = body.layer(LayerKind::Surface).mesh.transform.rotation_y;
        let lights = body.layer(LayerKind::Lights).mesh.transform.rotation_y;
        let clouds = body.layer(LayerKind::Clouds).mesh.transform.rotation_y;
        assert!((surface - 0.1).abs() < 1e-5);
        assert!((surface - lights).abs() < 1e-6);
        assert!((clouds - 0.103).abs() < 1e-5);
    }

    #[test]
    fn test_hundred_ticks_at_rest_only_drifts_clouds() {
        let mut body = earth();
        body.toggle(LayerKind::Clouds);
        body.toggle(LayerKind::Clouds);
        for _ in 0..100 {
            body.animate();
        }
        for kind in [LayerKind::Surface, LayerKind::Lights, LayerKind::Glow] {
            assert_eq!(body.layer(kind).mesh.transform.rotation_y, 0.0);
        }
        let clouds = body.layer(LayerKind::Clouds).mesh.transform.rotation_y;
        assert!((clouds - 0.03).abs() < 1e-5, "clouds rotated {clouds}");
    }

    #[test]
    fn test_scales_survive_toggles_and_animation() {
        let mut body = earth().with_animation_rate(0.002);
        for kind in LayerKind::ALL {
            body.toggle(kind);
            body.animate();
        }
        let surface = body.layer(LayerKind::Surface).mesh.transform.scale();
        assert_eq!(surface, 1.0);
        assert_eq!(
            body.layer(LayerKind::Clouds).mesh.transform.scale(),
            surface * 1.003
        );
        assert_eq!(
            body.layer(LayerKind::Glow).mesh.transform.scale(),
            surface * 1.01
        );
    }

    #[test]
    fn test_negative_rate_clamped() {
        let body = earth().with_animation_rate(-1.0);
        assert_eq!(body.animation_rate(), 0.0);
    }

    #[test]
    fn test_model_matrix_applies_tilt_after_scale() {
        let tilt = -23.4_f32.to_radians();
        let body = CelestialBody::new(1.0, 0, tilt);
        let p = body
            .model_matrix(LayerKind::Glow)
            .transform_point3(glam::Vec3::Y);
        assert!((p.length() - 1.01).abs() < 1e-5);
        let expected = Mat4::from_rotation_z(tilt).transform_point3(glam::Vec3::Y * 1.01);
        assert!((p - expected).length() < 1e-5);
    }
}
