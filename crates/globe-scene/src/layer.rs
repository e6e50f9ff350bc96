//! The four co-located layers of the globe and the group they attach to.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::{Geometry, Material};

/// One independently toggleable visual surface of the globe.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum LayerKind {
    Surface,
    Lights,
    Clouds,
    Glow,
}

impl LayerKind {
    /// All layers in draw order: opaque surface first, then additive layers
    /// from innermost to outermost.
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Surface,
        LayerKind::Lights,
        LayerKind::Clouds,
        LayerKind::Glow,
    ];

    /// Position of this layer in [`LayerKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            LayerKind::Surface => 0,
            LayerKind::Lights => 1,
            LayerKind::Clouds => 2,
            LayerKind::Glow => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Surface => "surface",
            LayerKind::Lights => "lights",
            LayerKind::Clouds => "clouds",
            LayerKind::Glow => "glow",
        }
    }

    /// Uniform scale of this layer's mesh relative to the surface.
    pub fn scale(self) -> f32 {
        match self {
            LayerKind::Surface | LayerKind::Lights => 1.0,
            LayerKind::Clouds => 1.003,
            LayerKind::Glow => 1.01,
        }
    }

    /// The material this layer is drawn with.
    pub fn material(self) -> Material {
        match self {
            LayerKind::Surface => Material::surface(),
            LayerKind::Lights => Material::lights(),
            LayerKind::Clouds => Material::clouds(),
            LayerKind::Glow => Material::glow(),
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Local transform of a layer mesh: spin about its own y axis and a fixed
/// uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Accumulated rotation about the y axis in radians.
    pub rotation_y: f32,
    scale: f32,
}

impl Transform {
    fn with_scale(scale: f32) -> Self {
        Self {
            rotation_y: 0.0,
            scale,
        }
    }

    /// Uniform scale factor. Fixed at construction.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Local matrix: `rotation_y * scale`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.rotation_y),
            Vec3::ZERO,
        )
    }
}

/// Geometry, material, and transform of one layer.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub transform: Transform,
}

/// A layer's mesh together with its attachment flag.
#[derive(Debug, Clone)]
pub struct Layer {
    pub mesh: Mesh,
    pub(crate) attached: bool,
}

impl Layer {
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// The four layer slots, indexed by [`LayerKind`].
#[derive(Debug, Clone)]
pub struct LayerSet {
    layers: [Layer; 4],
}

impl LayerSet {
    /// Build all four layers over one shared geometry, each attached.
    pub fn new(geometry: &Arc<Geometry>) -> Self {
        let layers = LayerKind::ALL.map(|kind| Layer {
            mesh: Mesh {
                geometry: Arc::clone(geometry),
                material: kind.material(),
                transform: Transform::with_scale(kind.scale()),
            },
            attached: true,
        });
        Self { layers }
    }

    pub fn get(&self, kind: LayerKind) -> &Layer {
        &self.layers[kind.index()]
    }

    pub(crate) fn get_mut(&mut self, kind: LayerKind) -> &mut Layer {
        &mut self.layers[kind.index()]
    }

    /// Iterate layers in draw order together with their kind.
    pub fn iter(&self) -> impl Iterator<Item = (LayerKind, &Layer)> {
        LayerKind::ALL.into_iter().zip(self.layers.iter())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (LayerKind, &mut Layer)> {
        LayerKind::ALL.into_iter().zip(self.layers.iter_mut())
    }
}

/// Parent scene node holding the attached layers.
///
/// The child list keeps insertion order and never holds a layer twice.
#[derive(Debug, Clone, Default)]
pub struct Group {
    /// Axial tilt about the z axis in radians.
    pub rotation_z: f32,
    children: Vec<LayerKind>,
}

impl Group {
    pub fn new(rotation_z: f32) -> Self {
        Self {
            rotation_z,
            children: Vec::with_capacity(LayerKind::ALL.len()),
        }
    }

    /// Attach a child. Returns `false` (and does nothing) if already present.
    pub fn add(&mut self, kind: LayerKind) -> bool {
        if self.contains(kind) {
            return false;
        }
        self.children.push(kind);
        true
    }

    /// Detach a child. Returns `false` (and does nothing) if absent.
    pub fn remove(&mut self, kind: LayerKind) -> bool {
        let before = self.children.len();
        self.children.retain(|&child| child != kind);
        self.children.len() != before
    }

    pub fn contains(&self, kind: LayerKind) -> bool {
        self.children.contains(&kind)
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[LayerKind] {
        &self.children
    }

    /// How many times `kind` appears among the children.
    pub fn occurrences(&self, kind: LayerKind) -> usize {
        self.children.iter().filter(|&&child| child == kind).count()
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(self.rotation_z)
    }
}
