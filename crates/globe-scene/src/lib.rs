//! Scene model for the globe viewer: the layered celestial body, its shared
//! icosphere geometry, layer materials, the starfield backdrop, and the scene
//! that composes them with a directional sun light.
//!
//! Everything here is plain CPU state. GPU resources live in `globe-render`,
//! which reads this model each frame.

pub mod body;
pub mod geometry;
pub mod layer;
pub mod material;
pub mod scene;
pub mod starfield;

pub use body::{CLOUD_DRIFT_PER_FRAME, CelestialBody};
pub use geometry::Geometry;
pub use layer::{Group, Layer, LayerKind, LayerSet, Mesh, Transform};
pub use material::{BlendMode, FresnelParams, Material, Shading, TextureSlot};
pub use scene::{Scene, SunLight};
pub use starfield::{
    MAX_STAR_RADIUS, MIN_STAR_RADIUS, STAR_SIZE, Star, Starfield, StarfieldGenerator, hsl_to_rgb,
};
