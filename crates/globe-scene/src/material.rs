//! Visual parameters of each layer: shading model, textures, blending.

use glam::Vec3;

/// The six texture images the globe consumes.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum TextureSlot {
    /// Surface albedo.
    SurfaceColor,
    /// Surface specular intensity (oceans bright, land dark).
    SurfaceSpecular,
    /// Surface height used for bump shading.
    SurfaceBump,
    /// City lights emitted on the night side.
    NightLights,
    /// Cloud albedo.
    CloudColor,
    /// Cloud coverage used as alpha.
    CloudAlpha,
}

impl TextureSlot {
    /// All slots in loading order.
    pub const ALL: [TextureSlot; 6] = [
        TextureSlot::SurfaceColor,
        TextureSlot::SurfaceSpecular,
        TextureSlot::SurfaceBump,
        TextureSlot::NightLights,
        TextureSlot::CloudColor,
        TextureSlot::CloudAlpha,
    ];

    /// Human-readable slot name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            TextureSlot::SurfaceColor => "surface color map",
            TextureSlot::SurfaceSpecular => "surface specular map",
            TextureSlot::SurfaceBump => "surface bump map",
            TextureSlot::NightLights => "night lights map",
            TextureSlot::CloudColor => "cloud color map",
            TextureSlot::CloudAlpha => "cloud alpha map",
        }
    }

    /// Whether the image holds color (decoded as sRGB) rather than data.
    pub fn is_color(self) -> bool {
        matches!(
            self,
            TextureSlot::SurfaceColor | TextureSlot::NightLights | TextureSlot::CloudColor
        )
    }
}

/// How a layer's fragments combine with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Replace the destination (alpha-blended if the material is transparent).
    Normal,
    /// `src * src_alpha + dst`.
    Additive,
}

/// View-dependent rim lighting parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FresnelParams {
    /// Color at grazing angles.
    pub rim_color: Vec3,
    /// Color when facing the camera.
    pub facing_color: Vec3,
    /// Constant term of the fresnel factor.
    pub bias: f32,
    /// Multiplier of the fresnel factor.
    pub scale: f32,
    /// Exponent of the fresnel factor.
    pub power: f32,
}

impl Default for FresnelParams {
    fn default() -> Self {
        Self {
            rim_color: hex_to_rgb(0x0088ff),
            facing_color: hex_to_rgb(0x000000),
            bias: 0.1,
            scale: 1.0,
            power: 4.0,
        }
    }
}

/// Shading model and its texture bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum Shading {
    /// Diffuse + specular lit surface with a specular map and bump map.
    Phong {
        map: TextureSlot,
        specular_map: TextureSlot,
        bump_map: TextureSlot,
        bump_scale: f32,
    },
    /// Unlit texture.
    Basic { map: TextureSlot },
    /// Diffuse lit texture with a separate alpha map.
    Standard {
        map: TextureSlot,
        alpha_map: TextureSlot,
    },
    /// View-angle rim glow, no textures.
    Fresnel(FresnelParams),
}

/// A layer's complete set of visual parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub blend: BlendMode,
    /// Global opacity multiplier in `[0, 1]`.
    pub opacity: f32,
    /// Transparent materials are drawn without depth writes.
    pub transparent: bool,
}

impl Material {
    /// Bump-mapped, specular-mapped surface.
    pub fn surface() -> Self {
        Self {
            shading: Shading::Phong {
                map: TextureSlot::SurfaceColor,
                specular_map: TextureSlot::SurfaceSpecular,
                bump_map: TextureSlot::SurfaceBump,
                bump_scale: 0.4,
            },
            blend: BlendMode::Normal,
            opacity: 1.0,
            transparent: false,
        }
    }

    /// Additive, unlit night lights.
    pub fn lights() -> Self {
        Self {
            shading: Shading::Basic {
                map: TextureSlot::NightLights,
            },
            blend: BlendMode::Additive,
            opacity: 1.0,
            transparent: false,
        }
    }

    /// Translucent, additive cloud cover.
    pub fn clouds() -> Self {
        Self {
            shading: Shading::Standard {
                map: TextureSlot::CloudColor,
                alpha_map: TextureSlot::CloudAlpha,
            },
            blend: BlendMode::Additive,
            opacity: 0.8,
            transparent: true,
        }
    }

    /// Additive atmospheric rim glow.
    pub fn glow() -> Self {
        Self {
            shading: Shading::Fresnel(FresnelParams::default()),
            blend: BlendMode::Additive,
            opacity: 1.0,
            transparent: true,
        }
    }

    /// Texture slots this material samples.
    pub fn textures(&self) -> Vec<TextureSlot> {
        match &self.shading {
            Shading::Phong {
                map,
                specular_map,
                bump_map,
                ..
            } => vec![*map, *specular_map, *bump_map],
            Shading::Basic { map } => vec![*map],
            Shading::Standard { map, alpha_map } => vec![*map, *alpha_map],
            Shading::Fresnel(_) => Vec::new(),
        }
    }
}

/// Convert a `0xRRGGBB` color to sRGB-encoded RGB in `[0, 1]`.
pub fn hex_to_rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_slot_used_by_exactly_one_material() {
        let materials = [
            Material::surface(),
            Material::lights(),
            Material::clouds(),
            Material::glow(),
        ];
        let mut used: Vec<TextureSlot> = materials.iter().flat_map(|m| m.textures()).collect();
        used.sort();
        let mut all = TextureSlot::ALL.to_vec();
        all.sort();
        assert_eq!(used, all);
    }

    #[test]
    fn test_clouds_translucent_additive() {
        let clouds = Material::clouds();
        assert!(clouds.transparent);
        assert_eq!(clouds.blend, BlendMode::Additive);
        assert!((clouds.opacity - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_surface_bump_scale() {
        match Material::surface().shading {
            Shading::Phong { bump_scale, .. } => assert!((bump_scale - 0.4).abs() < 1e-6),
            other => panic!("surface should be phong, got {other:?}"),
        }
    }

    #[test]
    fn test_glow_rim_color() {
        let Shading::Fresnel(params) = Material::glow().shading else {
            panic!("glow should be fresnel");
        };
        assert_eq!(params.rim_color, Vec3::new(0.0, 136.0 / 255.0, 1.0));
        assert_eq!(params.facing_color, Vec3::ZERO);
        assert_eq!(params.power, 4.0);
    }

    #[test]
    fn test_color_slots() {
        assert!(TextureSlot::SurfaceColor.is_color());
        assert!(!TextureSlot::SurfaceBump.is_color());
        assert!(!TextureSlot::CloudAlpha.is_color());
    }
}
