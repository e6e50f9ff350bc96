//! Globe texture assets: startup existence checks, background decoding, and
//! GPU upload.
//!
//! [`check_assets`] runs once at startup and fails on the first missing or
//! unreadable file.
//! [`TextureLoader`] decodes every image on a worker thread and hands the
//! results back over a channel; the render thread drains it each frame and
//! uploads into [`GlobeTextures`], which starts with a 1×1 black placeholder
//! in every slot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use globe_config::AssetConfig;
use globe_scene::TextureSlot;

/// A configured texture file that does not exist.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("{} not found at {}", .slot.name(), .path.display())]
    Missing { slot: TextureSlot, path: PathBuf },

    #[error("{} at {} is not readable: {source}", .slot.name(), .path.display())]
    Unreadable {
        slot: TextureSlot,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while decoding or uploading a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode {} from {}: {source}", .slot.name(), .path.display())]
    Decode {
        slot: TextureSlot,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Pixel data length doesn't match the expected size for the given dimensions.
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// Resolved file path for every texture slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    paths: BTreeMap<TextureSlot, PathBuf>,
}

impl AssetPaths {
    pub fn from_config(config: &AssetConfig) -> Self {
        let paths = TextureSlot::ALL
            .into_iter()
            .map(|slot| {
                let file = match slot {
                    TextureSlot::SurfaceColor => &config.surface_map,
                    TextureSlot::SurfaceSpecular => &config.specular_map,
                    TextureSlot::SurfaceBump => &config.bump_map,
                    TextureSlot::NightLights => &config.lights_map,
                    TextureSlot::CloudColor => &config.cloud_map,
                    TextureSlot::CloudAlpha => &config.cloud_alpha_map,
                };
                (slot, config.resolve(file))
            })
            .collect();
        Self { paths }
    }

    pub fn get(&self, slot: TextureSlot) -> Option<&Path> {
        self.paths.get(&slot).map(PathBuf::as_path)
    }

    /// Slots and paths in loading order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureSlot, &Path)> {
        self.paths.iter().map(|(slot, path)| (*slot, path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Verify every configured texture file exists and can be opened.
pub fn check_assets(config: &AssetConfig) -> Result<AssetPaths, AssetError> {
    let paths = AssetPaths::from_config(config);
    for (slot, path) in paths.iter() {
        if !path.is_file() {
            return Err(AssetError::Missing {
                slot,
                path: path.to_path_buf(),
            });
        }
        std::fs::File::open(path).map_err(|source| AssetError::Unreadable {
            slot,
            path: path.to_path_buf(),
            source,
        })?;
    }
    tracing::debug!(dir = %config.texture_dir.display(), "All texture assets present");
    Ok(paths)
}

/// Calculates the number of mip levels for the given dimensions.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// A decoded RGBA8 image with its full mip chain, ready for upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub slot: TextureSlot,
    pub width: u32,
    pub height: u32,
    /// Mip levels from full size down to 1×1, tightly packed RGBA8.
    pub mips: Vec<Vec<u8>>,
}

impl DecodedImage {
    /// Build from a full-size RGBA8 image, generating the mip chain.
    pub fn from_rgba(slot: TextureSlot, image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let levels = mip_level_count(width, height);
        let mut mips = Vec::with_capacity(levels as usize);
        let mut current = image;
        for level in 1..levels {
            let next = image::imageops::resize(
                &current,
                (width >> level).max(1),
                (height >> level).max(1),
                image::imageops::FilterType::Triangle,
            );
            mips.push(std::mem::replace(&mut current, next).into_raw());
        }
        mips.push(current.into_raw());

        Self {
            slot,
            width,
            height,
            mips,
        }
    }

    /// All mip levels concatenated, as `create_texture_with_data` expects.
    fn packed(&self) -> Vec<u8> {
        self.mips.concat()
    }

    fn validate(&self) -> Result<(), TextureError> {
        if self.width == 0 || self.height == 0 {
            return Err(TextureError::ZeroDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize * 4;
        let actual = self.mips.first().map_or(0, Vec::len);
        if actual != expected {
            return Err(TextureError::DataSizeMismatch {
                actual,
                expected,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Decode one image file to RGBA8.
pub fn decode_image(slot: TextureSlot, path: &Path) -> Result<DecodedImage, TextureError> {
    let image = image::open(path)
        .map_err(|source| TextureError::Decode {
            slot,
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    Ok(DecodedImage::from_rgba(slot, image))
}

/// Decodes the texture set on a background thread.
///
/// Results arrive in slot order through [`drain`](Self::drain). The worker
/// exits after the last image.
pub struct TextureLoader {
    receiver: crossbeam_channel::Receiver<Result<DecodedImage, TextureError>>,
    worker: Option<JoinHandle<()>>,
    pending: usize,
}

impl TextureLoader {
    pub fn spawn(paths: AssetPaths) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let pending = paths.len();

        let worker = std::thread::Builder::new()
            .name("texture-loader".into())
            .spawn(move || {
                for (slot, path) in paths.iter() {
                    let result = decode_image(slot, path);
                    if sender.send(result).is_err() {
                        // Receiver gone; the viewer is shutting down.
                        return;
                    }
                }
            });

        match worker {
            Ok(handle) => Self {
                receiver,
                worker: Some(handle),
                pending,
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn texture loader thread");
                Self {
                    receiver,
                    worker: None,
                    pending: 0,
                }
            }
        }
    }

    /// Collect every result that has arrived since the last call.
    pub fn drain(&mut self) -> Vec<Result<DecodedImage, TextureError>> {
        let mut results = Vec::new();
        while let Ok(result) = self.receiver.try_recv() {
            results.push(result);
        }
        self.pending = self.pending.saturating_sub(results.len());
        if self.pending == 0
            && let Some(handle) = self.worker.take()
        {
            if handle.join().is_err() {
                tracing::warn!("Texture loader thread panicked");
            }
        }
        results
    }

    /// Images not yet received.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

struct SlotTexture {
    view: wgpu::TextureView,
    loaded: bool,
}

/// GPU textures for every slot, plus the shared sampler.
pub struct GlobeTextures {
    slots: BTreeMap<TextureSlot, SlotTexture>,
    placeholder: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl GlobeTextures {
    /// Create the sampler and a black 1×1 placeholder in every slot.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let slots = TextureSlot::ALL
            .into_iter()
            .map(|slot| {
                let view = create_placeholder(device, queue, slot_format(slot));
                (
                    slot,
                    SlotTexture {
                        view,
                        loaded: false,
                    },
                )
            })
            .collect();

        // Seam triangles carry u > 1, so u repeats; v must not bleed pole to pole.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("globe-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Self {
            slots,
            placeholder: create_placeholder(device, queue, wgpu::TextureFormat::Rgba8Unorm),
            sampler,
        }
    }

    /// Replace a slot's texture with a decoded image.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
    ) -> Result<(), TextureError> {
        use wgpu::util::DeviceExt;

        image.validate()?;
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(image.slot.name()),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: image.mips.len() as u32,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: slot_format(image.slot),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::MipMajor,
            &image.packed(),
        );

        self.slots.insert(
            image.slot,
            SlotTexture {
                view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
                loaded: true,
            },
        );
        tracing::info!(
            slot = image.slot.name(),
            width = image.width,
            height = image.height,
            "Texture uploaded"
        );
        Ok(())
    }

    /// The slot's current view: the decoded image once uploaded, else the
    /// placeholder.
    pub fn view(&self, slot: TextureSlot) -> &wgpu::TextureView {
        self.slots
            .get(&slot)
            .map_or(&self.placeholder, |texture| &texture.view)
    }

    /// Black 1×1 view for bindings a material leaves unused.
    pub fn placeholder(&self) -> &wgpu::TextureView {
        &self.placeholder
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn is_loaded(&self, slot: TextureSlot) -> bool {
        self.slots.get(&slot).is_some_and(|texture| texture.loaded)
    }
}

/// Color images are sRGB-encoded; specular, bump and alpha maps are data.
fn slot_format(slot: TextureSlot) -> wgpu::TextureFormat {
    if slot.is_color() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

fn create_placeholder(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: wgpu::TextureFormat,
) -> wgpu::TextureView {
    use wgpu::util::DeviceExt;

    device
        .create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("placeholder-texture"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &[0, 0, 0, 255],
        )
        .create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_gpu::create_test_device;
    use std::time::{Duration, Instant};

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]))
            .save(path)
            .unwrap();
    }

    fn asset_config(dir: &Path) -> AssetConfig {
        AssetConfig {
            texture_dir: dir.to_path_buf(),
            surface_map: "surface.png".into(),
            specular_map: "specular.png".into(),
            bump_map: "bump.png".into(),
            lights_map: "lights.png".into(),
            cloud_map: "clouds.png".into(),
            cloud_alpha_map: "clouds_alpha.png".into(),
        }
    }

    fn write_all(config: &AssetConfig) {
        for (_, path) in AssetPaths::from_config(config).iter() {
            write_png(path, 4, 2);
        }
    }

    fn drain_all(loader: &mut TextureLoader) -> Vec<Result<DecodedImage, TextureError>> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut results = Vec::new();
        while loader.pending() > 0 && Instant::now() < deadline {
            results.extend(loader.drain());
            std::thread::sleep(Duration::from_millis(5));
        }
        results
    }

    #[test]
    fn test_paths_resolve_against_texture_dir() {
        let config = AssetConfig::default();
        let paths = AssetPaths::from_config(&config);
        assert_eq!(paths.len(), 6);
        assert_eq!(
            paths.get(TextureSlot::CloudAlpha),
            Some(Path::new("textures/05_earthcloudmaptrans.jpg"))
        );
        assert_eq!(
            paths.get(TextureSlot::SurfaceBump),
            Some(Path::new("textures/01_earthbump1k.jpg"))
        );
    }

    #[test]
    fn test_missing_asset_names_slot_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = asset_config(dir.path());
        write_all(&config);
        std::fs::remove_file(dir.path().join("lights.png")).unwrap();

        let err = check_assets(&config).unwrap_err();
        let AssetError::Missing { slot, path } = &err else {
            panic!("expected a missing asset, got {err:?}");
        };
        assert_eq!(*slot, TextureSlot::NightLights);
        assert_eq!(path, &dir.path().join("lights.png"));
        assert!(err.to_string().contains("night lights map"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_asset_fails_check() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let config = asset_config(dir.path());
        write_all(&config);
        let bump = dir.path().join("bump.png");
        std::fs::set_permissions(&bump, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::File::open(&bump).is_ok() {
            // Running with privileges that ignore file modes.
            return;
        }

        let err = check_assets(&config).unwrap_err();
        let AssetError::Unreadable { slot, path, .. } = &err else {
            panic!("expected an unreadable asset, got {err:?}");
        };
        assert_eq!(*slot, TextureSlot::SurfaceBump);
        assert_eq!(path, &bump);
        assert!(err.to_string().contains("not readable"));
    }

    #[test]
    fn test_all_assets_present() {
        let dir = tempfile::tempdir().unwrap();
        let config = asset_config(dir.path());
        write_all(&config);
        assert_eq!(check_assets(&config).unwrap().len(), 6);
    }

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(4, 2), 3);
        assert_eq!(mip_level_count(1024, 512), 11);
    }

    #[test]
    fn test_decode_builds_mip_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        write_png(&path, 4, 2);

        let image = decode_image(TextureSlot::SurfaceColor, &path).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        let sizes: Vec<usize> = image.mips.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4 * 2 * 4, 2 * 4, 4]);
        assert_eq!(&image.mips[0][..4], &[200, 100, 50, 255]);
        assert!(image.validate().is_ok());
    }

    #[test]
    fn test_decode_failure_reports_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let err = decode_image(TextureSlot::CloudColor, &path).unwrap_err();
        assert!(matches!(
            err,
            TextureError::Decode {
                slot: TextureSlot::CloudColor,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_short_data() {
        let image = DecodedImage {
            slot: TextureSlot::SurfaceBump,
            width: 2,
            height: 2,
            mips: vec![vec![0; 4]],
        };
        assert!(matches!(
            image.validate(),
            Err(TextureError::DataSizeMismatch { expected: 16, .. })
        ));
    }

    #[test]
    fn test_loader_delivers_every_slot() {
        let dir = tempfile::tempdir().unwrap();
        let config = asset_config(dir.path());
        write_all(&config);
        std::fs::write(dir.path().join("bump.png"), b"garbage").unwrap();

        let mut loader = TextureLoader::spawn(check_assets(&config).unwrap());
        let results = drain_all(&mut loader);

        assert_eq!(results.len(), 6);
        assert_eq!(loader.pending(), 0);
        let failed: Vec<_> = results.iter().filter(|r| r.is_err()).collect();
        assert_eq!(failed.len(), 1);
        let loaded: Vec<TextureSlot> = results
            .iter()
            .filter_map(|r| r.as_ref().ok().map(|image| image.slot))
            .collect();
        assert!(!loaded.contains(&TextureSlot::SurfaceBump));
        assert!(loaded.contains(&TextureSlot::CloudAlpha));
    }

    #[test]
    fn test_upload_replaces_placeholder() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut textures = GlobeTextures::new(&device, &queue);
        assert!(!textures.is_loaded(TextureSlot::SurfaceColor));

        let image = DecodedImage::from_rgba(
            TextureSlot::SurfaceColor,
            image::RgbaImage::from_pixel(8, 4, image::Rgba([255, 255, 255, 255])),
        );
        textures.upload(&device, &queue, &image).unwrap();
        assert!(textures.is_loaded(TextureSlot::SurfaceColor));
        assert!(!textures.is_loaded(TextureSlot::CloudColor));
    }

    #[test]
    fn test_slot_formats() {
        assert_eq!(
            slot_format(TextureSlot::SurfaceColor),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            slot_format(TextureSlot::SurfaceBump),
            wgpu::TextureFormat::Rgba8Unorm
        );
    }
}
