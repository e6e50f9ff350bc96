//! The renderer seam used by the render loop.
//!
//! [`WgpuSceneRenderer`] draws into a window surface. [`HeadlessRenderer`]
//! records what each frame would have drawn and can be told to fail on
//! chosen frames, which is all the loop needs for tests and `--headless`.

use std::collections::BTreeSet;

use glam::Vec3;
use globe_scene::{LayerKind, Scene};

use crate::camera::Camera;
use crate::depth::DepthBuffer;
use crate::globe_pipeline::GlobeRenderer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK};
use crate::starfield_pipeline::StarfieldRenderer;
use crate::texture::{AssetPaths, GlobeTextures, TextureLoader};

/// A frame that could not be drawn. The loop logs it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface unavailable: {0}")]
    Surface(#[from] SurfaceError),

    #[error("injected failure on frame {0}")]
    Injected(u64),
}

/// Draws a scene from a camera. One call per frame.
pub trait SceneRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError>;

    /// Called when the output size changes. Zero sizes are ignored.
    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// What a [`HeadlessRenderer`] saw on one successful frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Attached layers in draw order.
    pub attached: Vec<LayerKind>,
    /// Layer y rotations, indexed by [`LayerKind::index`].
    pub rotations: [f32; 4],
    pub camera_position: Vec3,
}

/// A renderer without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: Vec<FrameRecord>,
    attempts: u64,
    fail_on: BTreeSet<u64>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the given zero-based render attempts fail with an injected error.
    pub fn fail_on(mut self, attempts: impl IntoIterator<Item = u64>) -> Self {
        self.fail_on.extend(attempts);
        self
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Number of `render` calls, failed or not.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_on.contains(&attempt) {
            return Err(RenderError::Injected(attempt));
        }

        let mut rotations = [0.0; 4];
        for (kind, layer) in scene.body.layers().iter() {
            rotations[kind.index()] = layer.mesh.transform.rotation_y;
        }
        self.frames.push(FrameRecord {
            attached: scene.body.attached_layers().collect(),
            rotations,
            camera_position: camera.position,
        });
        Ok(())
    }
}

/// Draws the starfield and the globe into the window surface.
pub struct WgpuSceneRenderer {
    ctx: RenderContext,
    depth: DepthBuffer,
    globe: GlobeRenderer,
    stars: StarfieldRenderer,
    globe_textures: GlobeTextures,
    loader: TextureLoader,
}

impl WgpuSceneRenderer {
    /// Create every pipeline and start decoding textures in the background.
    pub fn new(ctx: RenderContext, scene: &Scene, assets: AssetPaths) -> Self {
        let (width, height) = ctx.size();
        let depth = DepthBuffer::new(&ctx.device, width, height);
        let globe_textures = GlobeTextures::new(&ctx.device, &ctx.queue);
        let globe = GlobeRenderer::new(
            &ctx.device,
            ctx.surface_format,
            &scene.body,
            &globe_textures,
        );
        let stars = StarfieldRenderer::new(&ctx.device, ctx.surface_format, scene.starfield());
        let loader = TextureLoader::spawn(assets);

        Self {
            ctx,
            depth,
            globe,
            stars,
            globe_textures,
            loader,
        }
    }

    /// Upload whatever the loader finished since the last frame.
    fn poll_textures(&mut self) {
        if self.loader.pending() == 0 {
            return;
        }
        for result in self.loader.drain() {
            let uploaded = result.and_then(|image| {
                self.globe_textures
                    .upload(&self.ctx.device, &self.ctx.queue, &image)
                    .map(|()| image.slot)
            });
            match uploaded {
                Ok(slot) => {
                    self.globe
                        .texture_changed(&self.ctx.device, &self.globe_textures, slot);
                }
                Err(e) => tracing::warn!(error = %e, "Keeping placeholder texture"),
            }
        }
    }
}

impl SceneRenderer for WgpuSceneRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        self.poll_textures();

        let surface_texture = self.ctx.get_current_texture()?;
        self.stars.prepare(&self.ctx.queue, camera);
        self.globe.prepare(&self.ctx.queue, scene, camera);

        let mut frame = FrameEncoder::new(&self.ctx.device, surface_texture);
        {
            let builder = RenderPassBuilder::new()
                .clear_color(SPACE_BLACK)
                .depth(&self.depth.view, DepthBuffer::CLEAR_VALUE)
                .label("globe-frame");
            let mut pass = frame.begin_render_pass(&builder);
            self.stars.draw(&mut pass);
            self.globe.draw(&mut pass, &scene.body);
        }
        frame.submit(&self.ctx.queue);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.ctx.resize(width, height);
        self.depth.resize(&self.ctx.device, width, height);
        log::debug!("Resized surface to {width}x{height}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_config::Config;

    fn scene() -> (Scene, Camera) {
        let mut config = Config::default();
        config.globe.detail = 1;
        config.starfield.count = 16;
        (
            Scene::from_config(&config),
            Camera::from_config(&config.camera, 1.0),
        )
    }

    #[test]
    fn test_headless_records_attached_layers() {
        let (mut scene, camera) = scene();
        let mut renderer = HeadlessRenderer::new();
        renderer.render(&scene, &camera).unwrap();

        scene.body.toggle(LayerKind::Clouds);
        renderer.render(&scene, &camera).unwrap();

        let frames = renderer.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].attached, LayerKind::ALL.to_vec());
        assert_eq!(
            frames[1].attached,
            vec![LayerKind::Surface, LayerKind::Lights, LayerKind::Glow]
        );
        assert_eq!(frames[1].camera_position, camera.position);
    }

    #[test]
    fn test_headless_records_rotations() {
        let (mut scene, camera) = scene();
        let mut renderer = HeadlessRenderer::new();
        scene.body.animate();
        renderer.render(&scene, &camera).unwrap();
        let rotations = renderer.frames()[0].rotations;
        assert_eq!(rotations[LayerKind::Surface.index()], 0.0);
        assert!(rotations[LayerKind::Clouds.index()] > 0.0);
    }

    #[test]
    fn test_injected_failures_are_not_recorded() {
        let (scene, camera) = scene();
        let mut renderer = HeadlessRenderer::new().fail_on([1]);
        assert!(renderer.render(&scene, &camera).is_ok());
        assert!(matches!(
            renderer.render(&scene, &camera),
            Err(RenderError::Injected(1))
        ));
        assert!(renderer.render(&scene, &camera).is_ok());
        assert_eq!(renderer.attempts(), 3);
        assert_eq!(renderer.frames().len(), 2);
    }

    #[test]
    fn test_surface_error_converts() {
        let error: RenderError = SurfaceError::Timeout.into();
        assert!(matches!(error, RenderError::Surface(SurfaceError::Timeout)));
        assert_eq!(error.to_string(), "surface unavailable: timeout");
    }
}
