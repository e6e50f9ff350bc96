//! Everything one frame touches, passed explicitly to the loop and bridge.

use globe_config::Config;
use globe_render::{Camera, OrbitControls, SceneRenderer};
use globe_scene::Scene;

pub struct AppContext {
    pub scene: Scene,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub renderer: Box<dyn SceneRenderer>,
}

impl AppContext {
    /// Camera and controls from config, aspect from the window size.
    pub fn new(config: &Config, scene: Scene, renderer: Box<dyn SceneRenderer>) -> Self {
        let aspect = config.window.width.max(1) as f32 / config.window.height.max(1) as f32;
        let mut camera = Camera::from_config(&config.camera, aspect);
        let mut controls = OrbitControls::from_config(&config.camera);
        controls.update(&mut camera);
        Self {
            scene,
            camera,
            controls,
            renderer,
        }
    }

    /// Resize the output and keep the camera aspect in step.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.renderer.resize(width, height);
        self.camera.set_aspect_ratio(width as f32, height as f32);
    }
}
