//! wgpu rendering for the globe viewer: surface management, camera and orbit
//! controls, texture loading, and the globe and starfield pipelines.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod globe_pipeline;
pub mod gpu;
pub mod orbit;
pub mod pass;
pub mod renderer;
pub mod starfield_pipeline;
pub mod texture;
pub mod tonemap;

#[cfg(test)]
mod test_gpu;

pub use buffer::{BufferAllocator, GlobeVertex, IndexData, MeshBuffer};
pub use camera::{Camera, CameraUniform};
pub use depth::DepthBuffer;
pub use globe_pipeline::{
    GLOBE_SHADER_SOURCE, GlobeRenderer, LayerUniform, SunUniform, blend_state, fragment_entry,
};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use orbit::OrbitControls;
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK};
pub use renderer::{FrameRecord, HeadlessRenderer, RenderError, SceneRenderer, WgpuSceneRenderer};
pub use starfield_pipeline::{STARFIELD_SHADER_SOURCE, StarInstance, StarfieldRenderer};
pub use texture::{
    AssetError, AssetPaths, DecodedImage, GlobeTextures, TextureError, TextureLoader,
    check_assets, decode_image, mip_level_count,
};
pub use tonemap::{aces_filmic, srgb_to_linear, with_tone_mapping};
