//! Render pass abstraction for reducing wgpu boilerplate.
//!
//! [`RenderPassBuilder`] describes the clear color and depth attachment;
//! [`FrameEncoder`] owns one frame's command encoder and surface texture
//! until it is submitted and presented.

/// Background color behind the starfield.
pub const SPACE_BLACK: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

#[derive(Debug, Clone, Copy)]
struct DepthAttachment<'a> {
    view: &'a wgpu::TextureView,
    clear_value: f32,
}

/// Builder for configuring render pass descriptors with a fluent API.
#[derive(Debug, Clone, Copy)]
pub struct RenderPassBuilder<'a> {
    clear_color: wgpu::Color,
    depth: Option<DepthAttachment<'a>>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RenderPassBuilder<'a> {
    /// A builder that clears to [`SPACE_BLACK`] with no depth attachment.
    pub fn new() -> Self {
        Self {
            clear_color: SPACE_BLACK,
            depth: None,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Attach a depth buffer, cleared to `clear_value` at the start of the pass.
    pub fn depth(mut self, view: &'a wgpu::TextureView, clear_value: f32) -> Self {
        self.depth = Some(DepthAttachment { view, clear_value });
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    fn begin<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'e> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_stencil_attachment =
            self.depth
                .map(|depth| wgpu::RenderPassDepthStencilAttachment {
                    view: depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(depth.clear_value),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// One frame's command encoder and acquired surface texture.
///
/// Consumed by [`submit`](Self::submit). Dropping it without submitting
/// discards the frame.
pub struct FrameEncoder {
    encoder: wgpu::CommandEncoder,
    surface_texture: wgpu::SurfaceTexture,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, surface_texture: wgpu::SurfaceTexture) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder,
            surface_texture,
            surface_view,
        }
    }

    /// Begin a render pass targeting the surface texture.
    pub fn begin_render_pass(&mut self, builder: &RenderPassBuilder<'_>) -> wgpu::RenderPass<'_> {
        builder.begin(&mut self.encoder, &self.surface_view)
    }

    /// Submit the recorded commands and present the surface texture.
    pub fn submit(self, queue: &wgpu::Queue) {
        queue.submit([self.encoder.finish()]);
        self.surface_texture.present();
    }
}
