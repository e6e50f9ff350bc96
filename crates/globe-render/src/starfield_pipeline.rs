//! Instanced billboards for the starfield backdrop.
//!
//! One unit quad is shared by every star; per-star position, size and color
//! come from an instance buffer uploaded once at creation. Quads are sized
//! in world units and turned to face the camera in the vertex shader.

use bytemuck::{Pod, Zeroable};
use globe_scene::{STAR_SIZE, Star, Starfield};

use crate::buffer::{BufferAllocator, IndexData, MeshBuffer};
use crate::camera::{Camera, CameraUniform};
use crate::depth::DepthBuffer;
use crate::tonemap::{srgb_to_linear, with_tone_mapping};

/// WGSL body of the star shader. `aces_filmic` is prepended at pipeline
/// creation.
pub const STARFIELD_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    position: vec4<f32>,
};

@group(0) @binding(0) var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) corner: vec2<f32>,
    @location(1) center: vec3<f32>,
    @location(2) size: f32,
    @location(3) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_star(in: VertexInput) -> VertexOutput {
    // Rows of the view rotation are the camera axes in world space.
    let right = vec3<f32>(camera.view[0].x, camera.view[1].x, camera.view[2].x);
    let up = vec3<f32>(camera.view[0].y, camera.view[1].y, camera.view[2].y);
    let half = in.size * 0.5;
    let world = in.center + (right * in.corner.x + up * in.corner.y) * half;

    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(world, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_star(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(aces_filmic(in.color), 1.0);
}
"#;

const QUAD_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// GPU instance data for a single star.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct StarInstance {
    pub position: [f32; 3],
    /// Billboard edge length in world units.
    pub size: f32,
    /// Linear RGB.
    pub color: [f32; 3],
    pub _padding: f32,
}

impl StarInstance {
    /// Vertex buffer layout for instanced rendering.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<StarInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: 12,
                shader_location: 2,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 16,
                shader_location: 3,
            },
        ],
    };

    /// Star colors are sRGB-encoded; the instance carries them linear.
    pub fn from_star(star: &Star) -> Self {
        Self {
            position: star.position.to_array(),
            size: STAR_SIZE,
            color: star.color.map(srgb_to_linear),
            _padding: 0.0,
        }
    }
}

const CORNER_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: 0,
        shader_location: 0,
    }],
};

pub struct StarfieldRenderer {
    pipeline: wgpu::RenderPipeline,
    quad: MeshBuffer,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    camera_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl StarfieldRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        starfield: &Starfield,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("starfield-shader"),
            source: wgpu::ShaderSource::Wgsl(with_tone_mapping(STARFIELD_SHADER_SOURCE).into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("starfield-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<CameraUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("starfield-camera-uniform"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("starfield-bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("starfield-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("starfield-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_star"),
                buffers: &[CORNER_LAYOUT, StarInstance::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::stencil_state(true)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_star"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let allocator = BufferAllocator::new(device);
        let quad = allocator.create_mesh(
            "star-quad",
            bytemuck::cast_slice(&QUAD_CORNERS),
            IndexData::U16(&QUAD_INDICES),
        );

        let instances: Vec<StarInstance> =
            starfield.stars().iter().map(StarInstance::from_star).collect();
        // Zero-sized vertex buffers are rejected; keep one zeroed instance.
        let instance_bytes: &[u8] = if instances.is_empty() {
            bytemuck::bytes_of(&ZERO_INSTANCE)
        } else {
            bytemuck::cast_slice(&instances)
        };
        let instance_buffer = allocator.create_vertex_buffer("star-instances", instance_bytes);

        log::info!("Starfield renderer initialized with {} stars", instances.len());

        Self {
            pipeline,
            quad,
            instance_buffer,
            instance_count: instances.len() as u32,
            camera_buffer,
            bind_group,
        }
    }

    pub fn prepare(&self, queue: &wgpu::Queue, camera: &Camera) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera.to_uniform()),
        );
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        self.quad.bind(pass);
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.draw_indexed(0..self.quad.index_count, 0, 0..self.instance_count);
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

const ZERO_INSTANCE: StarInstance = StarInstance {
    position: [0.0; 3],
    size: 0.0,
    color: [0.0; 3],
    _padding: 0.0,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_gpu::create_test_device;
    use glam::Vec3;
    use globe_scene::StarfieldGenerator;

    #[test]
    fn test_instance_data_alignment() {
        assert_eq!(std::mem::size_of::<StarInstance>(), 32);
        assert_eq!(std::mem::size_of::<StarInstance>() % 16, 0);
    }

    #[test]
    fn test_instance_converts_color_to_linear() {
        let star = Star {
            position: Vec3::new(30.0, 0.0, 0.0),
            color: [1.0, 0.5, 0.0],
        };
        let instance = StarInstance::from_star(&star);
        assert_eq!(instance.position, [30.0, 0.0, 0.0]);
        assert_eq!(instance.size, STAR_SIZE);
        assert!((instance.color[0] - 1.0).abs() < 1e-6);
        assert!((instance.color[1] - 0.214).abs() < 1e-3);
        assert_eq!(instance.color[2], 0.0);
    }

    #[test]
    fn test_quad_covers_both_triangles() {
        let mut corners_used = [false; 4];
        for index in QUAD_INDICES {
            corners_used[index as usize] = true;
        }
        assert!(corners_used.iter().all(|used| *used));
        assert_eq!(QUAD_INDICES.len(), 6);
    }

    #[test]
    fn test_shader_uses_instance_locations() {
        for attribute in StarInstance::LAYOUT.attributes {
            let tag = format!("@location({})", attribute.shader_location);
            assert!(STARFIELD_SHADER_SOURCE.contains(&tag), "missing {tag}");
        }
    }

    #[test]
    fn test_renderer_uploads_every_star() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let starfield = StarfieldGenerator::new(7, 64).generate();
        let renderer =
            StarfieldRenderer::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb, &starfield);
        assert_eq!(renderer.instance_count(), 64);
    }

    #[test]
    fn test_empty_starfield_draws_nothing() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let starfield = StarfieldGenerator::new(7, 0).generate();
        let renderer =
            StarfieldRenderer::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb, &starfield);
        assert_eq!(renderer.instance_count(), 0);
    }
}
