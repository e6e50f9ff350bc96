//! GPU pipelines for the four globe layers.
//!
//! All layers draw the same vertex/index buffer (the body's shared
//! geometry) through one vertex entry point. Each layer gets its own
//! pipeline, derived from its [`Material`]: the shading model picks the
//! fragment entry point, the blend mode picks the blend state, and
//! transparent materials skip depth writes.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use globe_scene::{
    BlendMode, CelestialBody, LayerKind, Material, Scene, Shading, SunLight, TextureSlot,
};

use crate::buffer::{BufferAllocator, GlobeVertex, MeshBuffer};
use crate::camera::{Camera, CameraUniform};
use crate::depth::DepthBuffer;
use crate::texture::GlobeTextures;
use crate::tonemap::{srgb_to_linear, with_tone_mapping};

/// WGSL body of the globe shader. `aces_filmic` is prepended at pipeline
/// creation.
pub const GLOBE_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    position: vec4<f32>,
};

struct SunUniform {
    direction: vec4<f32>,
    radiance: vec4<f32>,
};

struct LayerUniform {
    model: mat4x4<f32>,
    // x: opacity, y: bump scale
    params: vec4<f32>,
    rim: vec4<f32>,
    facing: vec4<f32>,
    // x: bias, y: scale, z: power
    fresnel: vec4<f32>,
};

@group(0) @binding(0) var<uniform> camera: CameraUniform;
@group(0) @binding(1) var<uniform> sun: SunUniform;

@group(1) @binding(0) var<uniform> layer: LayerUniform;
@group(1) @binding(1) var map_0: texture_2d<f32>;
@group(1) @binding(2) var map_1: texture_2d<f32>;
@group(1) @binding(3) var map_2: texture_2d<f32>;
@group(1) @binding(4) var map_sampler: sampler;

const RECIPROCAL_PI: f32 = 0.3183098861837907;
// 0x111111 in linear space.
const PHONG_SPECULAR: vec3<f32> = vec3<f32>(0.005605);
const PHONG_SHININESS: f32 = 30.0;
const DIELECTRIC_F0: vec3<f32> = vec3<f32>(0.04);

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_globe(in: VertexInput) -> VertexOutput {
    let world = layer.model * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = camera.view_proj * world;
    out.world_position = world.xyz;
    // Model is rotation and uniform scale only.
    out.world_normal = normalize((layer.model * vec4<f32>(in.normal, 0.0)).xyz);
    out.uv = in.uv;
    return out;
}

fn f_schlick(f0: vec3<f32>, f90: f32, dot_vh: f32) -> vec3<f32> {
    let fresnel = exp2((-5.55473 * dot_vh - 6.98316) * dot_vh);
    return f0 * (1.0 - fresnel) + f90 * fresnel;
}

fn brdf_blinn_phong(l: vec3<f32>, v: vec3<f32>, n: vec3<f32>, specular: vec3<f32>, shininess: f32) -> vec3<f32> {
    let h = normalize(l + v);
    let dot_nh = saturate(dot(n, h));
    let dot_vh = saturate(dot(v, h));
    let f = f_schlick(specular, 1.0, dot_vh);
    let d = RECIPROCAL_PI * (shininess * 0.5 + 1.0) * pow(dot_nh, shininess);
    return f * (0.25 * d);
}

fn brdf_ggx(l: vec3<f32>, v: vec3<f32>, n: vec3<f32>, f0: vec3<f32>, roughness: f32) -> vec3<f32> {
    let alpha = roughness * roughness;
    let a2 = alpha * alpha;
    let h = normalize(l + v);
    let dot_nl = saturate(dot(n, l));
    let dot_nv = saturate(dot(n, v));
    let dot_nh = saturate(dot(n, h));
    let dot_vh = saturate(dot(v, h));

    let f = f_schlick(f0, 1.0, dot_vh);
    let gv = dot_nl * sqrt(a2 + (1.0 - a2) * dot_nv * dot_nv);
    let gl = dot_nv * sqrt(a2 + (1.0 - a2) * dot_nl * dot_nl);
    let visibility = 0.5 / max(gv + gl, 1e-6);
    let denom = dot_nh * dot_nh * (a2 - 1.0) + 1.0;
    let d = RECIPROCAL_PI * a2 / (denom * denom);
    return f * (visibility * d);
}

// Screen-space derivative bump mapping; map_2 holds the height.
fn perturb_normal(position: vec3<f32>, normal: vec3<f32>, uv: vec2<f32>, bump_scale: f32) -> vec3<f32> {
    let duv_dx = dpdx(uv);
    let duv_dy = dpdy(uv);
    let h_ll = bump_scale * textureSample(map_2, map_sampler, uv).x;
    let d_bx = bump_scale * textureSample(map_2, map_sampler, uv + duv_dx).x - h_ll;
    let d_by = bump_scale * textureSample(map_2, map_sampler, uv + duv_dy).x - h_ll;

    let sigma_x = normalize(dpdx(position));
    let sigma_y = normalize(dpdy(position));
    let r1 = cross(sigma_y, normal);
    let r2 = cross(normal, sigma_x);
    let det = dot(sigma_x, r1);
    let grad = sign(det) * (d_bx * r1 + d_by * r2);
    return normalize(abs(det) * normal - grad);
}

@fragment
fn fs_phong(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(map_0, map_sampler, in.uv).rgb;
    let specular_strength = textureSample(map_1, map_sampler, in.uv).r;
    let n = perturb_normal(in.world_position, normalize(in.world_normal), in.uv, layer.params.y);
    let v = normalize(camera.position.xyz - in.world_position);
    let l = sun.direction.xyz;

    let irradiance = saturate(dot(n, l)) * sun.radiance.rgb;
    let diffuse = irradiance * albedo * RECIPROCAL_PI;
    let specular = irradiance * brdf_blinn_phong(l, v, n, PHONG_SPECULAR, PHONG_SHININESS) * specular_strength;
    return vec4<f32>(aces_filmic(diffuse + specular), layer.params.x);
}

@fragment
fn fs_basic(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(map_0, map_sampler, in.uv);
    return vec4<f32>(aces_filmic(color.rgb), layer.params.x * color.a);
}

@fragment
fn fs_standard(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(map_0, map_sampler, in.uv);
    let coverage = textureSample(map_1, map_sampler, in.uv).g;
    let n = normalize(in.world_normal);
    let v = normalize(camera.position.xyz - in.world_position);
    let l = sun.direction.xyz;

    let irradiance = saturate(dot(n, l)) * sun.radiance.rgb;
    let diffuse = irradiance * color.rgb * RECIPROCAL_PI;
    let specular = irradiance * brdf_ggx(l, v, n, DIELECTRIC_F0, 1.0);
    return vec4<f32>(aces_filmic(diffuse + specular), layer.params.x * color.a * coverage);
}

@fragment
fn fs_fresnel(in: VertexOutput) -> @location(0) vec4<f32> {
    let incident = normalize(in.world_position - camera.position.xyz);
    let n = normalize(in.world_normal);
    let reflection = layer.fresnel.x + layer.fresnel.y * pow(1.0 + dot(incident, n), layer.fresnel.z);
    let f = clamp(reflection, 0.0, 1.0);
    return vec4<f32>(mix(layer.facing.rgb, layer.rim.rgb, vec3<f32>(f)), f);
}
"#;

/// Sun light data matching the WGSL `SunUniform` struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SunUniform {
    /// Unit vector toward the light; `w` unused.
    pub direction: [f32; 4],
    /// Color × intensity; `w` unused.
    pub radiance: [f32; 4],
}

impl SunUniform {
    pub fn from_light(sun: &SunLight) -> Self {
        Self {
            direction: sun.direction_to_light().extend(0.0).to_array(),
            radiance: sun.radiance().extend(1.0).to_array(),
        }
    }
}

/// Per-layer data matching the WGSL `LayerUniform` struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct LayerUniform {
    pub model: [[f32; 4]; 4],
    /// x: opacity, y: bump scale.
    pub params: [f32; 4],
    /// Linear rim color.
    pub rim: [f32; 4],
    /// Linear facing color.
    pub facing: [f32; 4],
    /// x: bias, y: scale, z: power.
    pub fresnel: [f32; 4],
}

impl LayerUniform {
    pub fn new(material: &Material, model: Mat4) -> Self {
        let mut uniform = Self {
            model: model.to_cols_array_2d(),
            params: [material.opacity, 0.0, 0.0, 0.0],
            rim: [0.0; 4],
            facing: [0.0; 4],
            fresnel: [0.0; 4],
        };
        match &material.shading {
            Shading::Phong { bump_scale, .. } => uniform.params[1] = *bump_scale,
            Shading::Fresnel(params) => {
                let linear = |c: glam::Vec3| {
                    [
                        srgb_to_linear(c.x),
                        srgb_to_linear(c.y),
                        srgb_to_linear(c.z),
                        1.0,
                    ]
                };
                uniform.rim = linear(params.rim_color);
                uniform.facing = linear(params.facing_color);
                uniform.fresnel = [params.bias, params.scale, params.power, 0.0];
            }
            Shading::Basic { .. } | Shading::Standard { .. } => {}
        }
        uniform
    }
}

/// Fragment entry point implementing a shading model.
pub fn fragment_entry(shading: &Shading) -> &'static str {
    match shading {
        Shading::Phong { .. } => "fs_phong",
        Shading::Basic { .. } => "fs_basic",
        Shading::Standard { .. } => "fs_standard",
        Shading::Fresnel(_) => "fs_fresnel",
    }
}

/// Blend state for a material. Additive adds `src * src_alpha` to the
/// destination; opaque materials replace it.
pub fn blend_state(material: &Material) -> Option<wgpu::BlendState> {
    match material.blend {
        BlendMode::Additive => {
            let additive = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            Some(wgpu::BlendState {
                color: additive,
                alpha: additive,
            })
        }
        BlendMode::Normal if material.transparent => Some(wgpu::BlendState::ALPHA_BLENDING),
        BlendMode::Normal => None,
    }
}

struct LayerGpu {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    textures: Vec<TextureSlot>,
}

/// Owns the shared globe mesh, the frame uniforms and one pipeline per layer.
pub struct GlobeRenderer {
    mesh: MeshBuffer,
    camera_buffer: wgpu::Buffer,
    sun_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    layer_bind_group_layout: wgpu::BindGroupLayout,
    /// Indexed by [`LayerKind::index`].
    layers: Vec<LayerGpu>,
}

impl GlobeRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        body: &CelestialBody,
        globe_textures: &GlobeTextures,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("globe-shader"),
            source: wgpu::ShaderSource::Wgsl(with_tone_mapping(GLOBE_SHADER_SOURCE).into()),
        });

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-frame-bgl"),
                entries: &[
                    uniform_entry::<CameraUniform>(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    uniform_entry::<SunUniform>(1, wgpu::ShaderStages::FRAGMENT),
                ],
            });

        let layer_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-layer-bgl"),
                entries: &[
                    uniform_entry::<LayerUniform>(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    texture_entry(1),
                    texture_entry(2),
                    texture_entry(3),
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("globe-pipeline-layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &layer_bind_group_layout],
            immediate_size: 0,
        });

        let camera_buffer = create_uniform_buffer::<CameraUniform>(device, "globe-camera-uniform");
        let sun_buffer = create_uniform_buffer::<SunUniform>(device, "globe-sun-uniform");
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globe-frame-bg"),
            layout: &frame_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sun_buffer.as_entire_binding(),
                },
            ],
        });

        let layers = LayerKind::ALL
            .into_iter()
            .map(|kind| {
                let material = &body.layer(kind).mesh.material;
                let pipeline = create_layer_pipeline(
                    device,
                    &shader,
                    &pipeline_layout,
                    surface_format,
                    kind,
                    material,
                );
                let uniform_buffer = create_uniform_buffer::<LayerUniform>(device, kind.name());
                let textures = material.textures();
                let bind_group = create_layer_bind_group(
                    device,
                    &layer_bind_group_layout,
                    &uniform_buffer,
                    &textures,
                    globe_textures,
                );
                LayerGpu {
                    pipeline,
                    uniform_buffer,
                    bind_group,
                    textures,
                }
            })
            .collect();

        let mesh = BufferAllocator::new(device).create_globe_mesh("globe", body.geometry());
        log::info!(
            "Globe renderer initialized ({} triangles shared by {} layers)",
            mesh.index_count / 3,
            LayerKind::ALL.len()
        );

        Self {
            mesh,
            camera_buffer,
            sun_buffer,
            frame_bind_group,
            layer_bind_group_layout,
            layers,
        }
    }

    /// Rebind every layer that samples `slot` after its texture changed.
    /// Returns the number of layers rebound.
    pub fn texture_changed(
        &mut self,
        device: &wgpu::Device,
        globe_textures: &GlobeTextures,
        slot: TextureSlot,
    ) -> usize {
        let mut rebound = 0;
        for layer in self.layers.iter_mut().filter(|l| l.textures.contains(&slot)) {
            layer.bind_group = create_layer_bind_group(
                device,
                &self.layer_bind_group_layout,
                &layer.uniform_buffer,
                &layer.textures,
                globe_textures,
            );
            rebound += 1;
        }
        rebound
    }

    /// Upload the camera, sun and every layer's uniforms for this frame.
    pub fn prepare(&self, queue: &wgpu::Queue, scene: &Scene, camera: &Camera) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera.to_uniform()),
        );
        queue.write_buffer(
            &self.sun_buffer,
            0,
            bytemuck::bytes_of(&SunUniform::from_light(scene.sun())),
        );
        for (kind, layer) in scene.body.layers().iter() {
            let uniform = LayerUniform::new(&layer.mesh.material, scene.body.model_matrix(kind));
            queue.write_buffer(
                &self.layers[kind.index()].uniform_buffer,
                0,
                bytemuck::bytes_of(&uniform),
            );
        }
    }

    /// Draw the attached layers in canonical order.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, body: &CelestialBody) {
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        self.mesh.bind(pass);
        for kind in body.attached_layers() {
            let layer = &self.layers[kind.index()];
            pass.set_pipeline(&layer.pipeline);
            pass.set_bind_group(1, &layer.bind_group, &[]);
            self.mesh.draw(pass);
        }
    }
}

fn create_layer_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    kind: LayerKind,
    material: &Material,
) -> wgpu::RenderPipeline {
    let label = format!("globe-{}-pipeline", kind.name());
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_globe"),
            buffers: &[GlobeVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(DepthBuffer::stencil_state(!material.transparent)),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry(&material.shading)),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: blend_state(material),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

/// Bindings 1..=3 take the material's textures in order; unused bindings
/// get the placeholder.
fn create_layer_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    textures: &[TextureSlot],
    globe_textures: &GlobeTextures,
) -> wgpu::BindGroup {
    let view = |i: usize| {
        textures
            .get(i)
            .map_or(globe_textures.placeholder(), |slot| globe_textures.view(*slot))
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("globe-layer-bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view(0)),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(view(1)),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(view(2)),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(globe_textures.sampler()),
            },
        ],
    })
}

fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn create_uniform_buffer<T: Pod>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
