//! Vertex and index buffer management for GPU rendering.

use bytemuck::{Pod, Zeroable};
use globe_scene::Geometry;

/// A complete mesh buffer containing vertex and index data ready for GPU rendering.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
}

impl MeshBuffer {
    /// Bind vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), self.index_format);
    }

    /// Draw the entire mesh using indexed rendering.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Index data that can be either u16 or u32 format.
pub enum IndexData<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl IndexData<'_> {
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            IndexData::U16(_) => wgpu::IndexFormat::Uint16,
            IndexData::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            IndexData::U16(data) => data.len() as u32,
            IndexData::U32(data) => data.len() as u32,
        }
    }

    /// Raw bytes for buffer creation.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(data) => bytemuck::cast_slice(data),
            IndexData::U32(data) => bytemuck::cast_slice(data),
        }
    }
}

/// GPU buffer allocator for creating vertex and index buffers.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Create a complete mesh buffer from vertex and index data.
    pub fn create_mesh(&self, label: &str, vertices: &[u8], indices: IndexData) -> MeshBuffer {
        use wgpu::util::DeviceExt;

        let vertex_buffer = self.create_vertex_buffer(&format!("{label}-vertices"), vertices);
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}-indices")),
                contents: indices.as_bytes(),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: indices.count(),
            index_format: indices.format(),
        }
    }

    /// Upload a sphere geometry as a `u32`-indexed mesh of [`GlobeVertex`].
    pub fn create_globe_mesh(&self, label: &str, geometry: &Geometry) -> MeshBuffer {
        let vertices = GlobeVertex::from_geometry(geometry);
        self.create_mesh(
            label,
            bytemuck::cast_slice(&vertices),
            IndexData::U32(&geometry.indices),
        )
    }

    pub fn create_vertex_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;

        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
    }
}

/// Globe vertex: position, normal and equirectangular UV.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GlobeVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlobeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: (std::mem::size_of::<[f32; 3]>() * 2) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: VertexFormat::Float32x2,
                },
            ],
        }
    }

    /// Interleave the geometry's attribute arrays.
    pub fn from_geometry(geometry: &Geometry) -> Vec<Self> {
        geometry
            .positions
            .iter()
            .zip(&geometry.normals)
            .zip(&geometry.uvs)
            .map(|((p, n), uv)| GlobeVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: *uv,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_gpu::create_test_device;

    #[test]
    fn test_globe_mesh_index_count_matches_geometry() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let geometry = Geometry::icosahedron(1.0, 2);
        let mesh = BufferAllocator::new(&device).create_globe_mesh("globe", &geometry);
        assert_eq!(mesh.index_count, geometry.indices.len() as u32);
        assert_eq!(mesh.index_format, wgpu::IndexFormat::Uint32);
    }

    #[test]
    fn test_u16_mesh_creation() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mesh = BufferAllocator::new(&device).create_mesh(
            "quad",
            &[0u8; 64],
            IndexData::U16(&[0, 1, 2, 2, 1, 3]),
        );
        assert_eq!(mesh.index_count, 6);
        assert_eq!(mesh.index_format, wgpu::IndexFormat::Uint16);
    }

    #[test]
    fn test_index_data_as_bytes() {
        assert_eq!(IndexData::U16(&[0, 1, 2]).as_bytes().len(), 6);
        assert_eq!(IndexData::U32(&[0, 1, 2]).as_bytes().len(), 12);
    }

    #[test]
    fn test_globe_vertex_layout() {
        let layout = GlobeVertex::layout();
        // position (f32×3) + normal (f32×3) + uv (f32×2)
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 3);
    }

    #[test]
    fn test_from_geometry_interleaves_attributes() {
        let geometry = Geometry::icosahedron(2.0, 1);
        let vertices = GlobeVertex::from_geometry(&geometry);
        assert_eq!(vertices.len(), geometry.vertex_count());
        for (v, p) in vertices.iter().zip(&geometry.positions) {
            assert_eq!(v.position, p.to_array());
        }
        assert_eq!(vertices[0].uv, geometry.uvs[0]);
    }
}
