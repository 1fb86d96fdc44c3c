use bytemuck::{Pod, Zeroable};
use glam::IVec3;

use super::atlas::AtlasLayout;
use super::face::FaceDirection;
use super::mesh::{ChunkFace, ChunkMesh};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ChunkVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// 0..1 coordinate inside the tile; the shader offsets it by `tile_origin`.
    pub tex_coord: [f32; 2],
    pub tile_origin: [f32; 2],
    pub shade: f32,
    pub ao: f32,
}
const _: [(); 48] = [(); std::mem::size_of::<ChunkVertex>()];

impl ChunkVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x2,
        4 => Float32,
        5 => Float32
    ];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ChunkVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side buffers ready for upload; building them touches no GPU state.
#[derive(Debug, Clone, Default)]
pub struct GpuMesh {
    pub vertices: Vec<ChunkVertex>,
    pub indices: Vec<u32>,
}

impl GpuMesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl ChunkMesh {
    /// Flattens faces into indexed quads in world space.
    pub fn to_gpu_mesh(&self, world_origin: IVec3, atlas: &AtlasLayout) -> GpuMesh {
        let mut mesh = GpuMesh {
            vertices: Vec::with_capacity(self.len() * 4),
            indices: Vec::with_capacity(self.len() * 6),
        };
        let origin = world_origin.as_vec3().to_array();

        for face in self.faces() {
            push_face(&mut mesh, face, origin, atlas);
        }
        mesh
    }
}

fn push_face(mesh: &mut GpuMesh, face: &ChunkFace, origin: [f32; 3], atlas: &AtlasLayout) {
    let base_index = mesh.vertices.len() as u32;
    let normal = face.direction.normal().as_vec3().to_array();
    let tile_origin = atlas.tile_origin(face.texture);
    let corners = face.direction.descriptor();
    let positions = face.vertex_positions();

    for i in 0..4 {
        let [x, y, z] = positions[i];
        mesh.vertices.push(ChunkVertex {
            position: [x + origin[0], y + origin[1], z + origin[2]],
            normal,
            tex_coord: tile_uv(face.direction, corners.corner(i)),
            tile_origin,
            shade: face.shade,
            ao: face.ao[i],
        });
    }

    mesh.indices.extend_from_slice(&[
        base_index,
        base_index + 1,
        base_index + 2,
        base_index,
        base_index + 2,
        base_index + 3,
    ]);
}

fn tile_uv(direction: FaceDirection, [cx, cy, cz]: [f32; 3]) -> [f32; 2] {
    match direction {
        FaceDirection::Top | FaceDirection::Bottom => [cx, cz],
        FaceDirection::Left | FaceDirection::Right => [cz, 1.0 - cy],
        FaceDirection::Front | FaceDirection::Back => [cx, 1.0 - cy],
    }
}
