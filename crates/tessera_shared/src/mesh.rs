use bytemuck::{Pod, Zeroable};

use crate::block::{face_tex_coords, BlockId, Face, CUBE_FACE_VERTICES};
use crate::chunk::ChunkData;
use crate::coords::{index_to_local, ChunkPos, LocalPos, CHUNK_VOLUME};

pub const FLOATS_PER_VERTEX: usize = 5;
pub const VERTICES_PER_FACE: usize = 4;
pub const INDICES_PER_FACE: usize = 6;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}
const _: [(); FLOATS_PER_VERTEX * 4] = [(); std::mem::size_of::<MeshVertex>()];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    pub vertices: Vec<MeshVertex>,
}

impl ChunkMesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_FACE
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Two triangles per quad, `(0, 1, 2)` and `(2, 3, 0)`.
    pub fn quad_indices(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(self.face_count() * INDICES_PER_FACE);
        for face in 0..self.face_count() as u32 {
            let base = face * VERTICES_PER_FACE as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        indices
    }
}

/// Neighbours outside the chunk count as air.
pub fn build_chunk_mesh(chunk: &ChunkData, chunk_pos: ChunkPos) -> ChunkMesh {
    let mut mesh = ChunkMesh::default();
    let origin = chunk_pos.origin();

    for index in 0..CHUNK_VOLUME {
        let block = chunk.get_index(index);
        if block == BlockId::AIR {
            continue;
        }

        let local = index_to_local(index);
        let base = [
            origin.x + f32::from(local.x),
            origin.y + f32::from(local.y),
            origin.z + f32::from(local.z),
        ];

        for face in Face::ALL {
            if !neighbour_is_transparent(chunk, local, face) {
                continue;
            }
            push_face(&mut mesh, block, face, base);
        }
    }

    mesh
}

fn neighbour_is_transparent(chunk: &ChunkData, local: LocalPos, face: Face) -> bool {
    let normal = face.normal_ivec3();
    LocalPos::checked(
        i32::from(local.x) + normal.x,
        i32::from(local.y) + normal.y,
        i32::from(local.z) + normal.z,
    )
    .map_or(true, |neighbour| chunk.get(neighbour).is_transparent())
}

fn push_face(mesh: &mut ChunkMesh, block: BlockId, face: Face, base: [f32; 3]) {
    let corners = &CUBE_FACE_VERTICES[face.index()];
    let tex_coords = face_tex_coords(block, face);
    for (corner, tex_coord) in corners.iter().zip(tex_coords) {
        mesh.vertices.push(MeshVertex {
            position: [
                corner[0] + base[0],
                corner[1] + base[1],
                corner[2] + base[2],
            ],
            tex_coord,
        });
    }
}
