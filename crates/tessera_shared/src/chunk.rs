use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::block::BlockId;
use crate::coords::{local_to_index, ChunkPos, LocalPos, CHUNK_SIZE, CHUNK_VOLUME};
use crate::mesh::{build_chunk_mesh, ChunkMesh};
use crate::worldgen::TerrainGenerator;

/// Serializes as a nested `[x][y][z]` array of block ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkData {
    pub blocks: Box<[BlockId; CHUNK_VOLUME]>,
}

impl ChunkData {
    pub fn new_empty() -> Self {
        Self::new_filled(BlockId::AIR)
    }

    pub fn new_filled(block: BlockId) -> Self {
        Self {
            blocks: Box::new([block; CHUNK_VOLUME]),
        }
    }

    pub fn get(&self, local: LocalPos) -> BlockId {
        self.blocks[local_to_index(local)]
    }

    pub fn set(&mut self, local: LocalPos, block: BlockId) {
        let index = local_to_index(local);
        self.blocks[index] = block;
    }

    pub fn get_index(&self, index: usize) -> BlockId {
        self.blocks[index]
    }

    pub fn set_index(&mut self, index: usize, block: BlockId) {
        self.blocks[index] = block;
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|block| *block == BlockId::AIR)
    }

    pub fn to_nested(&self) -> Vec<Vec<Vec<BlockId>>> {
        self.blocks
            .chunks_exact(CHUNK_SIZE * CHUNK_SIZE)
            .map(|plane| plane.chunks_exact(CHUNK_SIZE).map(<[BlockId]>::to_vec).collect())
            .collect()
    }

    pub fn from_nested(nested: &[Vec<Vec<BlockId>>]) -> Result<Self, String> {
        if nested.len() != CHUNK_SIZE {
            return Err(format!(
                "expected {CHUNK_SIZE} x-planes, got {}",
                nested.len()
            ));
        }

        let mut chunk = Self::new_empty();
        let mut index = 0;
        for (x, plane) in nested.iter().enumerate() {
            if plane.len() != CHUNK_SIZE {
                return Err(format!(
                    "expected {CHUNK_SIZE} rows in plane x={x}, got {}",
                    plane.len()
                ));
            }
            for (y, row) in plane.iter().enumerate() {
                if row.len() != CHUNK_SIZE {
                    return Err(format!(
                        "expected {CHUNK_SIZE} blocks in row x={x} y={y}, got {}",
                        row.len()
                    ));
                }
                for &block in row {
                    chunk.blocks[index] = block;
                    index += 1;
                }
            }
        }
        Ok(chunk)
    }
}

impl Default for ChunkData {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl Serialize for ChunkData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_nested().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChunkData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nested = Vec::<Vec<Vec<BlockId>>>::deserialize(deserializer)?;
        Self::from_nested(&nested).map_err(de::Error::custom)
    }
}

#[derive(Clone, Debug)]
pub struct Chunk {
    pos: ChunkPos,
    data: ChunkData,
    dirty: bool,
}

impl Chunk {
    pub fn generate(pos: ChunkPos, generator: &dyn TerrainGenerator) -> Self {
        Self::from_blocks(pos, generator.generate_chunk(pos))
    }

    pub fn from_blocks(pos: ChunkPos, data: ChunkData) -> Self {
        Self {
            pos,
            data,
            dirty: true,
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn blocks(&self) -> &ChunkData {
        &self.data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Air for any coordinate outside the chunk.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        LocalPos::checked(x, y, z).map_or(BlockId::AIR, |local| self.data.get(local))
    }

    /// Ignored for coordinates outside the chunk.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockId) {
        let Some(local) = LocalPos::checked(x, y, z) else {
            return;
        };
        self.data.set(local, block);
        self.dirty = true;
    }

    pub fn generate_mesh(&mut self) -> ChunkMesh {
        let mesh = build_chunk_mesh(&self.data, self.pos);
        self.dirty = false;
        mesh
    }
}
