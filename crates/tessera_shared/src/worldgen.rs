use crate::block::BlockId;
use crate::chunk::ChunkData;
use crate::coords::{ChunkPos, LocalPos, CHUNK_SIZE};

pub trait TerrainGenerator {
    fn generate_chunk(&self, pos: ChunkPos) -> ChunkData;
}

#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain {
    pub height: u8,
    pub subsurface_depth: u8,
    pub surface: BlockId,
    pub subsurface: BlockId,
    pub bedrock: BlockId,
}

impl Default for FlatTerrain {
    fn default() -> Self {
        Self {
            height: 4,
            subsurface_depth: 4,
            surface: BlockId::GRASS,
            subsurface: BlockId::DIRT,
            bedrock: BlockId::STONE,
        }
    }
}

impl FlatTerrain {
    pub fn block_at_height(&self, y: u8) -> BlockId {
        let height = i32::from(self.height);
        let y = i32::from(y);
        if y > height {
            BlockId::AIR
        } else if y == height {
            self.surface
        } else if y > height - i32::from(self.subsurface_depth) {
            self.subsurface
        } else {
            self.bedrock
        }
    }
}

impl TerrainGenerator for FlatTerrain {
    fn generate_chunk(&self, _pos: ChunkPos) -> ChunkData {
        let mut chunk = ChunkData::new_empty();
        for y in 0..CHUNK_SIZE as u8 {
            let block = self.block_at_height(y);
            if block == BlockId::AIR {
                continue;
            }
            for x in 0..CHUNK_SIZE as u8 {
                for z in 0..CHUNK_SIZE as u8 {
                    chunk.set(LocalPos { x, y, z }, block);
                }
            }
        }
        chunk
    }
}
