use glam::IVec3;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::block::BlockId;
use crate::chunk::{Chunk, ChunkData};
use crate::coords::{world_to_chunk, ChunkPos};
use crate::mesh::ChunkMesh;
use crate::physics::BlockSource;
use crate::worldgen::{FlatTerrain, TerrainGenerator};

pub const SPAWN_AREA_RADIUS: i32 = 1;

pub trait ChunkRenderer {
    type Resource;

    fn upload(&mut self, pos: ChunkPos, mesh: &ChunkMesh) -> Self::Resource;
    fn release(&mut self, resource: Self::Resource);
    fn draw(&mut self, resource: &Self::Resource);
}

#[derive(Debug, Clone)]
pub struct CachedMesh {
    pub pos: ChunkPos,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl CachedMesh {
    pub fn face_count(&self) -> usize {
        self.indices.len() / crate::mesh::INDICES_PER_FACE
    }
}

#[derive(Debug, Default)]
pub struct MeshCache {
    pub uploads: u64,
    pub releases: u64,
    pub draws: u64,
    pub faces_drawn: u64,
}

impl MeshCache {
    pub fn live_resources(&self) -> u64 {
        self.uploads - self.releases
    }
}

impl ChunkRenderer for MeshCache {
    type Resource = CachedMesh;

    fn upload(&mut self, pos: ChunkPos, mesh: &ChunkMesh) -> CachedMesh {
        self.uploads += 1;
        CachedMesh {
            pos,
            vertices: mesh.as_floats().to_vec(),
            indices: mesh.quad_indices(),
        }
    }

    fn release(&mut self, _resource: CachedMesh) {
        self.releases += 1;
    }

    fn draw(&mut self, resource: &CachedMesh) {
        self.draws += 1;
        self.faces_drawn += resource.face_count() as u64;
    }
}

pub struct ChunkEntry<T> {
    pub chunk: Chunk,
    render: Option<T>,
}

impl<T> ChunkEntry<T> {
    pub fn render_resource(&self) -> Option<&T> {
        self.render.as_ref()
    }
}

pub struct World<R: ChunkRenderer> {
    entries: FxHashMap<i64, ChunkEntry<R::Resource>>,
    renderer: R,
    generator: Box<dyn TerrainGenerator>,
}

impl<R: ChunkRenderer> World<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_generator(renderer, Box::new(FlatTerrain::default()))
    }

    pub fn with_generator(renderer: R, generator: Box<dyn TerrainGenerator>) -> Self {
        Self {
            entries: FxHashMap::default(),
            renderer,
            generator,
        }
    }

    pub fn with_spawn_area(renderer: R, radius: i32) -> Self {
        let mut world = Self::new(renderer);
        for x in -radius..=radius {
            for z in -radius..=radius {
                world.generate_chunk(ChunkPos::new(x, z));
            }
        }
        debug!("Generated {} spawn chunks", world.entries.len());
        world
    }

    pub fn generate_chunk(&mut self, pos: ChunkPos) {
        let chunk = Chunk::generate(pos, self.generator.as_ref());
        self.insert_chunk(chunk);
    }

    pub fn load_chunk(&mut self, pos: ChunkPos, data: ChunkData) {
        self.insert_chunk(Chunk::from_blocks(pos, data));
    }

    fn insert_chunk(&mut self, mut chunk: Chunk) {
        let key = chunk.pos().key();
        let resource = self.renderer.upload(chunk.pos(), &chunk.generate_mesh());
        let previous = self.entries.insert(
            key,
            ChunkEntry {
                chunk,
                render: Some(resource),
            },
        );
        if let Some(old) = previous.and_then(|entry| entry.render) {
            self.renderer.release(old);
        }
    }

    pub fn contains_chunk(&self, pos: ChunkPos) -> bool {
        self.entries.contains_key(&pos.key())
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.entries.get(&pos.key()).map(|entry| &entry.chunk)
    }

    /// Direct access for bulk edits. Changes stay unrendered until
    /// [`World::rebuild_dirty`].
    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.entries.get_mut(&pos.key()).map(|entry| &mut entry.chunk)
    }

    pub fn chunk_count(&self) -> usize {
        self.entries.len()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        let mut keys: Vec<i64> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter()
            .filter_map(move |key| self.entries.get(&key).map(|entry| &entry.chunk))
    }

    pub fn render_resource(&self, pos: ChunkPos) -> Option<&R::Resource> {
        self.entries
            .get(&pos.key())
            .and_then(ChunkEntry::render_resource)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn get_block(&self, world_pos: IVec3) -> BlockId {
        let (chunk_pos, local) = world_to_chunk(world_pos);
        let Some(entry) = self.entries.get(&chunk_pos.key()) else {
            return BlockId::AIR;
        };
        local.map_or(BlockId::AIR, |local| entry.chunk.blocks().get(local))
    }

    /// Writes a block and rebuilds the owning chunk's render resource before
    /// returning. Returns `false` when no loaded chunk holds `world_pos`.
    pub fn set_block(&mut self, world_pos: IVec3, block: BlockId) -> bool {
        let (chunk_pos, local) = world_to_chunk(world_pos);
        let Some(local) = local else {
            return false;
        };
        let Some(entry) = self.entries.get_mut(&chunk_pos.key()) else {
            return false;
        };

        entry.chunk.set_block(
            i32::from(local.x),
            i32::from(local.y),
            i32::from(local.z),
            block,
        );
        Self::rebuild_entry(&mut self.renderer, entry);
        true
    }

    pub fn dirty_chunks(&self) -> Vec<ChunkPos> {
        let mut dirty: Vec<ChunkPos> = self
            .entries
            .values()
            .filter(|entry| entry.chunk.is_dirty())
            .map(|entry| entry.chunk.pos())
            .collect();
        dirty.sort_unstable_by_key(|pos| pos.key());
        dirty
    }

    pub fn rebuild_dirty(&mut self) -> usize {
        let mut rebuilt = 0;
        for entry in self.entries.values_mut() {
            if entry.chunk.is_dirty() {
                Self::rebuild_entry(&mut self.renderer, entry);
                rebuilt += 1;
            }
        }
        if rebuilt > 0 {
            debug!("Rebuilt {} dirty chunk meshes", rebuilt);
        }
        rebuilt
    }

    fn rebuild_entry(renderer: &mut R, entry: &mut ChunkEntry<R::Resource>) {
        if let Some(old) = entry.render.take() {
            renderer.release(old);
        }
        let mesh = entry.chunk.generate_mesh();
        entry.render = Some(renderer.upload(entry.chunk.pos(), &mesh));
    }

    pub fn render(&mut self) {
        for entry in self.entries.values() {
            if let Some(resource) = entry.render.as_ref() {
                self.renderer.draw(resource);
            }
        }
    }

    /// Releases every render resource. Chunks stay loaded, so a later block
    /// write rebuilds the affected resource.
    pub fn cleanup(&mut self) {
        for entry in self.entries.values_mut() {
            if let Some(resource) = entry.render.take() {
                self.renderer.release(resource);
            }
        }
    }
}

impl<R: ChunkRenderer> BlockSource for World<R> {
    fn block_at(&self, world_pos: IVec3) -> BlockId {
        self.get_block(world_pos)
    }
}
