use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub const fn key(self) -> i64 {
        ((self.x as i64) << 32) | (self.z as u32 as i64)
    }

    pub const fn from_key(key: i64) -> Self {
        Self {
            x: (key >> 32) as i32,
            z: key as u32 as i32,
        }
    }

    /// Computed in `i64`; `x * 16` leaves the `i32` range for far chunks.
    pub fn origin(self) -> Vec3 {
        let size = i64::from(CHUNK_SIZE_I32);
        Vec3::new(
            (i64::from(self.x) * size) as f32,
            0.0,
            (i64::from(self.z) * size) as f32,
        )
    }
}

impl LocalPos {
    pub fn checked(x: i32, y: i32, z: i32) -> Option<Self> {
        let range = 0..CHUNK_SIZE_I32;
        if range.contains(&x) && range.contains(&y) && range.contains(&z) {
            Some(Self {
                x: x as u8,
                y: y as u8,
                z: z as u8,
            })
        } else {
            None
        }
    }
}

pub fn div_rem_floor(value: i32, divisor: i32) -> (i32, i32) {
    (value.div_euclid(divisor), value.rem_euclid(divisor))
}

/// Local Y outside the chunk layer yields `None`.
pub fn world_to_chunk(world_pos: IVec3) -> (ChunkPos, Option<LocalPos>) {
    let (chunk_x, local_x) = div_rem_floor(world_pos.x, CHUNK_SIZE_I32);
    let (chunk_z, local_z) = div_rem_floor(world_pos.z, CHUNK_SIZE_I32);

    (
        ChunkPos::new(chunk_x, chunk_z),
        LocalPos::checked(local_x, world_pos.y, local_z),
    )
}

pub fn local_to_index(local: LocalPos) -> usize {
    usize::from(local.x) * CHUNK_SIZE * CHUNK_SIZE
        + usize::from(local.y) * CHUNK_SIZE
        + usize::from(local.z)
}

pub fn index_to_local(index: usize) -> LocalPos {
    assert!(index < CHUNK_VOLUME, "chunk index out of bounds: {index}");

    let x = index / (CHUNK_SIZE * CHUNK_SIZE);
    let rem = index % (CHUNK_SIZE * CHUNK_SIZE);
    let y = rem / CHUNK_SIZE;
    let z = rem % CHUNK_SIZE;

    LocalPos {
        x: x as u8,
        y: y as u8,
        z: z as u8,
    }
}
