use glam::{IVec3, Vec3};

use crate::block::BlockId;

pub const PLAYER_WIDTH: f32 = 0.6;
pub const PLAYER_HEIGHT: f32 = 1.8;
pub const PLAYER_HALF_W: f32 = PLAYER_WIDTH / 2.0;
pub const GRAVITY: f32 = -20.0;
pub const JUMP_VELOCITY: f32 = 8.0;
pub const GROUND_PROBE: f32 = 0.02;

pub const RAY_STEP: f32 = 0.05;
pub const RAY_MAX_DISTANCE: f32 = 5.0;

pub trait BlockSource {
    fn block_at(&self, world_pos: IVec3) -> BlockId;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn player_at(pos: Vec3) -> Self {
        Self {
            min: Vec3::new(pos.x - PLAYER_HALF_W, pos.y, pos.z - PLAYER_HALF_W),
            max: Vec3::new(pos.x + PLAYER_HALF_W, pos.y + PLAYER_HEIGHT, pos.z + PLAYER_HALF_W),
        }
    }

    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn covered_voxels(&self) -> impl Iterator<Item = IVec3> {
        let min = self.min.floor().as_ivec3();
        let max = self.max.floor().as_ivec3();
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| IVec3::new(x, y, z)))
        })
    }
}

pub fn collides_with_terrain(aabb: &AABB, blocks: &impl BlockSource) -> bool {
    aabb.covered_voxels()
        .any(|voxel| blocks.block_at(voxel).is_solid())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
}

impl PlayerBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            on_ground: false,
        }
    }

    pub fn aabb(&self) -> AABB {
        AABB::player_at(self.position)
    }

    pub fn jump(&mut self) -> bool {
        if !self.on_ground {
            return false;
        }
        self.velocity.y = JUMP_VELOCITY;
        self.on_ground = false;
        true
    }

    /// Integrates gravity and moves one axis at a time (X, Y, Z). A blocked axis
    /// keeps its old coordinate and loses its velocity.
    pub fn step(&mut self, dt: f32, blocks: &impl BlockSource) {
        if !self.on_ground {
            self.velocity.y += GRAVITY * dt;
        }

        // Resolve X axis
        let candidate = self.position + Vec3::new(self.velocity.x * dt, 0.0, 0.0);
        if collides_with_terrain(&AABB::player_at(candidate), blocks) {
            self.velocity.x = 0.0;
        } else {
            self.position = candidate;
        }

        // Resolve Y axis
        let dy = self.velocity.y * dt;
        let candidate = self.position + Vec3::new(0.0, dy, 0.0);
        if collides_with_terrain(&AABB::player_at(candidate), blocks) {
            if self.velocity.y < 0.0 {
                self.on_ground = true;
            }
            self.velocity.y = 0.0;
        } else {
            self.position = candidate;
            if dy != 0.0 {
                self.on_ground = false;
            }
        }

        // Resolve Z axis
        let candidate = self.position + Vec3::new(0.0, 0.0, self.velocity.z * dt);
        if collides_with_terrain(&AABB::player_at(candidate), blocks) {
            self.velocity.z = 0.0;
        } else {
            self.position = candidate;
        }

        if self.on_ground {
            let probe = AABB::player_at(self.position - Vec3::new(0.0, GROUND_PROBE, 0.0));
            if !collides_with_terrain(&probe, blocks) {
                self.on_ground = false;
            }
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    pub block_pos: IVec3,
    pub block: BlockId,
    pub before_hit: Vec3,
}

impl RayHit {
    pub fn place_pos(&self) -> IVec3 {
        self.before_hit.floor().as_ivec3()
    }
}

pub fn ray_samples(ray: &Ray, step: f32, max_distance: f32) -> impl Iterator<Item = Vec3> {
    let origin = ray.origin;
    let direction = ray.direction.normalize_or_zero();
    let usable = step > 0.0 && direction != Vec3::ZERO;
    (0..)
        .map(move |i| i as f32 * step)
        .take_while(move |distance| usable && *distance < max_distance)
        .map(move |distance| origin + direction * distance)
}

pub fn march_ray(
    ray: &Ray,
    step: f32,
    max_distance: f32,
    blocks: &impl BlockSource,
) -> Option<RayHit> {
    let delta = ray.direction.normalize_or_zero() * step;
    ray_samples(ray, step, max_distance).find_map(|point| {
        let block_pos = point.floor().as_ivec3();
        let block = blocks.block_at(block_pos);
        block.is_solid().then_some(RayHit {
            block_pos,
            block,
            before_hit: point - delta,
        })
    })
}
