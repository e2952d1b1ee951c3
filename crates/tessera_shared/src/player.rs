use glam::Vec3;
use tracing::debug;

use crate::block::BlockId;
use crate::inventory::{Inventory, ItemStack, MAX_STACK_SIZE};
use crate::physics::{
    march_ray, BlockSource, PlayerBody, Ray, RayHit, PLAYER_HEIGHT, RAY_MAX_DISTANCE, RAY_STEP,
};
use crate::world::{ChunkRenderer, World};

pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 10.0, 0.0);
pub const EYE_HEIGHT: f32 = PLAYER_HEIGHT * 0.8;
pub const DEFAULT_MOVE_SPEED: f32 = 5.0;
pub const MAX_PITCH: f32 = 90.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    pub inventory: Inventory,
}

impl Default for PlayerState {
    fn default() -> Self {
        let mut inventory = Inventory::new();
        for block in [BlockId::GRASS, BlockId::DIRT, BlockId::STONE] {
            inventory.add_item(block, MAX_STACK_SIZE);
        }
        Self {
            position: SPAWN_POSITION,
            inventory,
        }
    }
}

/// Yaw and pitch are in degrees. Positive pitch looks down.
#[derive(Debug, Clone)]
pub struct Player {
    pub body: PlayerBody,
    pub yaw: f32,
    pub pitch: f32,
    pub inventory: Inventory,
    pub move_speed: f32,
    selected_slot: usize,
}

impl Default for Player {
    fn default() -> Self {
        Self::from_state(PlayerState::default())
    }
}

impl Player {
    pub fn from_state(state: PlayerState) -> Self {
        Self {
            body: PlayerBody::new(state.position),
            yaw: 0.0,
            pitch: 0.0,
            inventory: state.inventory,
            move_speed: DEFAULT_MOVE_SPEED,
            selected_slot: 0,
        }
    }

    pub fn state(&self) -> PlayerState {
        PlayerState {
            position: self.body.position,
            inventory: self.inventory.clone(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn eye_position(&self) -> Vec3 {
        self.body.position + Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }

    pub fn rotate(&mut self, delta_pitch: f32, delta_yaw: f32) {
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw = (self.yaw + delta_yaw).rem_euclid(360.0);
    }

    pub fn look_direction(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.sin() * pitch.cos(), -pitch.sin(), yaw.cos() * pitch.cos())
    }

    pub fn set_movement(&mut self, forward: f32, strafe: f32) {
        let yaw = self.yaw.to_radians();
        let (dx, dz) = (strafe * self.move_speed, forward * self.move_speed);
        self.body.velocity.x = dx * yaw.cos() - dz * yaw.sin();
        self.body.velocity.z = dx * yaw.sin() + dz * yaw.cos();
    }

    pub fn jump(&mut self) -> bool {
        self.body.jump()
    }

    pub fn update(&mut self, dt: f32, blocks: &impl BlockSource) {
        self.body.step(dt, blocks);
    }

    pub fn selected_slot(&self) -> usize {
        self.selected_slot
    }

    /// Slots outside the hotbar are ignored.
    pub fn select_slot(&mut self, slot: usize) {
        if slot < Inventory::HOTBAR_SIZE {
            self.selected_slot = slot;
        }
    }

    /// Positive deltas move to the previous slot, negative to the next, both
    /// wrapping around the hotbar.
    pub fn scroll_slot(&mut self, delta: f32) {
        let size = Inventory::HOTBAR_SIZE;
        if delta > 0.0 {
            self.selected_slot = (self.selected_slot + size - 1) % size;
        } else if delta < 0.0 {
            self.selected_slot = (self.selected_slot + 1) % size;
        }
    }

    pub fn selected_stack(&self) -> Option<&ItemStack> {
        self.inventory.hotbar_slot(self.selected_slot)
    }

    pub fn target(&self, blocks: &impl BlockSource) -> Option<RayHit> {
        let ray = Ray {
            origin: self.eye_position(),
            direction: self.look_direction(),
        };
        march_ray(&ray, RAY_STEP, RAY_MAX_DISTANCE, blocks)
    }

    pub fn break_block<R: ChunkRenderer>(&mut self, world: &mut World<R>) -> bool {
        let Some(hit) = self.target(&*world) else {
            return false;
        };
        if !world.set_block(hit.block_pos, BlockId::AIR) {
            return false;
        }
        if self.inventory.add_item(hit.block, 1) > 0 {
            debug!("Inventory full, dropped {} at {}", hit.block.name(), hit.block_pos);
        }
        true
    }

    pub fn place_block<R: ChunkRenderer>(&mut self, world: &mut World<R>) -> bool {
        let Some(stack) = self.selected_stack().copied() else {
            return false;
        };
        let Some(hit) = self.target(&*world) else {
            return false;
        };
        if !world.set_block(hit.place_pos(), stack.block) {
            return false;
        }
        self.inventory.remove_item(self.selected_slot, 1);
        true
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use super::{Player, PlayerState, SPAWN_POSITION};
    use crate::block::BlockId;
    use crate::coords::ChunkPos;
    use crate::inventory::{Inventory, ItemStack};
    use crate::world::{MeshCache, World, SPAWN_AREA_RADIUS};

    fn spawn_world() -> World<MeshCache> {
        World::with_spawn_area(MeshCache::default(), SPAWN_AREA_RADIUS)
    }

    fn player_looking_down() -> Player {
        let mut player = Player::default();
        player.body.position = Vec3::new(0.5, 5.0, 0.5);
        player.body.on_ground = true;
        player.rotate(90.0, 0.0);
        player
    }

    #[test]
    fn new_player_spawns_with_three_full_stacks() {
        let state = PlayerState::default();
        assert_eq!(state.position, SPAWN_POSITION);
        assert_eq!(state.inventory.get(0), Some(&ItemStack::new(BlockId::GRASS, 64)));
        assert_eq!(state.inventory.get(1), Some(&ItemStack::new(BlockId::DIRT, 64)));
        assert_eq!(state.inventory.get(2), Some(&ItemStack::new(BlockId::STONE, 64)));
        assert!(state.inventory.get(3).is_none());
    }

    #[test]
    fn pitch_is_clamped_and_yaw_wraps() {
        let mut player = Player::default();
        player.rotate(120.0, -30.0);
        assert_eq!(player.pitch, 90.0);
        assert_eq!(player.yaw, 330.0);

        player.rotate(-250.0, 40.0);
        assert_eq!(player.pitch, -90.0);
        assert_eq!(player.yaw, 10.0);
    }

    #[test]
    fn look_direction_follows_yaw_and_pitch() {
        let mut player = Player::default();
        assert!(player.look_direction().abs_diff_eq(Vec3::Z, 1e-6));

        player.rotate(0.0, 90.0);
        assert!(player.look_direction().abs_diff_eq(Vec3::X, 1e-6));

        player.rotate(90.0, 0.0);
        assert!(player.look_direction().abs_diff_eq(Vec3::NEG_Y, 1e-6));
    }

    #[test]
    fn movement_is_rotated_by_yaw() {
        let mut player = Player::default();
        player.set_movement(1.0, 0.0);
        assert!(player.body.velocity.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));

        player.rotate(0.0, 90.0);
        player.set_movement(0.0, 1.0);
        assert!(player.body.velocity.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
    }

    #[test]
    fn hotbar_selection_and_scroll_wrap() {
        let mut player = Player::default();
        player.select_slot(9);
        assert_eq!(player.selected_slot(), 0);

        player.scroll_slot(1.0);
        assert_eq!(player.selected_slot(), 8);
        player.scroll_slot(-1.0);
        assert_eq!(player.selected_slot(), 0);
        player.scroll_slot(0.0);
        assert_eq!(player.selected_slot(), 0);

        player.select_slot(4);
        assert_eq!(player.selected_slot(), 4);
    }

    #[test]
    fn break_removes_target_and_adds_one_item() {
        let mut world = spawn_world();
        let mut player = player_looking_down();
        let grass_before = player.inventory.count_item(BlockId::GRASS);

        assert!(player.break_block(&mut world));
        assert_eq!(world.get_block(IVec3::new(0, 4, 0)), BlockId::AIR);
        assert_eq!(player.inventory.count_item(BlockId::GRASS), grass_before + 1);
    }

    #[test]
    fn place_puts_selected_block_in_front_of_target() {
        let mut world = spawn_world();
        let mut player = player_looking_down();
        player.select_slot(2);

        assert!(player.place_block(&mut world));
        assert_eq!(world.get_block(IVec3::new(0, 5, 0)), BlockId::STONE);
        assert_eq!(player.inventory.count_item(BlockId::STONE), 63);
    }

    #[test]
    fn place_with_empty_selection_leaves_world_unchanged() {
        let mut world = spawn_world();
        let mut player = player_looking_down();
        player.select_slot(5);
        let before = world.chunk(ChunkPos::new(0, 0)).map(|c| c.blocks().clone());

        assert!(!player.place_block(&mut world));
        let after = world.chunk(ChunkPos::new(0, 0)).map(|c| c.blocks().clone());
        assert_eq!(before, after);
    }

    #[test]
    fn nothing_in_range_is_a_no_op() {
        let mut world = spawn_world();
        let mut player = player_looking_down();
        player.rotate(-180.0, 0.0);

        assert!(!player.break_block(&mut world));
        assert!(!player.place_block(&mut world));
        assert_eq!(player.inventory.count_item(BlockId::GRASS), 64);
    }

    #[test]
    fn player_falls_onto_terrain() {
        let world = spawn_world();
        let mut player = Player::default();
        player.body.position = Vec3::new(0.5, 10.0, 0.5);

        for _ in 0..300 {
            player.update(1.0 / 60.0, &world);
        }
        assert!(player.body.on_ground);
        assert!(player.position().y >= 5.0 && player.position().y < 5.05);
    }

    #[test]
    fn state_round_trips_through_player() {
        let mut inventory = Inventory::new();
        inventory.set(3, Some(ItemStack::new(BlockId::DIRT, 7)));
        let state = PlayerState {
            position: Vec3::new(1.0, 6.0, -2.0),
            inventory,
        };
        assert_eq!(Player::from_state(state.clone()).state(), state);
    }
}
