use glam::Vec3;
use serde::{Deserialize, Serialize};
use tessera_shared::chunk::{Chunk, ChunkData};
use tessera_shared::coords::ChunkPos;
use tessera_shared::inventory::Inventory;
use tessera_shared::player::PlayerState;

use crate::versioning::CURRENT_FORMAT_VERSION;

/// Contents of `world.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldMetaRecord {
    pub name: String,
    #[serde(default = "default_format_version")]
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "lastPlayed", default)]
    pub last_played: u64,
}

fn default_format_version() -> u32 {
    CURRENT_FORMAT_VERSION
}

impl WorldMetaRecord {
    pub fn new(name: impl Into<String>, last_played: u64) -> Self {
        Self {
            name: name.into(),
            version: CURRENT_FORMAT_VERSION,
            last_played,
        }
    }
}

/// Contents of one `chunk_<x>_<z>.json`. `blocks` is nested `[x][y][z]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub x: i32,
    pub z: i32,
    pub blocks: ChunkData,
}

impl ChunkRecord {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        let pos = chunk.pos();
        Self {
            x: pos.x,
            z: pos.z,
            blocks: chunk.blocks().clone(),
        }
    }

    pub fn pos(&self) -> ChunkPos {
        ChunkPos::new(self.x, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for PositionRecord {
    fn from(value: Vec3) -> Self {
        Self {
            x: value.x,
            y: value.y,
            z: value.z,
        }
    }
}

impl From<PositionRecord> for Vec3 {
    fn from(value: PositionRecord) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

/// Contents of `player.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub position: PositionRecord,
    #[serde(default)]
    pub inventory: Inventory,
}

impl From<&PlayerState> for PlayerRecord {
    fn from(state: &PlayerState) -> Self {
        Self {
            position: state.position.into(),
            inventory: state.inventory.clone(),
        }
    }
}

impl From<PlayerRecord> for PlayerState {
    fn from(record: PlayerRecord) -> Self {
        Self {
            position: record.position.into(),
            inventory: record.inventory,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use tessera_shared::block::BlockId;
    use tessera_shared::chunk::ChunkData;
    use tessera_shared::coords::LocalPos;
    use tessera_shared::inventory::{Inventory, ItemStack};
    use tessera_shared::player::PlayerState;

    use super::{ChunkRecord, PlayerRecord, WorldMetaRecord};

    #[test]
    fn world_meta_uses_camel_case_last_played() {
        let json = serde_json::to_string(&WorldMetaRecord::new("world1", 1_700_000_000_000))
            .expect("serialize meta");
        assert_eq!(
            json,
            r#"{"name":"world1","version":1,"lastPlayed":1700000000000}"#
        );
    }

    #[test]
    fn player_json_shape_matches_save_layout() {
        let mut inventory = Inventory::new();
        inventory.set(1, Some(ItemStack::new(BlockId::STONE, 12)));
        let record = PlayerRecord::from(&PlayerState {
            position: Vec3::new(1.5, 5.0, -2.0),
            inventory,
        });

        let value = serde_json::to_value(&record).expect("serialize player");
        assert_eq!(value["position"]["x"], 1.5);
        assert_eq!(value["position"]["z"], -2.0);
        let slots = value["inventory"].as_array().expect("inventory array");
        assert_eq!(slots.len(), Inventory::TOTAL_SIZE);
        assert!(slots[0].is_null());
        assert_eq!(slots[1]["blockType"], 3);
        assert_eq!(slots[1]["amount"], 12);
    }

    #[test]
    fn short_inventory_arrays_are_padded() {
        let json = r#"{"position":{"x":0,"y":10,"z":0},"inventory":[null,{"blockType":2,"amount":5}]}"#;
        let record: PlayerRecord = serde_json::from_str(json).expect("parse player");
        let state = PlayerState::from(record);
        assert_eq!(state.position, Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(state.inventory.get(1), Some(&ItemStack::new(BlockId::DIRT, 5)));
        assert!(state.inventory.get(35).is_none());
    }

    #[test]
    fn oversized_inventory_arrays_are_rejected() {
        let slots = vec!["null"; Inventory::TOTAL_SIZE + 1].join(",");
        let json = format!(r#"{{"position":{{"x":0,"y":0,"z":0}},"inventory":[{slots}]}}"#);
        assert!(serde_json::from_str::<PlayerRecord>(&json).is_err());
    }

    #[test]
    fn overfull_stacks_are_rejected() {
        let json = r#"{"position":{"x":0,"y":0,"z":0},"inventory":[{"blockType":1,"amount":65}]}"#;
        let err = serde_json::from_str::<PlayerRecord>(json).expect_err("amount above 64");
        assert!(err.to_string().contains("65"));

        let json = r#"{"position":{"x":0,"y":0,"z":0},"inventory":[{"blockType":1,"amount":64}]}"#;
        let record: PlayerRecord = serde_json::from_str(json).expect("full stack parses");
        assert_eq!(record.inventory.get(0).map(|s| s.count), Some(64));
    }

    #[test]
    fn chunk_record_blocks_are_nested_x_y_z() {
        let mut blocks = ChunkData::new_empty();
        blocks.set(LocalPos { x: 15, y: 0, z: 1 }, BlockId::GRASS);
        let record = ChunkRecord {
            x: -1,
            z: 2,
            blocks,
        };

        let value = serde_json::to_value(&record).expect("serialize chunk");
        assert_eq!(value["x"], -1);
        assert_eq!(value["blocks"][15][0][1], 1);
        assert_eq!(value["blocks"][1][0][15], 0);
    }
}
