use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use tessera_shared::chunk::{Chunk, ChunkData};
use tessera_shared::coords::ChunkPos;
use tessera_shared::player::PlayerState;
use tessera_shared::world::{ChunkRenderer, World};

use crate::records::{ChunkRecord, PlayerRecord, WorldMetaRecord};
use crate::versioning::check_format_version;

pub const WORLD_META_FILE: &str = "world.json";
pub const PLAYER_FILE: &str = "player.json";
const CHUNK_FILE_PREFIX: &str = "chunk_";
const CHUNK_FILE_SUFFIX: &str = ".json";

pub fn chunk_file_name(pos: ChunkPos) -> String {
    format!("{CHUNK_FILE_PREFIX}{}_{}{CHUNK_FILE_SUFFIX}", pos.x, pos.z)
}

/// Inverse of [`chunk_file_name`]; `None` for any other file name.
pub fn parse_chunk_file_name(name: &str) -> Option<ChunkPos> {
    let coords = name
        .strip_prefix(CHUNK_FILE_PREFIX)?
        .strip_suffix(CHUNK_FILE_SUFFIX)?;
    let (x, z) = coords.split_once('_')?;
    Some(ChunkPos::new(x.parse().ok()?, z.parse().ok()?))
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// One world's save directory, `<saves_root>/<name>/`.
#[derive(Debug, Clone)]
pub struct WorldSave {
    name: String,
    world_dir: PathBuf,
}

impl WorldSave {
    /// Opens or creates the save directory for `name`.
    pub fn open(saves_root: &Path, name: &str) -> io::Result<Self> {
        let world_dir = saves_root.join(name);
        fs::create_dir_all(&world_dir)?;

        Ok(Self {
            name: name.to_string(),
            world_dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world_dir(&self) -> &Path {
        &self.world_dir
    }

    /// True once the world has been saved at least once.
    pub fn exists(&self) -> bool {
        self.world_dir.join(WORLD_META_FILE).is_file()
    }

    /// Writes the player, every loaded chunk and then the metadata. Each file
    /// is replaced atomically; an error stops the save at the failing file.
    pub fn save_world<R: ChunkRenderer>(
        &self,
        world: &World<R>,
        player: &PlayerState,
    ) -> io::Result<()> {
        self.save_player(player)?;
        let mut chunk_count = 0;
        for chunk in world.chunks() {
            self.save_chunk(chunk)?;
            chunk_count += 1;
        }
        self.save_meta()?;

        info!(
            "Saved world '{}' ({} chunks) to {}",
            self.name,
            chunk_count,
            self.world_dir.display()
        );
        Ok(())
    }

    pub fn save_player(&self, player: &PlayerState) -> io::Result<()> {
        write_json_atomic(&self.world_dir.join(PLAYER_FILE), &PlayerRecord::from(player))
    }

    pub fn save_chunk(&self, chunk: &Chunk) -> io::Result<()> {
        let path = self.world_dir.join(chunk_file_name(chunk.pos()));
        write_json_atomic(&path, &ChunkRecord::from_chunk(chunk))
    }

    pub fn save_meta(&self) -> io::Result<()> {
        let meta = WorldMetaRecord::new(self.name.clone(), now_millis());
        write_json_atomic(&self.world_dir.join(WORLD_META_FILE), &meta)
    }

    /// Fails with `InvalidData` for saves written by a newer format.
    pub fn load_meta(&self) -> io::Result<Option<WorldMetaRecord>> {
        let Some(meta) =
            read_json::<WorldMetaRecord>(&self.world_dir.join(WORLD_META_FILE), "world metadata")?
        else {
            return Ok(None);
        };

        check_format_version(meta.version)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(meta))
    }

    pub fn load_player(&self) -> io::Result<Option<PlayerState>> {
        let record = read_json::<PlayerRecord>(&self.world_dir.join(PLAYER_FILE), "player data")?;
        Ok(record.map(PlayerState::from))
    }

    pub fn load_chunk(&self, pos: ChunkPos) -> io::Result<Option<ChunkData>> {
        let path = self.world_dir.join(chunk_file_name(pos));
        let record = read_json::<ChunkRecord>(&path, "chunk data")?;
        Ok(record.map(|record| record.blocks))
    }

    /// Every stored chunk, in ascending key order. The position comes from the
    /// record itself, not the file name.
    pub fn load_chunks(&self) -> io::Result<Vec<(ChunkPos, ChunkData)>> {
        let mut chunks = Vec::new();
        for entry in fs::read_dir(&self.world_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            let Some(file_pos) = parse_chunk_file_name(&file_name) else {
                continue;
            };

            let Some(record) = read_json::<ChunkRecord>(&entry.path(), "chunk data")? else {
                continue;
            };
            if record.pos() != file_pos {
                warn!(
                    "Chunk file {} holds chunk ({}, {})",
                    file_name, record.x, record.z
                );
            }
            chunks.push((record.pos(), record.blocks));
        }

        chunks.sort_unstable_by_key(|(pos, _)| pos.key());
        Ok(chunks)
    }

    /// Replaces chunks in `world` with stored ones and returns the stored
    /// player, if any. Nothing in `world` changes when any file is malformed.
    pub fn load_world<R: ChunkRenderer>(
        &self,
        world: &mut World<R>,
    ) -> io::Result<Option<PlayerState>> {
        let meta = self.load_meta()?;
        let chunks = self.load_chunks()?;
        let player = self.load_player()?;

        let chunk_count = chunks.len();
        for (pos, blocks) in chunks {
            world.load_chunk(pos, blocks);
        }

        match meta {
            Some(meta) => info!(
                "Loaded world '{}' ({} chunks, format v{})",
                meta.name, chunk_count, meta.version
            ),
            None => debug!("Loaded {} chunks without world metadata", chunk_count),
        }
        Ok(player)
    }
}

#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub folder_name: String,
    pub display_name: String,
    pub world_dir: PathBuf,
    pub chunk_count: usize,
    pub last_played: Option<u64>,
}

/// Lists saved worlds under `saves_root`, most recently played first.
pub fn scan_worlds(saves_root: &Path) -> io::Result<Vec<WorldSummary>> {
    fs::create_dir_all(saves_root)?;

    let mut worlds = Vec::new();
    for entry in fs::read_dir(saves_root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let world_dir = entry.path();
        let folder_name = entry.file_name().to_string_lossy().to_string();
        let meta_path = world_dir.join(WORLD_META_FILE);
        let meta = match read_json::<WorldMetaRecord>(&meta_path, "world metadata") {
            Ok(meta) => meta,
            Err(err) => {
                warn!("Skipping metadata of {}: {}", world_dir.display(), err);
                None
            }
        };
        let display_name = meta
            .as_ref()
            .map(|meta| meta.name.clone())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| folder_name.clone());
        let chunk_count = count_chunk_files(&world_dir).unwrap_or(0);

        worlds.push(WorldSummary {
            folder_name,
            display_name,
            world_dir,
            chunk_count,
            last_played: meta.map(|meta| meta.last_played),
        });
    }

    worlds.sort_by(|a, b| {
        b.last_played
            .unwrap_or(0)
            .cmp(&a.last_played.unwrap_or(0))
            .then_with(|| a.folder_name.cmp(&b.folder_name))
    });

    Ok(worlds)
}

fn count_chunk_files(world_dir: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(world_dir)? {
        let name = entry?.file_name();
        if parse_chunk_file_name(&name.to_string_lossy()).is_some() {
            count += 1;
        }
    }
    Ok(count)
}

/// Writes to `<path>.tmp` and renames it over `path`.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize {}: {e}", path.display()),
            )
        })?;
        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)
}

/// `Ok(None)` when the file is missing, `InvalidData` when it does not parse.
fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> io::Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };

    serde_json::from_str(&contents).map(Some).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed to deserialize {what} from {}: {e}", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use glam::{IVec3, Vec3};
    use tessera_shared::block::BlockId;
    use tessera_shared::chunk::{Chunk, ChunkData};
    use tessera_shared::coords::ChunkPos;
    use tessera_shared::inventory::ItemStack;
    use tessera_shared::player::PlayerState;
    use tessera_shared::world::{MeshCache, World, SPAWN_AREA_RADIUS};

    use super::{
        chunk_file_name, parse_chunk_file_name, scan_worlds, WorldSave, PLAYER_FILE,
        WORLD_META_FILE,
    };

    static TEST_SERIAL: AtomicUsize = AtomicUsize::new(0);

    fn test_root(name: &str) -> PathBuf {
        let serial = TEST_SERIAL.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!(
            "tessera-save-{name}-{}-{}",
            std::process::id(),
            serial
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("create test save root");
        path
    }

    fn spawn_world() -> World<MeshCache> {
        World::with_spawn_area(MeshCache::default(), SPAWN_AREA_RADIUS)
    }

    #[test]
    fn chunk_file_names_round_trip() {
        assert_eq!(chunk_file_name(ChunkPos::new(-1, 2)), "chunk_-1_2.json");
        assert_eq!(
            parse_chunk_file_name("chunk_-1_2.json"),
            Some(ChunkPos::new(-1, 2))
        );
        assert_eq!(parse_chunk_file_name("chunk_-1_2.json.tmp"), None);
        assert_eq!(parse_chunk_file_name("player.json"), None);
        assert_eq!(parse_chunk_file_name("chunk_a_b.json"), None);
    }

    #[test]
    fn save_and_load_round_trip() {
        let root = test_root("round-trip");
        let save = WorldSave::open(&root, "world1").expect("open save");

        let mut world = spawn_world();
        assert!(world.set_block(IVec3::new(-3, 7, 12), BlockId::STONE));
        assert!(world.set_block(IVec3::new(0, 4, 0), BlockId::AIR));
        let mut player = PlayerState::default();
        player.position = Vec3::new(2.25, 5.0, -7.5);
        player.inventory.remove_item(1, 10);

        save.save_world(&world, &player).expect("save world");
        assert!(save.exists());
        assert!(save.world_dir().join(chunk_file_name(ChunkPos::new(-1, 0))).is_file());
        assert!(save.world_dir().join(PLAYER_FILE).is_file());

        let mut restored = World::new(MeshCache::default());
        let loaded = save
            .load_world(&mut restored)
            .expect("load world")
            .expect("player present");

        assert_eq!(loaded, player);
        assert_eq!(restored.chunk_count(), 9);
        for chunk in world.chunks() {
            let other = restored.chunk(chunk.pos()).expect("restored chunk");
            assert_eq!(other.blocks(), chunk.blocks());
        }
        assert_eq!(restored.get_block(IVec3::new(-3, 7, 12)), BlockId::STONE);
        assert_eq!(restored.get_block(IVec3::new(0, 4, 0)), BlockId::AIR);
        assert_eq!(restored.renderer().live_resources(), 9);

        let meta = save.load_meta().expect("load meta").expect("meta present");
        assert_eq!(meta.name, "world1");
        assert_eq!(meta.version, 1);
        assert!(meta.last_played > 0);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn loaded_chunks_replace_generated_terrain() {
        let root = test_root("replace");
        let save = WorldSave::open(&root, "w").expect("open save");
        let mut world = spawn_world();
        assert!(world.set_block(IVec3::new(1, 4, 1), BlockId::DIRT));
        save.save_world(&world, &PlayerState::default())
            .expect("save world");

        let mut fresh = spawn_world();
        assert_eq!(fresh.get_block(IVec3::new(1, 4, 1)), BlockId::GRASS);
        save.load_world(&mut fresh).expect("load world");
        assert_eq!(fresh.get_block(IVec3::new(1, 4, 1)), BlockId::DIRT);
        assert_eq!(fresh.chunk_count(), 9);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_files_load_as_none() {
        let root = test_root("missing");
        let save = WorldSave::open(&root, "empty").expect("open save");
        assert!(!save.exists());
        assert!(save.load_meta().expect("meta").is_none());
        assert!(save.load_player().expect("player").is_none());
        assert!(save.load_chunk(ChunkPos::new(0, 0)).expect("chunk").is_none());

        let mut world = World::new(MeshCache::default());
        assert!(save.load_world(&mut world).expect("load").is_none());
        assert_eq!(world.chunk_count(), 0);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn malformed_files_are_invalid_data() {
        let root = test_root("malformed");
        let save = WorldSave::open(&root, "broken").expect("open save");
        fs::write(save.world_dir().join(PLAYER_FILE), "{ not json").expect("write player");
        let err = save.load_player().expect_err("malformed player must fail");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        fs::write(
            save.world_dir().join(chunk_file_name(ChunkPos::new(0, 0))),
            r#"{"x":0,"z":0,"blocks":[[[0]]]}"#,
        )
        .expect("write chunk");
        let err = save.load_chunks().expect_err("short blocks must fail");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let mut world = spawn_world();
        let before = world.chunk(ChunkPos::new(0, 0)).map(|c| c.blocks().clone());
        assert!(save.load_world(&mut world).is_err());
        let after = world.chunk(ChunkPos::new(0, 0)).map(|c| c.blocks().clone());
        assert_eq!(before, after);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn far_chunks_load_without_overflow() {
        let root = test_root("far");
        let save = WorldSave::open(&root, "far").expect("open save");
        let pos = ChunkPos::new(200_000_000, i32::MIN);
        let chunk = Chunk::from_blocks(pos, ChunkData::new_filled(BlockId::STONE));
        save.save_chunk(&chunk).expect("save far chunk");

        let mut world = World::new(MeshCache::default());
        save.load_world(&mut world).expect("load far chunk");
        assert_eq!(world.chunk_count(), 1);
        let mesh = world.render_resource(pos).expect("render resource");
        assert_eq!(mesh.face_count(), 6 * 16 * 16);
        assert!(mesh.vertices[0] > 3.19e9);
        assert!(mesh.vertices[2] < -3.4e10);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn newer_format_version_is_rejected() {
        let root = test_root("newer");
        let save = WorldSave::open(&root, "future").expect("open save");
        fs::write(
            save.world_dir().join(WORLD_META_FILE),
            r#"{"name":"future","version":7,"lastPlayed":5}"#,
        )
        .expect("write meta");

        let err = save.load_meta().expect_err("newer version must fail");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("version 7"), "{err}");

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn saving_replaces_files_without_leaving_temporaries() {
        let root = test_root("atomic");
        let save = WorldSave::open(&root, "w").expect("open save");
        let mut player = PlayerState::default();
        save.save_player(&player).expect("first save");
        player.inventory.set(5, Some(ItemStack::new(BlockId::DIRT, 9)));
        save.save_player(&player).expect("second save");

        assert_eq!(save.load_player().expect("load"), Some(player));
        let leftovers: Vec<String> = fs::read_dir(save.world_dir())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn scan_worlds_lists_newest_first() {
        let root = test_root("scan");
        for (name, last_played) in [("old", 100u64), ("new", 300), ("mid", 200)] {
            let save = WorldSave::open(&root, name).expect("open save");
            fs::write(
                save.world_dir().join(WORLD_META_FILE),
                format!(r#"{{"name":"{name} world","version":1,"lastPlayed":{last_played}}}"#),
            )
            .expect("write meta");
        }
        let save = WorldSave::open(&root, "mid").expect("open save");
        save.save_chunk(spawn_world().chunk(ChunkPos::new(0, 0)).expect("chunk"))
            .expect("save chunk");
        fs::create_dir_all(root.join("bare")).expect("bare dir");

        let worlds = scan_worlds(&root).expect("scan");
        let names: Vec<&str> = worlds.iter().map(|w| w.folder_name.as_str()).collect();
        assert_eq!(names, vec!["new", "mid", "old", "bare"]);
        assert_eq!(worlds[1].display_name, "mid world");
        assert_eq!(worlds[1].chunk_count, 1);
        assert_eq!(worlds[3].display_name, "bare");
        assert_eq!(worlds[3].last_played, None);

        let _ = fs::remove_dir_all(&root);
    }
}
