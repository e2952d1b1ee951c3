use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use tessera_persist::save::{scan_worlds, WorldSave, WORLD_META_FILE};
use tessera_shared::block::BlockId;
use tessera_shared::coords::ChunkPos;

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: save_inspector <saves dir | world dir>");
        std::process::exit(2);
    };

    if let Err(err) = run(Path::new(&path)) {
        eprintln!("save_inspector error: {err}");
        std::process::exit(1);
    }
}

fn run(path: &Path) -> Result<(), String> {
    if path.join(WORLD_META_FILE).is_file() {
        inspect_world(path)
    } else {
        list_worlds(path)
    }
}

fn list_worlds(saves_root: &Path) -> Result<(), String> {
    let worlds = scan_worlds(saves_root)
        .map_err(|err| format!("failed to scan {}: {err}", saves_root.display()))?;

    println!("Saves: {}", saves_root.display());
    println!("World count: {}", worlds.len());
    for world in worlds {
        let last_played = world
            .last_played
            .map_or_else(|| "never".to_string(), |millis| millis.to_string());
        println!(
            "  {} ({}) chunks={} lastPlayed={}",
            world.display_name, world.folder_name, world.chunk_count, last_played
        );
    }
    Ok(())
}

fn inspect_world(world_dir: &Path) -> Result<(), String> {
    let (Some(saves_root), Some(name)) = (world_dir.parent(), world_dir.file_name()) else {
        return Err(format!("{} is not a world directory", world_dir.display()));
    };
    let save = WorldSave::open(saves_root, &name.to_string_lossy())
        .map_err(|err| format!("failed to open {}: {err}", world_dir.display()))?;

    let meta = save
        .load_meta()
        .map_err(|err| format!("failed to read metadata: {err}"))?;
    println!("World: {}", world_dir.display());
    if let Some(meta) = meta {
        println!("Name: {}", meta.name);
        println!("Format version: {}", meta.version);
        println!("Last played: {}", meta.last_played);
    }

    match save
        .load_player()
        .map_err(|err| format!("failed to read player: {err}"))?
    {
        Some(player) => {
            let pos = player.position;
            println!("Player position: ({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z);
            for (slot, stack) in player.inventory.slots.iter().enumerate() {
                if let Some(stack) = stack.filter(|stack| !stack.is_empty()) {
                    println!("  slot {slot:>2}: {} x{}", stack.block.name(), stack.count);
                }
            }
        }
        None => println!("Player: none"),
    }

    let chunks = save
        .load_chunks()
        .map_err(|err| format!("failed to read chunks: {err}"))?;
    println!("Chunk count: {}", chunks.len());
    for (pos, data) in &chunks {
        let histogram = block_histogram(data.blocks.iter().copied());
        println!("  chunk @ ({}, {}) {}", pos.x, pos.z, format_histogram(&histogram));
    }

    if let Some(bounds) = chunk_bounds(chunks.iter().map(|(pos, _)| *pos)) {
        println!(
            "Bounds: x {}..={}, z {}..={}",
            bounds.0.x, bounds.1.x, bounds.0.z, bounds.1.z
        );
    }
    Ok(())
}

fn block_histogram(blocks: impl Iterator<Item = BlockId>) -> BTreeMap<BlockId, usize> {
    let mut histogram = BTreeMap::new();
    for block in blocks {
        *histogram.entry(block).or_insert(0) += 1;
    }
    histogram
}

fn format_histogram(histogram: &BTreeMap<BlockId, usize>) -> String {
    let non_air: usize = histogram
        .iter()
        .filter(|(block, _)| **block != BlockId::AIR)
        .map(|(_, count)| count)
        .sum();
    let mut out = format!("non-air={non_air}");
    for (block, count) in histogram {
        if *block != BlockId::AIR {
            out.push_str(&format!(" {}={count}", block.name()));
        }
    }
    out
}

fn chunk_bounds(positions: impl Iterator<Item = ChunkPos>) -> Option<(ChunkPos, ChunkPos)> {
    positions.fold(None, |bounds, pos| match bounds {
        None => Some((pos, pos)),
        Some((min, max)) => Some((
            ChunkPos::new(min.x.min(pos.x), min.z.min(pos.z)),
            ChunkPos::new(max.x.max(pos.x), max.z.max(pos.z)),
        )),
    })
}

#[cfg(test)]
mod tests {
    use tessera_shared::block::BlockId;
    use tessera_shared::coords::ChunkPos;

    use super::{block_histogram, chunk_bounds, format_histogram};

    #[test]
    fn histogram_skips_air_in_summary() {
        let blocks = [BlockId::AIR, BlockId::STONE, BlockId::GRASS, BlockId::STONE];
        let histogram = block_histogram(blocks.into_iter());
        assert_eq!(histogram.get(&BlockId::AIR), Some(&1));
        assert_eq!(format_histogram(&histogram), "non-air=3 grass=1 stone=2");
    }

    #[test]
    fn bounds_cover_all_chunks() {
        let positions = [ChunkPos::new(2, -1), ChunkPos::new(-3, 4), ChunkPos::new(0, 0)];
        let (min, max) = chunk_bounds(positions.into_iter()).expect("bounds");
        assert_eq!(min, ChunkPos::new(-3, -1));
        assert_eq!(max, ChunkPos::new(2, 4));
        assert!(chunk_bounds(std::iter::empty()).is_none());
    }
}
