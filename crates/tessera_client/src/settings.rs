use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "tessera.toml";

const MIN_MOVE_SPEED: f32 = 0.5;
const MAX_MOVE_SPEED: f32 = 50.0;
const MIN_TICK_RATE: u32 = 10;
const MAX_TICK_RATE: u32 = 240;
const MIN_AUTOSAVE_INTERVAL_SECS: u64 = 10;
const MAX_AUTOSAVE_INTERVAL_SECS: u64 = 3600;
const MAX_SPAWN_RADIUS: i32 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: i32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            tick_rate: default_tick_rate(),
            autosave_interval_secs: default_autosave_interval_secs(),
            spawn_radius: default_spawn_radius(),
        }
    }
}

impl ClientSettings {
    pub fn sanitize(mut self) -> Self {
        self.move_speed = if self.move_speed.is_finite() {
            self.move_speed.clamp(MIN_MOVE_SPEED, MAX_MOVE_SPEED)
        } else {
            default_move_speed()
        };
        self.tick_rate = self.tick_rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE);
        self.autosave_interval_secs = self
            .autosave_interval_secs
            .clamp(MIN_AUTOSAVE_INTERVAL_SECS, MAX_AUTOSAVE_INTERVAL_SECS);
        self.spawn_radius = self.spawn_radius.clamp(0, MAX_SPAWN_RADIUS);
        self
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let parsed = toml::from_str::<Self>(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize settings: {e}"),
            )
        })?;
        Ok(parsed.sanitize())
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let settings = self.clone().sanitize();
        let serialized = toml::to_string_pretty(&settings).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize settings: {e}"),
            )
        })?;
        fs::write(path, serialized)
    }
}

fn default_move_speed() -> f32 {
    tessera_shared::player::DEFAULT_MOVE_SPEED
}

fn default_tick_rate() -> u32 {
    60
}

fn default_autosave_interval_secs() -> u64 {
    300
}

fn default_spawn_radius() -> i32 {
    tessera_shared::world::SPAWN_AREA_RADIUS
}

/// Reads `path`, writing defaults there when it is missing or unreadable.
pub fn load_or_create_settings(path: &Path) -> ClientSettings {
    match ClientSettings::load(path) {
        Ok(settings) => settings,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let settings = ClientSettings::default();
            if let Err(save_err) = settings.save(path) {
                warn!(
                    "Failed to create default settings at {}: {save_err}",
                    path.display()
                );
            }
            settings
        }
        Err(err) => {
            warn!("Failed to load settings from {}: {err}", path.display());
            let settings = ClientSettings::default();
            if let Err(save_err) = settings.save(path) {
                warn!(
                    "Failed to overwrite settings at {}: {save_err}",
                    path.display()
                );
            }
            settings
        }
    }
}
