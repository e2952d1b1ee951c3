use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{IVec3, Vec2};
use tessera_persist::save::WorldSave;
use tessera_shared::player::{Player, PlayerState};
use tessera_shared::world::{MeshCache, World};
use tracing::{debug, info, warn};

use crate::commands::{self, Command, HELP_LINES};
use crate::input::InputState;
use crate::settings::ClientSettings;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub world_name: String,
    pub saves_dir: PathBuf,
}

pub struct Session {
    world: World<MeshCache>,
    player: Player,
    save: Option<WorldSave>,
    input: InputState,
    settings: ClientSettings,
    pending: VecDeque<Command>,
    wait_ticks: u32,
    tick: u64,
    last_save: Instant,
    running: Arc<AtomicBool>,
    command_rx: Receiver<Command>,
}

impl Session {
    pub fn new(
        config: &SessionConfig,
        settings: ClientSettings,
        running: Arc<AtomicBool>,
        command_rx: Receiver<Command>,
    ) -> Self {
        let save = match WorldSave::open(&config.saves_dir, &config.world_name) {
            Ok(save) => Some(save),
            Err(err) => {
                warn!(
                    "Failed to open save directory for '{}' in {}: {err}; world will not be saved",
                    config.world_name,
                    config.saves_dir.display()
                );
                None
            }
        };

        let mut world = World::with_spawn_area(MeshCache::default(), settings.spawn_radius);
        let state = match save.as_ref() {
            Some(save) if save.exists() => match save.load_world(&mut world) {
                Ok(Some(state)) => state,
                Ok(None) => {
                    info!("No player data in '{}', spawning fresh", save.name());
                    PlayerState::default()
                }
                Err(err) => {
                    warn!("Failed to load world '{}': {err}; starting new world", save.name());
                    PlayerState::default()
                }
            },
            _ => {
                info!("No existing save found, starting new world");
                PlayerState::default()
            }
        };

        let mut player = Player::from_state(state);
        player.move_speed = settings.move_speed;

        Self {
            world,
            player,
            save,
            input: InputState::default(),
            settings,
            pending: VecDeque::new(),
            wait_ticks: 0,
            tick: 0,
            last_save: Instant::now(),
            running,
            command_rx,
        }
    }

    pub fn run(&mut self) {
        let tick_duration = Duration::from_secs_f64(1.0 / f64::from(self.settings.tick_rate));
        let dt = tick_duration.as_secs_f32();
        info!(
            "Starting session at {} ticks/s ({} chunks loaded)",
            self.settings.tick_rate,
            self.world.chunk_count()
        );

        while self.running.load(Ordering::SeqCst) {
            let tick_start = Instant::now();
            self.tick(dt);

            let elapsed = tick_start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            }
        }

        info!("Session shutting down, saving world...");
        self.save_now();
        self.world.cleanup();
        debug!(
            "Released render resources, {} still live",
            self.world.renderer().live_resources()
        );
    }

    pub fn tick(&mut self, dt: f32) {
        self.handle_console_commands();
        self.apply_input(dt);
        self.world.render();
        self.input.clear_frame();

        self.tick += 1;
        self.wait_ticks = self.wait_ticks.saturating_sub(1);

        let interval = Duration::from_secs(self.settings.autosave_interval_secs);
        if self.save.is_some() && self.last_save.elapsed() >= interval {
            info!("Autosaving after {} ticks", self.tick);
            self.save_now();
        }
    }

    /// Commands queued behind a `wait` stay pending until the wait expires.
    fn handle_console_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.pending.push_back(command);
        }

        while self.wait_ticks == 0 && self.running.load(Ordering::SeqCst) {
            let Some(command) = self.pending.pop_front() else {
                break;
            };
            self.execute_command(command);
        }
    }

    fn apply_input(&mut self, dt: f32) {
        let look = self.input.look_delta;
        if look != Vec2::ZERO {
            self.player.rotate(look.x, look.y);
        }
        self.player.set_movement(self.input.forward, self.input.strafe);

        if self.input.consume_jump() && !self.player.jump() {
            debug!("Jump ignored, player is airborne");
        }
        if let Some(slot) = self.input.consume_selected_slot() {
            self.player.select_slot(slot);
        }
        self.player.scroll_slot(self.input.scroll_delta);

        if self.input.consume_break() {
            if self.player.break_block(&mut self.world) {
                info!("Broke block, now holding {} items", self.inventory_total());
            } else {
                debug!("Nothing in reach to break");
            }
        }
        if self.input.consume_place() {
            if self.player.place_block(&mut self.world) {
                info!("Placed block from slot {}", self.player.selected_slot());
            } else {
                debug!("Nothing placed");
            }
        }

        self.player.update(dt, &self.world);
    }

    fn execute_command(&mut self, command: Command) {
        match command {
            Command::Noop => {}
            Command::Move { forward, strafe } => self.input.set_movement(forward, strafe),
            Command::Stop => self.input.stop(),
            Command::Look { pitch, yaw } => self.input.add_look_delta(pitch, yaw),
            Command::Jump => self.input.request_jump(),
            Command::Break => self.input.request_break(),
            Command::Place => self.input.request_place(),
            Command::Slot(slot) => self.input.select_slot(slot),
            Command::Scroll(delta) => self.input.add_scroll(delta),
            Command::Wait(ticks) => self.wait_ticks = ticks,
            Command::Pos => self.log_position(),
            Command::Inv => self.log_inventory(),
            Command::Block { x, y, z } => {
                let block = self.world.get_block(IVec3::new(x, y, z));
                info!("[CONSOLE] block at [{x}, {y}, {z}] is {}", block.name());
            }
            Command::Save => self.save_now(),
            Command::Quit => self.request_shutdown("console quit"),
            Command::Help => {
                for line in HELP_LINES {
                    info!("[CONSOLE] {line}");
                }
            }
            Command::InvalidUsage(message) => warn!("[CONSOLE] {message}"),
            Command::Unknown(input) => {
                warn!("[CONSOLE] unknown command '{input}' (try help)")
            }
        }
    }

    fn log_position(&self) {
        let pos = self.player.position();
        info!(
            "[CONSOLE] position [{:.2}, {:.2}, {:.2}], yaw {:.1}, pitch {:.1}, on ground: {}",
            pos.x, pos.y, pos.z, self.player.yaw, self.player.pitch, self.player.body.on_ground
        );
        match self.player.target(&self.world) {
            Some(hit) => info!(
                "[CONSOLE] looking at {} at {}",
                hit.block.name(),
                hit.block_pos
            ),
            None => info!("[CONSOLE] nothing in reach"),
        }
    }

    fn log_inventory(&self) {
        let selected = self.player.selected_slot();
        for (slot, stack) in self.player.inventory.slots.iter().enumerate() {
            let Some(stack) = stack.filter(|stack| !stack.is_empty()) else {
                continue;
            };
            let marker = if slot == selected { "*" } else { " " };
            info!(
                "[CONSOLE] {marker}{slot:>2}: {} x{}",
                stack.block.name(),
                stack.count
            );
        }
        info!("[CONSOLE] {} items total", self.inventory_total());
    }

    fn inventory_total(&self) -> u32 {
        self.player
            .inventory
            .slots
            .iter()
            .flatten()
            .map(|stack| u32::from(stack.count))
            .sum()
    }

    /// The autosave timer restarts even when the save fails.
    fn save_now(&mut self) {
        self.last_save = Instant::now();
        let Some(save) = self.save.as_ref() else {
            debug!("No save directory, skipping save");
            return;
        };
        if let Err(err) = save.save_world(&self.world, &self.player.state()) {
            warn!("Failed to save world '{}': {err}", save.name());
        }
    }

    fn request_shutdown(&mut self, source: &str) {
        info!("Shutdown requested via {source}");
        self.running.store(false, Ordering::SeqCst);
    }
}

pub fn run(
    config: SessionConfig,
    settings: ClientSettings,
    running: Arc<AtomicBool>,
) -> io::Result<()> {
    let (command_tx, command_rx) = mpsc::channel();
    spawn_console_command_thread(command_tx);

    let mut session = Session::new(&config, settings, running, command_rx);
    session.run();
    Ok(())
}

fn spawn_console_command_thread(command_tx: Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line_result in stdin.lock().lines() {
            let line = match line_result {
                Ok(line) => line,
                Err(err) => {
                    warn!("Failed to read console input: {err}");
                    break;
                }
            };

            let command = commands::parse_command(&line);
            if command_tx.send(command).is_err() {
                break;
            }
        }
    });
}
