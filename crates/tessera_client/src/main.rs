mod commands;
mod input;
mod session;
mod settings;

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use session::SessionConfig;

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let mut world_name = String::from("world1");
    let mut saves_dir = PathBuf::from("saves");
    let mut config_path = PathBuf::from(settings::DEFAULT_SETTINGS_FILE);

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--world" => {
                let Some(value) = args.next() else {
                    eprintln!("--world expects a world name");
                    std::process::exit(2);
                };
                if value.is_empty() || value.contains(['/', '\\']) {
                    eprintln!("invalid world name '{value}'");
                    std::process::exit(2);
                }
                world_name = value;
            }
            "--saves" => {
                let Some(value) = args.next() else {
                    eprintln!("--saves expects a directory argument");
                    std::process::exit(2);
                };
                saves_dir = PathBuf::from(value);
            }
            "--config" => {
                let Some(value) = args.next() else {
                    eprintln!("--config expects a path argument");
                    std::process::exit(2);
                };
                config_path = PathBuf::from(value);
            }
            "--help" | "-h" => {
                println!(
                    "Usage: tessera_client [--world <name>] [--saves <dir>] [--config <path>]"
                );
                return;
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        eprintln!("\nShutdown signal received, saving world...");
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!("failed to set Ctrl+C handler: {err}");
        std::process::exit(1);
    }

    let settings = settings::load_or_create_settings(&config_path);
    let config = SessionConfig {
        world_name,
        saves_dir,
    };
    if let Err(err) = session::run(config, settings, running) {
        eprintln!("session failed: {err}");
        std::process::exit(1);
    }
}
