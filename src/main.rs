//! Soundscape - procedural ambient audio

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait};
use soundscape::config::{self, EXAMPLE_CONFIG};
use soundscape::engine::{list_output_devices, render_to_file, Player, Recorder};
use soundscape::Engine;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config: config_path,
            duration,
        } => {
            let cfg = config::load_or_default(&config_path)?;

            let stop = Arc::new(AtomicBool::new(false));
            let handler_stop = stop.clone();
            ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst))
                .context("failed to install Ctrl-C handler")?;

            let mut player = Player::new();
            player.start(&cfg)?;
            println!("Playing. Press Ctrl-C to stop.");

            let started = Instant::now();
            let limit = duration.map(Duration::from_secs);
            while !stop.load(Ordering::SeqCst) {
                if limit.is_some_and(|limit| started.elapsed() >= limit) {
                    break;
                }
                std::thread::sleep(Duration::from_millis(50));
            }

            player.stop();
            log::info!("stopped after {:.1}s", started.elapsed().as_secs_f64());
        }

        Commands::Record {
            config: config_path,
            output,
            duration,
        } => {
            let cfg = config::load_or_default(&config_path)?;

            println!("Recording {} seconds to {:?}...", duration, output);

            let mut engine = Engine::new(&cfg);
            let mut recorder = Recorder::new(&output, engine.sample_rate())?;
            let frames = render_to_file(
                &mut engine,
                &mut recorder,
                duration as f64,
                cfg.audio.buffer_size,
            )?;
            recorder.finalize()?;

            log::info!(
                "{} frames, {} notes, {} plucks",
                frames,
                engine.sequencer().notes_completed(),
                engine.plucks()
            );
            println!("Recorded to {:?}", output);
        }

        Commands::Devices => {
            println!("Available audio devices:\n");

            let host = cpal::default_host();
            if let Some(device) = host.default_output_device() {
                println!("Default output: {}", device.name().unwrap_or_default());
                println!();
            }

            println!("Output devices:");
            let devices = list_output_devices();
            if devices.is_empty() {
                println!("  (none found)");
            }
            for (name, config) in devices {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }
        }

        Commands::Check {
            config: config_path,
        } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    println!("  Volume: {:.0}%", cfg.master.volume * 100.0);
                    println!("  Transpose: {:+}", cfg.master.transpose);
                    match cfg.master.seed {
                        Some(seed) => println!("  Seed: {}", seed),
                        None => println!("  Seed: random"),
                    }
                    println!("  Lead pitch: {:?}", cfg.master.lead_pitch);

                    let stages = &cfg.stages;
                    println!("  Stages:");
                    for (name, enabled) in [
                        ("echoes", stages.echoes),
                        ("distortion", stages.distortion),
                        ("filter", stages.filter),
                        ("randomness", stages.randomness),
                        ("plucking", stages.plucking),
                        ("noise_bursts", stages.noise_bursts),
                    ] {
                        println!(
                            "    - {} {}",
                            name,
                            if enabled { "[enabled]" } else { "[disabled]" }
                        );
                    }

                    let quirks = &cfg.quirks;
                    for (name, enabled) in [
                        ("masked_right_delay_cursor", quirks.masked_right_delay_cursor),
                        ("mono_foldback", quirks.mono_foldback),
                        ("masked_pluck_gate", quirks.masked_pluck_gate),
                    ] {
                        if enabled {
                            println!("  Quirk: {}", name);
                        }
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let path = "soundscape.yaml";
            if std::path::Path::new(path).exists() {
                println!("soundscape.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, EXAMPLE_CONFIG)?;
                println!("Created soundscape.yaml with example configuration.");
            }
        }
    }

    Ok(())
}
