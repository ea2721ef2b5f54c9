//! CLI interface for soundscape

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Procedural ambient soundscapes
#[derive(Parser)]
#[command(name = "soundscape")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play the soundscape on an audio device until Ctrl-C
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "soundscape.yaml")]
        config: PathBuf,

        /// Stop after this many seconds
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Render to a WAV file
    Record {
        /// Configuration file path
        #[arg(short, long, default_value = "soundscape.yaml")]
        config: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value = "60")]
        duration: u64,
    },

    /// List available audio output devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "soundscape.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_arguments() {
        let cli = Cli::parse_from(["soundscape", "record", "-o", "out.wav", "-d", "5"]);
        match cli.command {
            Commands::Record { config, output, duration } => {
                assert_eq!(config, PathBuf::from("soundscape.yaml"));
                assert_eq!(output, PathBuf::from("out.wav"));
                assert_eq!(duration, 5);
            }
            _ => panic!("expected record"),
        }
    }

    #[test]
    fn test_play_duration_is_optional() {
        let cli = Cli::parse_from(["soundscape", "play"]);
        assert!(matches!(cli.command, Commands::Play { duration: None, .. }));
    }
}
