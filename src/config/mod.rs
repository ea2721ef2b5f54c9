//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Example configuration written by `soundscape init`
pub const EXAMPLE_CONFIG: &str = include_str!("../../soundscape.example.yaml");

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<SoundscapeConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {:?}", path))?;
    let config: SoundscapeConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {:?}", path))?;
    config
        .validate()
        .with_context(|| format!("invalid config file: {:?}", path))?;
    log::debug!("loaded config from {:?}", path);
    Ok(config)
}

/// Load configuration, falling back to defaults when the file is missing
pub fn load_or_default(path: &Path) -> Result<SoundscapeConfig> {
    if path.exists() {
        load_config(path)
    } else {
        log::warn!("{:?} not found, using the default configuration", path);
        Ok(SoundscapeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
audio:
  sample_rate: 48000
  buffer_size: 256

stages:
  echoes: false
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.audio.buffer_size, 256);
        assert!(!config.stages.echoes);
        assert!(config.stages.plucking);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"master:\n  volume: 3.0\n").unwrap();

        let err = load_config(file.path()).unwrap_err();
        let root = err.root_cause().to_string();
        assert!(root.contains("master volume"), "unexpected error: {}", root);
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: SoundscapeConfig = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
    }
}
