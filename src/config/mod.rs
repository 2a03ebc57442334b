use crate::error::Error;
use crate::synth::{DEFAULT_BUFFER_SIZE, MAX_VOLUME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted tone defaults for a host application.
///
/// These are conveniences around [`Synthesizer`](crate::Synthesizer)
/// construction and configuration; nothing in the generation core reads
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Default tone frequency in Hz (0 = silent until configured).
    pub frequency: f32,
    /// Default volume, 0..=1023.
    pub volume: i32,
    /// Buffer size in bytes.
    pub buffer_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            frequency: 0.0,
            volume: MAX_VOLUME,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("sawgen");
            path.push("settings.json");
            path
        })
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Some(p) => p,
            None => {
                eprintln!("[settings] Could not determine config path");
                return Self::default();
            }
        };

        if !path.exists() {
            return Self::default();
        }

        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("[settings] Failed to read config file: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("[settings] Failed to parse config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> crate::Result<()> {
        use std::io::Write;

        let path = Self::config_path()
            .ok_or_else(|| Error::Settings("could not determine config directory".into()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Settings(format!("failed to create config dir: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Settings(format!("failed to serialize settings: {}", e)))?;

        let mut file = fs::File::create(&path)
            .map_err(|e| Error::Settings(format!("failed to create config file: {}", e)))?;
        file.write_all(json.as_bytes())
            .map_err(|e| Error::Settings(format!("failed to write config file: {}", e)))?;
        file.sync_all()
            .map_err(|e| Error::Settings(format!("failed to sync config file: {}", e)))?;

        eprintln!("[settings] Saved settings to {:?}", path);
        Ok(())
    }
}
