//! Settings management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub script: ScriptSettings,
    pub simulation: SimulationSettings,
    pub scene: Vec<ObjectSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    /// Directory that dotted module names resolve against.
    pub root: PathBuf,
    /// QuickJS heap limit in bytes.
    pub memory_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSettings {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub ui: bool,
    pub permanent: bool,
    pub script: Option<ScriptRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRef {
    pub module: String,
    pub class: String,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            script: ScriptSettings::default(),
            simulation: SimulationSettings::default(),
            scene: vec![
                ObjectSettings {
                    name: "player".to_string(),
                    w: 4,
                    h: 4,
                    script: Some(ScriptRef {
                        module: "scripts.main".to_string(),
                        class: "Player".to_string(),
                    }),
                    ..ObjectSettings::default()
                },
                ObjectSettings {
                    name: "crate".to_string(),
                    x: 10,
                    w: 4,
                    h: 4,
                    permanent: true,
                    ..ObjectSettings::default()
                },
            ],
        }
    }
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            memory_limit: None,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self { ticks: 10 }
    }
}

impl Default for ObjectSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            x: 0,
            y: 0,
            w: 1,
            h: 1,
            ui: false,
            permanent: false,
            script: None,
        }
    }
}
