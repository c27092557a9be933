use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use homestead_engine::farm::{CropCatalog, CropDef};
use homestead_engine::LoopConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Location of the game configuration, relative to the assets directory.
pub(crate) const CONFIG_PATH: &str = "config/game.json";

const DEFAULT_CROPS: [&str; 11] = [
    "beetroot",
    "cabbage",
    "carrot",
    "cauliflower",
    "kale",
    "parsnip",
    "potato",
    "pumpkin",
    "radish",
    "sunflower",
    "wheat",
];
const DEFAULT_MAX_STAGE: u32 = 4;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read game config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse game config at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid game config field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct SeedStack {
    pub(crate) crop: String,
    pub(crate) count: u32,
}

/// Tunables for the farm scene. Every field falls back to its default when
/// absent from the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct GameConfig {
    pub(crate) window_title: String,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    /// On-screen tile size in pixels.
    pub(crate) tile_size: u32,
    /// Tile size the art and map were authored at.
    pub(crate) source_tile_size: u32,
    pub(crate) map_path: String,
    pub(crate) tileset_path: String,
    pub(crate) character_dir: String,
    pub(crate) crops_dir: String,
    pub(crate) soil_texture: String,
    pub(crate) tool_icons_dir: String,
    pub(crate) player_style: String,
    pub(crate) player_speed: f32,
    pub(crate) anim_speed: f32,
    pub(crate) tool_busy_duration: f32,
    pub(crate) tool_tick_rate: f32,
    pub(crate) interaction_radius: f32,
    pub(crate) depth_sort_interval: u32,
    pub(crate) camera_follow_rate: f32,
    pub(crate) day_fade_ticks: u32,
    pub(crate) crops: Vec<CropDef>,
    pub(crate) starting_seeds: Vec<SeedStack>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: "Homestead".to_string(),
            window_width: 1280,
            window_height: 720,
            tile_size: 48,
            source_tile_size: 16,
            map_path: "maps/farm.json".to_string(),
            tileset_path: "maps/tileset.png".to_string(),
            character_dir: "characters/human".to_string(),
            crops_dir: "elements/crops".to_string(),
            soil_texture: "elements/crops/soil.png".to_string(),
            tool_icons_dir: "ui".to_string(),
            player_style: "shorthair".to_string(),
            player_speed: 150.0,
            anim_speed: 12.0,
            tool_busy_duration: 200.0,
            tool_tick_rate: 100.0,
            interaction_radius: 5.0,
            depth_sort_interval: 20,
            camera_follow_rate: 2.0,
            day_fade_ticks: 120,
            crops: DEFAULT_CROPS
                .iter()
                .map(|name| CropDef {
                    name: name.to_string(),
                    max_stage: DEFAULT_MAX_STAGE,
                })
                .collect(),
            starting_seeds: vec![SeedStack {
                crop: "wheat".to_string(),
                count: 5,
            }],
        }
    }
}

impl GameConfig {
    /// Reads the config at `path`; a missing file means all defaults.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "game_config_defaulted");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::parse(&raw)?;
        info!(path = %path.display(), crops = config.crops.len(), "game_config_loaded");
        Ok(config)
    }

    pub(crate) fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: Self =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                let path = error.path().to_string();
                ConfigError::Parse {
                    path,
                    source: error.into_inner(),
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        if self.source_tile_size == 0 || self.tile_size % self.source_tile_size != 0 {
            return invalid("tile_size", "must be a non-zero multiple of source_tile_size");
        }
        if self.tool_tick_rate <= 0.0 {
            return invalid("tool_tick_rate", "must be positive");
        }
        if self.anim_speed <= 0.0 {
            return invalid("anim_speed", "must be positive");
        }
        if self.day_fade_ticks < 2 {
            return invalid("day_fade_ticks", "must be at least 2");
        }
        if self.crops.is_empty() {
            return invalid("crops", "at least one crop is required");
        }
        for stack in &self.starting_seeds {
            if !self.crops.iter().any(|crop| crop.name == stack.crop) {
                return Err(ConfigError::Invalid {
                    field: "starting_seeds",
                    reason: format!("unknown crop {:?}", stack.crop),
                });
            }
        }
        Ok(())
    }

    /// Art is scaled up by this integer factor.
    pub(crate) fn scale(&self) -> u32 {
        self.tile_size / self.source_tile_size
    }

    pub(crate) fn crop_catalog(&self) -> CropCatalog {
        CropCatalog::new(self.crops.clone())
    }

    pub(crate) fn crop_names(&self) -> Vec<&str> {
        self.crops.iter().map(|crop| crop.name.as_str()).collect()
    }

    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window_title.clone(),
            window_width: self.window_width,
            window_height: self.window_height,
            ..LoopConfig::default()
        }
    }
}
