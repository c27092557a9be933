use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Layer property carrying draw order and the object-layer sentinel.
pub const Z_PROPERTY: &str = "z";
/// `z` value marking a layer whose tiles are decorative objects.
pub const OBJECT_LAYER_Z: i64 = -1;

/// Tiled-style JSON map document, as exported by the map editor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapDocument {
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub layers: Vec<LayerData>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerData {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub data: Vec<u32>,
    #[serde(default)]
    pub properties: Vec<LayerProperty>,
    /// Emitter rectangles (chimney smoke and the like); carried, not interpreted.
    #[serde(default)]
    pub objects: Vec<LayerObject>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerProperty {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LayerObject {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

fn default_visible() -> bool {
    true
}

impl LayerData {
    pub fn property(&self, name: &str) -> Option<i64> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .map(|property| property.value)
    }

    /// Layers without a `z` property sort with the object layers.
    pub fn z(&self) -> i64 {
        self.property(Z_PROPERTY).unwrap_or(OBJECT_LAYER_Z)
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map {path} at {json_path}: {message}")]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("map tile size must be non-zero (tilewidth={tile_width}, tileheight={tile_height})")]
    ZeroTileSize { tile_width: u32, tile_height: u32 },
    #[error("layer '{layer}' has {actual} tile ids, expected {expected} ({width}x{height})")]
    LayerLength {
        layer: String,
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },
    #[error("target tile size {target} is not a positive multiple of source tile size {source_size}")]
    Scale { target: u32, source_size: u32 },
}

impl MapDocument {
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let raw = fs::read_to_string(path).map_err(|source| MapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, origin: &Path) -> Result<Self, MapError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let document: MapDocument = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| {
                let json_path = error.path().to_string();
                MapError::Parse {
                    path: origin.to_path_buf(),
                    json_path,
                    message: error.into_inner().to_string(),
                }
            })?;
        document.validate()?;
        Ok(document)
    }

    fn validate(&self) -> Result<(), MapError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(MapError::ZeroTileSize {
                tile_width: self.tile_width,
                tile_height: self.tile_height,
            });
        }
        let expected = self.width as usize * self.height as usize;
        for layer in &self.layers {
            // Layers without tile data (emitters) are allowed.
            if layer.data.is_empty() {
                continue;
            }
            if layer.data.len() != expected {
                return Err(MapError::LayerLength {
                    layer: layer.name.clone(),
                    expected,
                    actual: layer.data.len(),
                    width: self.width,
                    height: self.height,
                });
            }
        }
        Ok(())
    }
}
