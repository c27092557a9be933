use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::app::{Texture, TextureError};
use crate::world::Rect;

/// Token naming the shared body layer of an animation style.
pub const BASE_VARIANT: &str = "base";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("strip file name {name:?} does not match <name>_<variant>_strip<N>.png")]
    StripName { name: String },
    #[error("strip {path} declares zero frames")]
    ZeroFrames { path: PathBuf },
    #[error("animation style directory {path} is missing")]
    MissingStyle { path: PathBuf },
    #[error("animation style {style} has no `base` strip")]
    MissingBase { style: String },
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Parsed form of `name_variant_stripN.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripName {
    pub parts: [String; 2],
    pub frames: usize,
}

/// Splits a strip file name into its leading two `_` tokens and the trailing
/// frame count (`base_idle_strip9.png` -> `["base", "idle"]`, 9).
pub fn parse_strip_name(file_name: &str) -> Result<StripName, AssetError> {
    let invalid = || AssetError::StripName {
        name: file_name.to_string(),
    };
    let stem = file_name.strip_suffix(".png").ok_or_else(invalid)?;
    let mut tokens = stem.split('_');
    let first = tokens.next().filter(|t| !t.is_empty()).ok_or_else(invalid)?;
    let second = tokens.next().filter(|t| !t.is_empty()).ok_or_else(invalid)?;
    let last = tokens.last().ok_or_else(invalid)?;

    let digits_at = last
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (label, digits) = last.split_at(digits_at);
    if !label.ends_with(|c: char| c.is_ascii_lowercase()) {
        return Err(invalid());
    }
    let frames = digits.parse::<usize>().map_err(|_| invalid())?;

    Ok(StripName {
        parts: [first.to_string(), second.to_string()],
        frames,
    })
}

/// Horizontal sprite strip of equal-width frames.
#[derive(Debug, Clone)]
pub struct StripSheet {
    texture: Texture,
    frame_count: usize,
    frame_width: f32,
}

impl StripSheet {
    pub fn new(texture: Texture, frame_count: usize) -> Option<Self> {
        if frame_count == 0 {
            return None;
        }
        let frame_width = texture.width() as f32 / frame_count as f32;
        Some(Self {
            texture,
            frame_count,
            frame_width,
        })
    }

    pub fn load(path: &Path, frame_count: usize) -> Result<Self, AssetError> {
        let texture = Texture::load(path)?;
        Self::new(texture, frame_count).ok_or_else(|| AssetError::ZeroFrames {
            path: path.to_path_buf(),
        })
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Unscaled size of one frame.
    pub fn frame_size(&self) -> (f32, f32) {
        (self.frame_width, self.texture.height() as f32)
    }

    pub fn frame(&self, index: usize) -> Option<Rect> {
        (index < self.frame_count).then(|| {
            Rect::new(
                index as f32 * self.frame_width,
                0.0,
                self.frame_width,
                self.texture.height() as f32,
            )
        })
    }
}

/// One animation (IDLE, WALKING, ...) split into layered strips.
#[derive(Debug, Clone)]
pub struct AnimStyle {
    pub base: StripSheet,
    pub variants: HashMap<String, StripSheet>,
    pub frame_count: usize,
}

impl AnimStyle {
    pub fn variant(&self, name: &str) -> Option<&StripSheet> {
        self.variants.get(name)
    }
}

/// Loads `dir/<STYLE>/*.png` for each requested style. Files are grouped by
/// their first name token; `base` becomes the body layer.
pub fn load_anim_styles(dir: &Path, styles: &[&str]) -> Result<HashMap<String, AnimStyle>, AssetError> {
    let mut loaded = HashMap::new();
    for style in styles {
        let style_dir = dir.join(style);
        if !style_dir.is_dir() {
            return Err(AssetError::MissingStyle { path: style_dir });
        }

        let mut base = None;
        let mut variants = HashMap::new();
        let mut frame_count = 0;
        for path in png_files(&style_dir)? {
            let name = file_name(&path);
            let parsed = parse_strip_name(&name)?;
            let sheet = StripSheet::load(&path, parsed.frames)?;
            frame_count = parsed.frames;
            let [variant, _] = parsed.parts;
            if variant == BASE_VARIANT {
                base = Some(sheet);
            } else {
                variants.insert(variant, sheet);
            }
        }

        let base = base.ok_or_else(|| AssetError::MissingBase {
            style: style.to_string(),
        })?;
        debug!(style, variants = variants.len(), frame_count, "anim_style_loaded");
        loaded.insert(
            style.to_string(),
            AnimStyle {
                base,
                variants,
                frame_count,
            },
        );
    }
    info!(dir = %dir.display(), styles = loaded.len(), "anim_styles_loaded");
    Ok(loaded)
}

/// Walks `dir` recursively for `<crop>_*.png` strips of the listed crops.
/// Crops without a strip are simply absent from the result. When a crop has
/// several strips the last one in name order replaces the others.
pub fn load_crop_strips(dir: &Path, crops: &[&str]) -> Result<HashMap<String, StripSheet>, AssetError> {
    let mut loaded = HashMap::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = read_dir_sorted(&current)?;
        for path in entries {
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
                continue;
            }
            let name = file_name(&path);
            let crop = name.split('_').next().unwrap_or_default();
            if !crops.contains(&crop) {
                continue;
            }
            let parsed = parse_strip_name(&name)?;
            let sheet = StripSheet::load(&path, parsed.frames)?;
            if loaded.insert(crop.to_string(), sheet).is_some() {
                warn!(crop, path = %path.display(), "duplicate_crop_strip");
            }
        }
    }
    info!(dir = %dir.display(), crops = loaded.len(), "crop_strips_loaded");
    Ok(loaded)
}

fn png_files(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    Ok(read_dir_sorted(dir)?
        .into_iter()
        .filter(|path| {
            path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("png")
        })
        .collect())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    let read_err = |source| AssetError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        paths.push(entry.map_err(read_err)?.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Frame cursor over a strip: advances by `dt * speed` and wraps to 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripAnimation {
    cursor: f32,
    speed: f32,
    frame_count: usize,
}

impl StripAnimation {
    pub fn new(frame_count: usize, speed: f32) -> Self {
        Self {
            cursor: 0.0,
            speed,
            frame_count,
        }
    }

    /// Returns `true` when the cursor wrapped back to the first frame.
    pub fn update(&mut self, dt: f32) -> bool {
        self.cursor += dt * self.speed;
        if self.cursor >= self.frame_count as f32 {
            self.cursor = 0.0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.cursor = 0.0;
    }

    pub fn frame(&self) -> usize {
        (self.cursor.floor() as usize).min(self.frame_count.saturating_sub(1))
    }
}
