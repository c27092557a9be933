use std::path::Path;

use tracing::info;

use crate::app::{Texture, TextureError};

use super::Rect;

/// Sprite sheet for map tiles, already upscaled to the in-game tile size.
#[derive(Debug, Clone)]
pub struct Tileset {
    texture: Texture,
    tile_size: u32,
    columns: u32,
    rows: u32,
}

impl Tileset {
    pub fn load(path: &Path, scale: u32, tile_size: u32) -> Result<Self, TextureError> {
        let source = Texture::load(path)?;
        let tileset = Self::from_texture(&source, scale, tile_size)?;
        info!(
            path = %path.display(),
            scale,
            columns = tileset.columns,
            rows = tileset.rows,
            "tileset_loaded"
        );
        Ok(tileset)
    }

    /// Scales `source` by `scale` and slices it into `tile_size` cells. The
    /// column/row counts come from the scaled image.
    pub fn from_texture(source: &Texture, scale: u32, tile_size: u32) -> Result<Self, TextureError> {
        let texture = source.scaled_nearest(scale)?;
        let tile_size = tile_size.max(1);
        let columns = texture.width() / tile_size;
        let rows = texture.height() / tile_size;
        Ok(Self {
            texture,
            tile_size,
            columns,
            rows,
        })
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Source rectangle for a tileset variant, or `None` past the sheet's end.
    pub fn source_rect(&self, variant: u32) -> Option<Rect> {
        if self.columns == 0 || variant >= self.columns * self.rows {
            return None;
        }
        let size = self.tile_size as f32;
        Some(Rect::new(
            (variant % self.columns) as f32 * size,
            (variant / self.columns) as f32 * size,
            size,
            size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn grid_dimensions_come_from_scaled_image() {
        let source = Texture::from_image(RgbaImage::new(64, 32));
        let tileset = Tileset::from_texture(&source, 3, 48).expect("tileset");
        assert_eq!(tileset.columns(), 4);
        assert_eq!(tileset.rows(), 2);
        assert_eq!(tileset.texture().width(), 192);
    }

    #[test]
    fn source_rect_walks_row_major() {
        let source = Texture::from_image(RgbaImage::new(64, 32));
        let tileset = Tileset::from_texture(&source, 3, 48).expect("tileset");
        assert_eq!(tileset.source_rect(0), Some(Rect::new(0.0, 0.0, 48.0, 48.0)));
        assert_eq!(tileset.source_rect(5), Some(Rect::new(48.0, 48.0, 48.0, 48.0)));
        assert_eq!(tileset.source_rect(8), None);
    }
}
