use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{ImageReader, RgbaImage};
use thiserror::Error;

use crate::world::Rect;

/// Decoded RGBA8 image kept in CPU memory for the software canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    image: RgbaImage,
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("scale factor must be at least 1, got {scale}")]
    InvalidScale { scale: u32 },
}

impl Texture {
    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let reader = ImageReader::open(path).map_err(|source| TextureError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            image: decoded.to_rgba8(),
        })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    /// RGBA of the texel at (x, y); out-of-range reads are fully transparent.
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width() || y >= self.height() {
            return [0, 0, 0, 0];
        }
        self.image.get_pixel(x, y).0
    }

    /// Integer upscale with nearest-neighbour filtering, keeping pixel art crisp.
    pub fn scaled_nearest(&self, scale: u32) -> Result<Self, TextureError> {
        if scale == 0 {
            return Err(TextureError::InvalidScale { scale });
        }
        if scale == 1 {
            return Ok(self.clone());
        }
        let image = imageops::resize(
            &self.image,
            self.width() * scale,
            self.height() * scale,
            FilterType::Nearest,
        );
        Ok(Self { image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker() -> Texture {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        Texture::from_image(image)
    }

    #[test]
    fn nearest_scale_repeats_texels_without_blending() {
        let scaled = checker().scaled_nearest(3).expect("scale");
        assert_eq!((scaled.width(), scaled.height()), (6, 3));
        assert_eq!(scaled.texel(2, 2), [255, 0, 0, 255]);
        assert_eq!(scaled.texel(3, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(matches!(
            checker().scaled_nearest(0),
            Err(TextureError::InvalidScale { scale: 0 })
        ));
    }

    #[test]
    fn load_round_trips_png_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tiles.png");
        let mut image = RgbaImage::new(4, 2);
        image.put_pixel(3, 1, Rgba([1, 2, 3, 255]));
        image.save(&path).expect("save");

        let texture = Texture::load(&path).expect("load");
        assert_eq!((texture.width(), texture.height()), (4, 2));
        assert_eq!(texture.texel(3, 1), [1, 2, 3, 255]);
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Texture::load(&dir.path().join("nope.png")).expect_err("err");
        assert!(matches!(err, TextureError::Open { .. }));
    }
}
