use crate::world::Rect;

use super::Texture;

/// Draw-call sink for the simulation: every sprite, tile and HUD element goes
/// through `draw_texture` as (texture, source rect, destination rect).
pub trait Canvas {
    fn size(&self) -> (u32, u32);
    fn draw_texture(&mut self, texture: &Texture, src: Rect, dst: Rect, flip_x: bool);
    fn fill_rect(&mut self, dst: Rect, color: [u8; 4]);
    fn clear(&mut self, color: [u8; 4]);
}

/// `Canvas` over a raw RGBA8 frame buffer (the `pixels` surface, or a test buffer).
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn pixel_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        (offset + 4 <= self.frame.len()).then_some(offset)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let offset = self.pixel_offset(x, y)?;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(rgba)
    }

    fn write_blended(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let Some(offset) = self.pixel_offset(x, y) else {
            return;
        };
        let alpha = color[3] as u32;
        if alpha == 0 {
            return;
        }
        let dst = &mut self.frame[offset..offset + 4];
        if alpha == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        for channel in 0..3 {
            let src = color[channel] as u32;
            let old = dst[channel] as u32;
            dst[channel] = ((src * alpha + old * (255 - alpha)) / 255) as u8;
        }
        dst[3] = 255;
    }
}

/// Destination span clipped to `[0, limit)`.
fn clipped_span(start: f32, length: f32, limit: u32) -> Option<(i32, i32)> {
    let first = start.round() as i32;
    let last = (start + length).round() as i32;
    let from = first.max(0);
    let to = last.min(limit as i32);
    (from < to).then_some((from, to))
}

impl Canvas for FrameCanvas<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw_texture(&mut self, texture: &Texture, src: Rect, dst: Rect, flip_x: bool) {
        if dst.width <= 0.0 || dst.height <= 0.0 || src.width <= 0.0 || src.height <= 0.0 {
            return;
        }
        let Some((x_from, x_to)) = clipped_span(dst.x, dst.width, self.width) else {
            return;
        };
        let Some((y_from, y_to)) = clipped_span(dst.y, dst.height, self.height) else {
            return;
        };
        let origin_x = dst.x.round();
        let origin_y = dst.y.round();
        let step_x = src.width / dst.width;
        let step_y = src.height / dst.height;

        for out_y in y_from..y_to {
            let dy = out_y as f32 - origin_y;
            let src_y = (src.y + (dy * step_y).floor()).min(src.bottom() - 1.0);
            for out_x in x_from..x_to {
                let dx = out_x as f32 - origin_x;
                let mut local_x = (dx * step_x).floor();
                if flip_x {
                    local_x = src.width - 1.0 - local_x;
                }
                let src_x = (src.x + local_x).clamp(src.x, src.right() - 1.0);
                let texel = texture.texel(src_x as u32, src_y as u32);
                self.write_blended(out_x, out_y, texel);
            }
        }
    }

    fn fill_rect(&mut self, dst: Rect, color: [u8; 4]) {
        let Some((x_from, x_to)) = clipped_span(dst.x, dst.width, self.width) else {
            return;
        };
        let Some((y_from, y_to)) = clipped_span(dst.y, dst.height, self.height) else {
            return;
        };
        for y in y_from..y_to {
            for x in x_from..x_to {
                self.write_blended(x, y, color);
            }
        }
    }

    fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn two_frame_strip() -> Texture {
        let mut image = RgbaImage::new(4, 2);
        for y in 0..2 {
            image.put_pixel(0, y, Rgba([10, 0, 0, 255]));
            image.put_pixel(1, y, Rgba([20, 0, 0, 255]));
            image.put_pixel(2, y, Rgba([30, 0, 0, 255]));
            image.put_pixel(3, y, Rgba([0, 0, 0, 0]));
        }
        Texture::from_image(image)
    }

    #[test]
    fn draw_texture_scales_source_rect_into_destination() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 8, 8);
        canvas.draw_texture(
            &two_frame_strip(),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rect::new(2.0, 2.0, 4.0, 4.0),
            false,
        );

        assert_eq!(canvas.pixel(2, 2), Some([10, 0, 0, 255]));
        assert_eq!(canvas.pixel(3, 5), Some([10, 0, 0, 255]));
        assert_eq!(canvas.pixel(4, 2), Some([20, 0, 0, 255]));
        assert_eq!(canvas.pixel(1, 2), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(6, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn flip_mirrors_within_source_rect() {
        let mut frame = vec![0u8; 8];
        let mut canvas = FrameCanvas::new(&mut frame, 2, 1);
        canvas.draw_texture(
            &two_frame_strip(),
            Rect::new(0.0, 0.0, 2.0, 1.0),
            Rect::new(0.0, 0.0, 2.0, 1.0),
            true,
        );
        assert_eq!(canvas.pixel(0, 0), Some([20, 0, 0, 255]));
        assert_eq!(canvas.pixel(1, 0), Some([10, 0, 0, 255]));
    }

    #[test]
    fn transparent_texels_leave_background() {
        let mut frame = vec![0u8; 4];
        let mut canvas = FrameCanvas::new(&mut frame, 1, 1);
        canvas.clear([7, 7, 7, 255]);
        canvas.draw_texture(
            &two_frame_strip(),
            Rect::new(3.0, 0.0, 1.0, 1.0),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            false,
        );
        assert_eq!(canvas.pixel(0, 0), Some([7, 7, 7, 255]));
    }

    #[test]
    fn offscreen_destination_is_clipped() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 4);
        canvas.draw_texture(
            &two_frame_strip(),
            Rect::new(0.0, 0.0, 3.0, 2.0),
            Rect::new(-2.0, -1.0, 3.0, 2.0),
            false,
        );
        assert_eq!(canvas.pixel(0, 0), Some([30, 0, 0, 255]));
        assert_eq!(canvas.pixel(1, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn fill_rect_blends_partial_alpha() {
        let mut frame = vec![0u8; 4];
        let mut canvas = FrameCanvas::new(&mut frame, 1, 1);
        canvas.clear([200, 200, 200, 255]);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), [0, 0, 0, 255 / 2]);
        let pixel = canvas.pixel(0, 0).expect("pixel");
        assert!(pixel[0] > 95 && pixel[0] < 105, "pixel={pixel:?}");
    }
}
