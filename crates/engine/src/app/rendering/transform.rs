use crate::world::Vec2;

/// Visible window area in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn center(&self) -> Vec2 {
        self.size().scale(0.5)
    }
}

/// World pixels map to screen pixels by subtracting the camera scroll.
pub fn world_to_screen(world: Vec2, scroll: Vec2) -> Vec2 {
    world.sub(scroll)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_offsets_world_positions() {
        let scroll = Vec2::new(-10.0, 40.0);
        let screen = world_to_screen(Vec2::new(12.0, 50.0), scroll);
        assert_eq!(screen, Vec2::new(22.0, 10.0));
    }

    #[test]
    fn viewport_center_is_half_size() {
        let viewport = Viewport::new(1280, 720);
        assert_eq!(viewport.center(), Vec2::new(640.0, 360.0));
        assert!(Viewport::new(0, 720).is_empty());
    }
}
