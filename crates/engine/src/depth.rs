use crate::app::Canvas;
use crate::world::Vec2;

/// Stable store of depth-sorted drawables, addressed by handle. Handles are
/// resolved at draw time, so the store may move and mutate freely between
/// frames.
pub trait DepthScene {
    type Handle: Copy;

    /// World-space Y used as the sort key (lower draws first).
    fn anchor_y(&self, handle: Self::Handle) -> f32;

    fn draw_sprite(&self, handle: Self::Handle, canvas: &mut dyn Canvas, offset: Vec2, draw_roof: bool);
}

/// Back-to-front compositor. Registrations are append-only; the order is
/// refreshed every `sort_interval` updates and replayed as-is in between.
#[derive(Debug, Clone)]
pub struct DepthRenderer<H> {
    handles: Vec<H>,
    sort_interval: u32,
    counter: u32,
}

impl<H: Copy> DepthRenderer<H> {
    pub fn new(sort_interval: u32) -> Self {
        let sort_interval = sort_interval.max(1);
        Self {
            handles: Vec::new(),
            sort_interval,
            counter: sort_interval,
        }
    }

    pub fn register(&mut self, handle: H) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Current draw order.
    pub fn order(&self) -> &[H] {
        &self.handles
    }

    /// One update tick. Returns `true` when this tick re-sorted.
    pub fn update<S>(&mut self, scene: &S) -> bool
    where
        S: DepthScene<Handle = H>,
    {
        self.counter = self.counter.saturating_sub(1);
        if self.counter > 0 {
            return false;
        }
        self.sort_now(scene);
        true
    }

    pub fn sort_now<S>(&mut self, scene: &S)
    where
        S: DepthScene<Handle = H>,
    {
        self.handles
            .sort_by(|a, b| scene.anchor_y(*a).total_cmp(&scene.anchor_y(*b)));
        self.counter = self.sort_interval;
    }

    pub fn draw<S>(&self, scene: &S, canvas: &mut dyn Canvas, offset: Vec2, draw_roof: bool)
    where
        S: DepthScene<Handle = H>,
    {
        for handle in &self.handles {
            scene.draw_sprite(*handle, canvas, offset, draw_roof);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Texture;
    use crate::world::Rect;
    use std::cell::RefCell;

    struct Anchors {
        ys: Vec<f32>,
        drawn: RefCell<Vec<usize>>,
    }

    impl DepthScene for Anchors {
        type Handle = usize;

        fn anchor_y(&self, handle: usize) -> f32 {
            self.ys[handle]
        }

        fn draw_sprite(&self, handle: usize, _canvas: &mut dyn Canvas, _offset: Vec2, _draw_roof: bool) {
            self.drawn.borrow_mut().push(handle);
        }
    }

    struct NullCanvas;

    impl Canvas for NullCanvas {
        fn size(&self) -> (u32, u32) {
            (0, 0)
        }
        fn draw_texture(&mut self, _texture: &Texture, _src: Rect, _dst: Rect, _flip_x: bool) {}
        fn fill_rect(&mut self, _dst: Rect, _color: [u8; 4]) {}
        fn clear(&mut self, _color: [u8; 4]) {}
    }

    fn renderer(count: usize, interval: u32) -> DepthRenderer<usize> {
        let mut renderer = DepthRenderer::new(interval);
        for handle in 0..count {
            renderer.register(handle);
        }
        renderer
    }

    #[test]
    fn sorts_after_interval_ticks() {
        let scene = Anchors {
            ys: vec![30.0, 10.0, 20.0],
            drawn: RefCell::default(),
        };
        let mut renderer = renderer(3, 3);

        assert!(!renderer.update(&scene));
        assert!(!renderer.update(&scene));
        assert_eq!(renderer.order(), &[0, 1, 2]);
        assert!(renderer.update(&scene));
        assert_eq!(renderer.order(), &[1, 2, 0]);
    }

    #[test]
    fn order_is_stale_between_sorts() {
        let mut scene = Anchors {
            ys: vec![1.0, 2.0],
            drawn: RefCell::default(),
        };
        let mut renderer = renderer(2, 2);
        renderer.sort_now(&scene);

        scene.ys[0] = 5.0;
        assert!(!renderer.update(&scene));
        renderer.draw(&scene, &mut NullCanvas, Vec2::ZERO, false);
        assert_eq!(*scene.drawn.borrow(), vec![0, 1]);

        assert!(renderer.update(&scene));
        assert_eq!(renderer.order(), &[1, 0]);
    }

    #[test]
    fn equal_anchors_keep_registration_order() {
        let scene = Anchors {
            ys: vec![4.0, 4.0, 1.0, 4.0],
            drawn: RefCell::default(),
        };
        let mut renderer = renderer(4, 1);
        assert!(renderer.update(&scene));
        assert_eq!(renderer.order(), &[2, 0, 1, 3]);
    }
}
