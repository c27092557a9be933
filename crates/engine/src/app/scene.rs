use super::{Canvas, InputSnapshot, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneCommand {
    #[default]
    None,
    Quit,
}

/// A running game scene driven by the fixed-timestep loop: `update` once per
/// simulation tick, `render` once per presented frame.
pub trait Scene {
    fn load(&mut self, viewport: Viewport);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, canvas: &mut dyn Canvas, viewport: Viewport);
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}
