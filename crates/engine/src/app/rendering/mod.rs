mod canvas;
mod renderer;
mod texture;
mod transform;

pub use canvas::{Canvas, FrameCanvas};
pub use renderer::Renderer;
pub use texture::{Texture, TextureError};
pub use transform::{world_to_screen, Viewport};
