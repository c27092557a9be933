mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{
    world_to_screen, Canvas, FrameCanvas, Renderer, Texture, TextureError,
    Viewport,
};
pub use scene::{Scene, SceneCommand};
