use std::collections::{BTreeMap, HashMap};

use homestead_engine::app::world_to_screen;
use homestead_engine::farm::{
    apply_farm_action, CropCatalog, CropId, CropLedger, FarmAction, FarmOutcome, FarmVisuals,
    PlotState, ToolKind,
};
use homestead_engine::strip::{AnimStyle, StripAnimation, StripSheet};
use homestead_engine::world::{Rect, Tile, TileMap, Tileset, Vec2};
use homestead_engine::{
    Canvas, DepthRenderer, DepthScene, Hitbox, InputAction, InputSnapshot, MetricsHandle,
    MovementResolver, Scene, SceneCommand, Texture, Viewport,
};
use thiserror::Error;
use tracing::{debug, info};

use super::config::GameConfig;

pub(crate) const PLAYER_SPAWN_TAG: &str = "player";
const HOUSE_WALL_TAG: &str = "house_walls";
const TREE_TAG_PREFIX: &str = "tree";
const TOOLS_VARIANT: &str = "tools";
const HITBOX_WIDTH_RATIO: f32 = 0.4;
const TRUNK_WIDTH_RATIO: f32 = 0.3;
const TRUNK_HEIGHT_RATIO: f32 = 0.25;
const SEED_ICON_FRAME: usize = 3;
const HUD_BOTTOM_MARGIN: f32 = 60.0;
const CLEAR_COLOR: [u8; 4] = [255, 255, 255, 255];

include!("types.rs");
include!("systems.rs");
include!("scene_impl.rs");
include!("util.rs");

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
