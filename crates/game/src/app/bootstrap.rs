use std::path::Path;

use homestead_engine::farm::ToolKind;
use homestead_engine::strip::{load_anim_styles, load_crop_strips, AssetError};
use homestead_engine::world::{MapDocument, MapError, TileMap, Tileset};
use homestead_engine::{
    resolve_app_paths, AppPaths, LoopConfig, MetricsHandle, Scene, StartupError, Texture,
    TextureError,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, GameConfig, CONFIG_PATH};
use super::gameplay::{AnimState, GameAssets, GameplayError, GameplayScene};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) metrics: MetricsHandle,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("failed to load tileset: {0}")]
    Tileset(#[source] TextureError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Gameplay(#[from] GameplayError),
    #[error("config scales map tiles by {config} but the map document needs {map}")]
    ScaleMismatch { config: u32, map: u32 },
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    info!("=== Homestead Startup ===");

    let paths = resolve_app_paths()?;
    let config = GameConfig::load(&paths.asset(CONFIG_PATH))?;
    let assets = load_assets(&paths, &config)?;
    let metrics = MetricsHandle::default();
    let scene = GameplayScene::new(config.clone(), assets, metrics.clone())?;

    Ok(AppWiring {
        config: config.loop_config(),
        scene: Box::new(scene),
        metrics,
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_assets(paths: &AppPaths, config: &GameConfig) -> Result<GameAssets, BootstrapError> {
    let document = MapDocument::load(&paths.asset(&config.map_path))?;
    let map = TileMap::from_document(&document, config.tile_size)?;
    check_scale(config, &map)?;
    let tileset = Tileset::load(
        &paths.asset(&config.tileset_path),
        map.scale(),
        config.tile_size,
    )
    .map_err(BootstrapError::Tileset)?;

    let anim_dirs: Vec<&str> = AnimState::ALL
        .iter()
        .map(|state| state.dir_name())
        .collect();
    let anim_styles = load_anim_styles(&paths.asset(&config.character_dir), &anim_dirs)?;
    let crop_strips = load_crop_strips(&paths.asset(&config.crops_dir), &config.crop_names())?;

    let soil = load_optional_texture(&paths.asset(&config.soil_texture));
    let icons_dir = paths.asset(&config.tool_icons_dir);
    let tool_icons = ToolKind::ALL
        .into_iter()
        .filter_map(|tool| {
            let path = icons_dir.join(format!("{}.png", tool.name()));
            load_optional_texture(&path).map(|icon| (tool, icon))
        })
        .collect();

    Ok(GameAssets {
        map,
        tileset,
        anim_styles,
        crop_strips,
        soil,
        tool_icons,
    })
}

/// Character strips are drawn at the config scale; the map must agree.
fn check_scale(config: &GameConfig, map: &TileMap) -> Result<(), BootstrapError> {
    if config.scale() != map.scale() {
        return Err(BootstrapError::ScaleMismatch {
            config: config.scale(),
            map: map.scale(),
        });
    }
    Ok(())
}

/// Decorations the game can run without.
fn load_optional_texture(path: &Path) -> Option<Texture> {
    match Texture::load(path) {
        Ok(texture) => Some(texture),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "optional_texture_unavailable");
            None
        }
    }
}
