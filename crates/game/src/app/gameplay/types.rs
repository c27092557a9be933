/// Character animation; each state has its own strip directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AnimState {
    Idle,
    Walking,
    Watering,
    Dig,
    Axe,
}

impl AnimState {
    pub(crate) const ALL: [AnimState; 5] = [
        AnimState::Idle,
        AnimState::Walking,
        AnimState::Watering,
        AnimState::Dig,
        AnimState::Axe,
    ];

    pub(crate) fn dir_name(self) -> &'static str {
        match self {
            AnimState::Idle => "IDLE",
            AnimState::Walking => "WALKING",
            AnimState::Watering => "WATERING",
            AnimState::Dig => "DIG",
            AnimState::Axe => "AXE",
        }
    }

    pub(crate) fn for_tool(tool: ToolKind) -> Self {
        match tool {
            ToolKind::Water => AnimState::Watering,
            ToolKind::Shovel => AnimState::Dig,
            ToolKind::Axe => AnimState::Axe,
        }
    }

    pub(crate) fn is_tool(self) -> bool {
        matches!(self, AnimState::Watering | AnimState::Dig | AnimState::Axe)
    }
}

#[derive(Debug, Error)]
pub(crate) enum GameplayError {
    #[error("map has no `{tag}` spawn marker")]
    MissingSpawn { tag: &'static str },
    #[error("character animation {state} is missing")]
    MissingAnimation { state: &'static str },
}

/// Body, hair/clothing style and held-tool layers of one animation.
#[derive(Debug, Clone)]
pub(crate) struct AnimLayers {
    pub(crate) base: StripSheet,
    pub(crate) style: Option<StripSheet>,
    pub(crate) tools: Option<StripSheet>,
    pub(crate) frame_count: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct PlayerSprites {
    layers: HashMap<AnimState, AnimLayers>,
}

impl PlayerSprites {
    pub(crate) fn new(
        styles: &HashMap<String, AnimStyle>,
        style: &str,
    ) -> Result<Self, GameplayError> {
        let mut layers = HashMap::new();
        for state in AnimState::ALL {
            let anim = styles
                .get(state.dir_name())
                .ok_or(GameplayError::MissingAnimation {
                    state: state.dir_name(),
                })?;
            layers.insert(
                state,
                AnimLayers {
                    base: anim.base.clone(),
                    style: anim.variant(style).cloned(),
                    tools: anim.variant(TOOLS_VARIANT).cloned(),
                    frame_count: anim.frame_count,
                },
            );
        }
        Ok(Self { layers })
    }

    pub(crate) fn get(&self, state: AnimState) -> Option<&AnimLayers> {
        self.layers.get(&state)
    }

    /// Unscaled size of an idle frame.
    fn frame_size(&self) -> (f32, f32) {
        self.get(AnimState::Idle)
            .map(|layers| layers.base.frame_size())
            .unwrap_or_default()
    }
}

/// Which sprite layers a player draw call covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerLayers {
    Body,
    Tool,
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    /// Top-left of the sprite in world pixels.
    pub(crate) position: Vec2,
    pub(crate) size: Vec2,
    pub(crate) hitbox: Hitbox,
    pub(crate) facing_left: bool,
    pub(crate) tool: ToolKind,
    pub(crate) tool_counter: f32,
    pub(crate) anim_state: AnimState,
    animations: HashMap<AnimState, StripAnimation>,
}

impl Player {
    pub(crate) fn new(position: Vec2, sprites: &PlayerSprites, scale: f32, anim_speed: f32) -> Self {
        let (frame_width, frame_height) = sprites.frame_size();
        let size = Vec2::new(frame_width * scale, frame_height * scale);
        let animations = AnimState::ALL
            .into_iter()
            .filter_map(|state| {
                sprites
                    .get(state)
                    .map(|layers| (state, StripAnimation::new(layers.frame_count, anim_speed)))
            })
            .collect();
        Self {
            position,
            size,
            hitbox: Hitbox::centered_square(size, frame_width * HITBOX_WIDTH_RATIO),
            facing_left: false,
            tool: ToolKind::Water,
            tool_counter: 0.0,
            anim_state: AnimState::Idle,
            animations,
        }
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.position.add(self.size.scale(0.5))
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.tool_counter > 0.0
    }

    /// Point the held tool strikes: one tile ahead of the centre, a third of
    /// a tile down.
    pub(crate) fn tool_hit_point(&self, tile_size: f32) -> Vec2 {
        let reach = if self.facing_left { -tile_size } else { tile_size };
        self.center().add(Vec2::new(reach, tile_size / 3.0))
    }

    pub(crate) fn frame(&self) -> usize {
        self.animations
            .get(&self.anim_state)
            .map_or(0, StripAnimation::frame)
    }

    /// Switches animation, restarting it when the state changes.
    pub(crate) fn set_anim_state(&mut self, state: AnimState) {
        if self.anim_state == state {
            return;
        }
        self.anim_state = state;
        if let Some(animation) = self.animations.get_mut(&state) {
            animation.reset();
        }
    }

    pub(crate) fn animate(&mut self, dt: f32) {
        if let Some(animation) = self.animations.get_mut(&self.anim_state) {
            animation.update(dt);
        }
    }

    pub(crate) fn draw(
        &self,
        sprites: &PlayerSprites,
        canvas: &mut dyn Canvas,
        offset: Vec2,
        layers: PlayerLayers,
    ) {
        let Some(anim) = sprites.get(self.anim_state) else {
            return;
        };
        let origin = world_to_screen(self.position, offset);
        let dst = Rect::new(origin.x, origin.y, self.size.x, self.size.y);
        let frame = self.frame();
        let mut draw_sheet = |sheet: &StripSheet| {
            if let Some(src) = sheet.frame(frame.min(sheet.frame_count().saturating_sub(1))) {
                canvas.draw_texture(sheet.texture(), src, dst, self.facing_left);
            }
        };
        match layers {
            PlayerLayers::Body => {
                draw_sheet(&anim.base);
                if let Some(style) = &anim.style {
                    draw_sheet(style);
                }
            }
            PlayerLayers::Tool => {
                if let Some(tools) = &anim.tools {
                    draw_sheet(tools);
                }
            }
        }
    }
}

/// Seeds and harvested crops carried by the player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Inventory {
    seeds: BTreeMap<CropId, u32>,
    crops: BTreeMap<CropId, u32>,
    selected: Option<CropId>,
}

impl Inventory {
    pub(crate) fn with_seeds(stacks: impl IntoIterator<Item = (CropId, u32)>) -> Self {
        let mut inventory = Self::default();
        for (crop, count) in stacks {
            *inventory.seeds.entry(crop).or_default() += count;
        }
        inventory.selected = inventory.first_stocked_after(None);
        inventory
    }

    pub(crate) fn crop_count(&self, crop: CropId) -> u32 {
        self.crops.get(&crop).copied().unwrap_or_default()
    }

    /// Selected seed, if any are left of it.
    pub(crate) fn selected_seed(&self) -> Option<CropId> {
        self.selected.filter(|crop| self.seed_count(*crop) > 0)
    }

    /// Moves the selection to the next crop with seeds left, wrapping around.
    pub(crate) fn cycle_seed(&mut self) -> Option<CropId> {
        self.selected = self
            .first_stocked_after(self.selected)
            .or_else(|| self.first_stocked_after(None));
        self.selected
    }

    fn first_stocked_after(&self, after: Option<CropId>) -> Option<CropId> {
        self.seeds
            .iter()
            .filter(|(crop, count)| **count > 0 && after.map_or(true, |after| **crop > after))
            .map(|(crop, _)| *crop)
            .next()
    }
}

impl CropLedger for Inventory {
    fn seed_count(&self, crop: CropId) -> u32 {
        self.seeds.get(&crop).copied().unwrap_or_default()
    }

    fn take_seed(&mut self, crop: CropId) -> bool {
        match self.seeds.get_mut(&crop) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    fn credit_harvest(&mut self, crop: CropId, quantity: u32) {
        *self.crops.entry(crop).or_default() += quantity;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FadeStep {
    Fading,
    /// Screen is fully dark; the day rolls over on this tick.
    Midpoint,
    Finished,
}

/// Fade out, advance the day, fade back in. Counted in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DayTransition {
    elapsed: u32,
    total: u32,
}

impl DayTransition {
    pub(crate) fn new(total: u32) -> Self {
        Self {
            elapsed: 0,
            total: total.max(2),
        }
    }

    pub(crate) fn tick(&mut self) -> FadeStep {
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed >= self.total {
            FadeStep::Finished
        } else if self.elapsed == self.total / 2 {
            FadeStep::Midpoint
        } else {
            FadeStep::Fading
        }
    }

    /// Overlay opacity: ramps to opaque at the midpoint and back.
    pub(crate) fn alpha(&self) -> u8 {
        let half = (self.total / 2) as f32;
        let elapsed = self.elapsed as f32;
        let level = if elapsed <= half {
            elapsed / half
        } else {
            (self.total as f32 - elapsed) / (self.total as f32 - half)
        };
        (level.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpriteHandle {
    /// Index into the map's remaining decorative objects.
    Object(usize),
    Player,
}

/// Everything the depth pass can draw, owned in one place so sprite handles
/// stay valid across frames.
pub(crate) struct FarmWorld {
    pub(crate) map: TileMap,
    pub(crate) tileset: Tileset,
    pub(crate) walls: Vec<Tile>,
    pub(crate) trunks: Vec<Rect>,
    pub(crate) player: Player,
    pub(crate) sprites: PlayerSprites,
    pub(crate) visuals: FarmVisuals,
}

impl DepthScene for FarmWorld {
    type Handle = SpriteHandle;

    fn anchor_y(&self, handle: SpriteHandle) -> f32 {
        match handle {
            SpriteHandle::Object(index) => self
                .map
                .objects()
                .get(index)
                .map_or(0.0, |tile| tile.anchor_y(self.map.tile_size_f32())),
            SpriteHandle::Player => self.player.center().y,
        }
    }

    fn draw_sprite(&self, handle: SpriteHandle, canvas: &mut dyn Canvas, offset: Vec2, _draw_roof: bool) {
        match handle {
            SpriteHandle::Object(index) => {
                if let Some(tile) = self.map.objects().get(index) {
                    self.map.draw_tile(&self.tileset, canvas, tile, offset);
                }
            }
            SpriteHandle::Player => {
                self.player
                    .draw(&self.sprites, canvas, offset, PlayerLayers::Body);
                if !self.player.is_busy() {
                    self.player
                        .draw(&self.sprites, canvas, offset, PlayerLayers::Tool);
                }
            }
        }
    }
}

/// Decoded assets the scene is built from.
pub(crate) struct GameAssets {
    pub(crate) map: TileMap,
    pub(crate) tileset: Tileset,
    pub(crate) anim_styles: HashMap<String, AnimStyle>,
    pub(crate) crop_strips: HashMap<String, StripSheet>,
    pub(crate) soil: Option<Texture>,
    pub(crate) tool_icons: HashMap<ToolKind, Texture>,
}

pub(crate) struct GameplayScene {
    config: GameConfig,
    world: FarmWorld,
    depth: DepthRenderer<SpriteHandle>,
    catalog: CropCatalog,
    inventory: Inventory,
    tool_icons: HashMap<ToolKind, Texture>,
    camera: Vec2,
    viewport: Viewport,
    day: u32,
    transition: Option<DayTransition>,
    metrics: MetricsHandle,
}
