impl GameplayScene {
    pub(crate) fn new(
        config: GameConfig,
        assets: GameAssets,
        metrics: MetricsHandle,
    ) -> Result<Self, GameplayError> {
        let GameAssets {
            mut map,
            tileset,
            anim_styles,
            crop_strips,
            soil,
            tool_icons,
        } = assets;
        let tile_size = map.tile_size_f32();

        let spawn = map
            .extract_one(PLAYER_SPAWN_TAG)
            .ok_or(GameplayError::MissingSpawn {
                tag: PLAYER_SPAWN_TAG,
            })?;
        let walls = map.extract_all(&[HOUSE_WALL_TAG]);
        let trunks = tree_trunks(map.objects(), tile_size);

        let sprites = PlayerSprites::new(&anim_styles, &config.player_style)?;
        let player = Player::new(
            spawn.cell.origin(tile_size),
            &sprites,
            map.scale() as f32,
            config.anim_speed,
        );

        let catalog = config.crop_catalog();
        let inventory = Inventory::with_seeds(
            config
                .starting_seeds
                .iter()
                .filter_map(|stack| catalog.id_of(&stack.crop).map(|id| (id, stack.count))),
        );
        let visuals = FarmVisuals::new(soil, crop_strips, &catalog);

        let mut depth = DepthRenderer::new(config.depth_sort_interval);
        for index in 0..map.objects().len() {
            depth.register(SpriteHandle::Object(index));
        }
        depth.register(SpriteHandle::Player);

        info!(
            objects = map.objects().len(),
            walls = walls.len(),
            trees = trunks.len(),
            plots = map.plots().len(),
            "farm_scene_built"
        );

        Ok(Self {
            config,
            world: FarmWorld {
                map,
                tileset,
                walls,
                trunks,
                player,
                sprites,
                visuals,
            },
            depth,
            catalog,
            inventory,
            tool_icons,
            camera: Vec2::ZERO,
            viewport: Viewport::default(),
            day: 1,
            transition: None,
            metrics,
        })
    }

    fn tile_size(&self) -> f32 {
        self.world.map.tile_size_f32()
    }

    /// Keeps the player's sprite origin at the middle of the view.
    fn camera_target(&self) -> Vec2 {
        self.world.player.position.sub(self.viewport.center())
    }

    fn snap_camera(&mut self) {
        self.camera = self.camera_target();
    }

    fn follow_camera(&mut self, dt: f32) {
        let target = self.camera_target();
        let step = self.config.camera_follow_rate * dt;
        self.camera = self.camera.add(target.sub(self.camera).scale(step));
    }

    /// Roofs are hidden while the player stands under one.
    fn roofs_hidden(&self) -> bool {
        let map = &self.world.map;
        map.roof_covers(map.cell_at(self.world.player.center()))
    }

    fn handle_actions(&mut self, input: &InputSnapshot) {
        if input.just_pressed(InputAction::CycleSeed) {
            let selected = self.inventory.cycle_seed();
            debug!(crop = ?selected.and_then(|id| self.catalog.name(id)), "seed_selected");
        }
        if self.world.player.is_busy() {
            return;
        }

        if input.just_pressed(InputAction::SwitchTool) {
            let player = &mut self.world.player;
            player.tool = player.tool.next();
            debug!(tool = player.tool.name(), "tool_switched");
        } else if input.just_pressed(InputAction::UseTool) {
            self.start_tool();
        } else if input.just_pressed(InputAction::Plant) {
            self.plant_selected();
        } else if input.just_pressed(InputAction::Harvest) {
            let point = self.world.player.tool_hit_point(self.tile_size());
            if let Some(FarmOutcome::Harvested { crop, .. }) = self.apply_action(FarmAction::Harvest, point) {
                info!(
                    crop = self.catalog.name(crop),
                    total = self.inventory.crop_count(crop),
                    "crop_harvested"
                );
            }
        } else if input.just_pressed(InputAction::Sleep) {
            self.try_sleep();
        }
    }

    /// Starts the current tool's swing if it has something to act on.
    fn start_tool(&mut self) {
        let tile_size = self.tile_size();
        let player = &self.world.player;
        let point = player.tool_hit_point(tile_size);
        let plots = self.world.map.plots();
        let target = plots
            .plot_near(point, self.config.interaction_radius, tile_size)
            .and_then(|cell| plots.get(cell));
        let usable = match player.tool {
            ToolKind::Shovel => target.is_some_and(|plot| plot.state == PlotState::Empty),
            ToolKind::Water => target.is_some(),
            ToolKind::Axe => true,
        };
        if !usable {
            debug!(tool = player.tool.name(), "tool_has_no_target");
            return;
        }

        let player = &mut self.world.player;
        player.tool_counter = self.config.tool_busy_duration;
        player.set_anim_state(AnimState::for_tool(player.tool));
    }

    fn plant_selected(&mut self) {
        let Some(crop) = self.inventory.selected_seed().or_else(|| self.inventory.cycle_seed()) else {
            debug!("no_seeds_to_plant");
            return;
        };
        let point = self.world.player.tool_hit_point(self.tile_size());
        self.apply_action(FarmAction::Plant(crop), point);
    }

    fn try_sleep(&mut self) {
        let map = &self.world.map;
        let cell = map.cell_at(self.world.player.center());
        if !map.is_bed(cell) {
            debug!(x = cell.x, y = cell.y, "sleep_needs_bed");
            return;
        }
        self.world.player.set_anim_state(AnimState::Idle);
        self.transition = Some(DayTransition::new(self.config.day_fade_ticks));
        info!(day = self.day, "sleep_started");
    }

    fn apply_action(&mut self, action: FarmAction, point: Vec2) -> Option<FarmOutcome> {
        match apply_farm_action(
            &mut self.world.map,
            action,
            point,
            self.config.interaction_radius,
            &self.catalog,
            &mut self.inventory,
        ) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                debug!(?action, error = %err, "farm_action_rejected");
                None
            }
        }
    }

    /// Moves or animates the player; finishes the tool swing when the busy
    /// counter runs out.
    fn update_player(&mut self, dt: f32, input: &InputSnapshot) {
        if self.world.player.is_busy() {
            let player = &mut self.world.player;
            player.tool_counter = (player.tool_counter - self.config.tool_tick_rate * dt).max(0.0);
            player.animate(dt);
            if player.tool_counter <= 0.0 && player.anim_state.is_tool() {
                let tool = player.tool;
                player.set_anim_state(AnimState::Idle);
                self.finish_tool(tool);
            }
            return;
        }

        let direction = input.movement();
        let resolver = MovementResolver::new(self.config.player_speed);
        let FarmWorld {
            map,
            trunks,
            player,
            ..
        } = &mut self.world;
        let (map, trunks) = (&*map, trunks.as_slice());
        if direction.x < 0.0 {
            player.facing_left = true;
        } else if direction.x > 0.0 {
            player.facing_left = false;
        }
        player.position = resolver.step(
            player.position,
            player.size,
            &player.hitbox,
            direction,
            dt,
            |center| obstacles_near(map, trunks, center),
        );
        let state = if direction == Vec2::ZERO {
            AnimState::Idle
        } else {
            AnimState::Walking
        };
        player.set_anim_state(state);
        player.animate(dt);
    }

    fn finish_tool(&mut self, tool: ToolKind) {
        let Some(action) = tool.farm_action() else {
            return;
        };
        let point = self.world.player.tool_hit_point(self.tile_size());
        self.apply_action(action, point);
    }

    /// Returns `true` while a fade is running and input should be ignored.
    fn update_transition(&mut self) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };
        match transition.tick() {
            FadeStep::Fading => {}
            FadeStep::Midpoint => {
                let point = self.world.player.center();
                if let Some(FarmOutcome::DayAdvanced(report)) = self.apply_action(FarmAction::AdvanceDay, point) {
                    self.day += 1;
                    info!(day = self.day, plots = report.plots, grown = report.grown, "day_advanced");
                }
            }
            FadeStep::Finished => self.transition = None,
        }
        true
    }
}
