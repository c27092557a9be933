impl GameplayScene {
    fn draw_hud(&self, canvas: &mut dyn Canvas) {
        let scale = self.world.map.scale() as f32;
        let tile_size = self.tile_size();
        let top = self.viewport.height as f32 - HUD_BOTTOM_MARGIN;

        if let Some(icon) = self.tool_icons.get(&self.world.player.tool) {
            canvas.draw_texture(
                icon,
                icon.size_rect(),
                Rect::new(
                    tile_size,
                    top,
                    icon.width() as f32 * scale,
                    icon.height() as f32 * scale,
                ),
                false,
            );
        }

        let seed_sheet = self
            .inventory
            .selected_seed()
            .and_then(|crop| self.world.visuals.crop_sheet(crop));
        if let Some(sheet) = seed_sheet {
            let frame = SEED_ICON_FRAME.min(sheet.frame_count().saturating_sub(1));
            if let Some(src) = sheet.frame(frame) {
                canvas.draw_texture(
                    sheet.texture(),
                    src,
                    Rect::new(
                        tile_size * 2.5,
                        top,
                        src.width * scale,
                        src.height * scale,
                    ),
                    false,
                );
            }
        }

        if let Some(transition) = &self.transition {
            let size = self.viewport.size();
            canvas.fill_rect(
                Rect::new(0.0, 0.0, size.x, size.y),
                [0, 0, 0, transition.alpha()],
            );
        }
    }
}

impl Scene for GameplayScene {
    fn load(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.snap_camera();
        self.depth.sort_now(&self.world);
        info!(
            width = viewport.width,
            height = viewport.height,
            day = self.day,
            "farm_scene_loaded"
        );
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() || input.just_pressed(InputAction::Quit) {
            return SceneCommand::Quit;
        }
        let (width, height) = input.window_size();
        if width > 0 && height > 0 {
            self.viewport = Viewport::new(width, height);
        }

        if !self.update_transition() {
            self.handle_actions(input);
            self.update_player(fixed_dt_seconds, input);
        }
        self.follow_camera(fixed_dt_seconds);
        self.depth.update(&self.world);
        SceneCommand::None
    }

    fn render(&mut self, canvas: &mut dyn Canvas, viewport: Viewport) {
        self.viewport = viewport;
        let offset = self.camera;
        let world = &self.world;
        let map = &world.map;

        canvas.clear(CLEAR_COLOR);
        map.draw_terrain(&world.tileset, canvas, offset, viewport.size());
        map.draw_farm(&world.visuals, canvas, offset, viewport.size());
        map.draw_tiles(&world.tileset, canvas, &world.walls, offset);
        map.draw_tiles(&world.tileset, canvas, map.floating_roofs(), offset);

        let draw_roof = !self.roofs_hidden();
        self.depth.draw(world, canvas, offset, draw_roof);
        if world.player.is_busy() {
            world
                .player
                .draw(&world.sprites, canvas, offset, PlayerLayers::Tool);
        }
        if draw_roof {
            map.draw_roofs(&world.tileset, canvas, offset);
        }

        self.draw_hud(canvas);
    }

    fn unload(&mut self) {
        info!(day = self.day, "farm_scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let metrics = self.metrics.snapshot();
        let seed = self
            .inventory
            .selected_seed()
            .and_then(|crop| self.catalog.name(crop).map(|name| (name, self.inventory.seed_count(crop))));
        let seed = match seed {
            Some((name, count)) => format!("{name} x{count}"),
            None => "no seeds".to_string(),
        };
        Some(format!(
            "{} | Day {} | {} | {} | {:.0} fps",
            self.config.window_title,
            self.day,
            self.world.player.tool.name(),
            seed,
            metrics.fps,
        ))
    }
}
