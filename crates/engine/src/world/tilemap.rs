use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::app::Canvas;
use crate::farm::{growth_frame, FarmPlots, FarmVisuals, PlotState};

use super::grid::{neighbourhood, visible_cell_range, Cell, CellRange, Rect, Vec2};
use super::map_data::{LayerData, MapDocument, MapError, OBJECT_LAYER_Z};
use super::tileset::Tileset;

pub const OBSTACLE_LAYER: &str = "obstacles";
pub const FARM_PLOT_LAYER: &str = "farm_tile";
pub const BED_LAYER: &str = "bed";

/// Roof object tags in draw priority order.
pub const ROOF_TAGS: [&str; 4] = [
    "house_roof_float",
    "house_roof_float_front",
    "house_roof",
    "house_roof_front",
];
/// Roof pieces drawn under the depth-sorted sprites instead of over them.
pub const FLOATING_ROOF_TAGS: [&str; 2] = ["house_roof_float", "house_roof_float_front"];

const MOIST_SOIL_TINT: [u8; 4] = [40, 24, 10, 90];

/// What a map layer contributes, decided once from its name and `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Obstacles,
    FarmPlots,
    Beds,
    Objects,
    Terrain,
}

impl LayerKind {
    pub fn classify(name: &str, z: i64) -> Self {
        match name {
            OBSTACLE_LAYER => LayerKind::Obstacles,
            FARM_PLOT_LAYER => LayerKind::FarmPlots,
            BED_LAYER => LayerKind::Beds,
            _ if z == OBJECT_LAYER_Z => LayerKind::Objects,
            _ => LayerKind::Terrain,
        }
    }
}

/// A placed tileset cell. `tag` is the name of the layer it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub variant: u32,
    pub tag: String,
    pub cell: Cell,
}

impl Tile {
    pub fn anchor_y(&self, tile_size: f32) -> f32 {
        self.cell.anchor_y(tile_size)
    }

    fn has_tag(&self, tags: &[&str]) -> bool {
        tags.contains(&self.tag.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TileLayer {
    pub name: String,
    pub tiles: HashMap<Cell, Tile>,
}

#[derive(Debug, Clone)]
pub struct TileMap {
    tile_size: u32,
    scale: u32,
    width: u32,
    height: u32,
    layers: Vec<TileLayer>,
    objects: Vec<Tile>,
    roofs: Vec<Tile>,
    obstacles: HashSet<Cell>,
    beds: HashSet<Cell>,
    plots: FarmPlots,
}

impl TileMap {
    /// Builds the world from a parsed document, scaling map tiles up to
    /// `tile_size` pixels.
    pub fn from_document(document: &MapDocument, tile_size: u32) -> Result<Self, MapError> {
        let source_size = document.tile_width;
        if tile_size == 0 || tile_size.checked_rem(source_size) != Some(0) {
            return Err(MapError::Scale {
                target: tile_size,
                source_size,
            });
        }

        let mut map = TileMap {
            tile_size,
            scale: tile_size / source_size,
            width: document.width,
            height: document.height,
            layers: Vec::new(),
            objects: Vec::new(),
            roofs: Vec::new(),
            obstacles: HashSet::new(),
            beds: HashSet::new(),
            plots: FarmPlots::default(),
        };

        let mut ordered: Vec<&LayerData> = document.layers.iter().collect();
        ordered.sort_by_key(|layer| layer.z());
        for layer in ordered {
            map.ingest_layer(layer);
        }

        let size = map.tile_size_f32();
        map.objects
            .sort_by(|a, b| a.anchor_y(size).total_cmp(&b.anchor_y(size)));

        map.roofs = map.extract_all(&ROOF_TAGS);
        map.roofs.sort_by(|a, b| {
            roof_priority(&a.tag)
                .cmp(&roof_priority(&b.tag))
                .then_with(|| a.anchor_y(size).total_cmp(&b.anchor_y(size)))
        });

        map.report_authoring_overlaps();
        info!(
            width = map.width,
            height = map.height,
            tile_size = map.tile_size,
            scale = map.scale,
            layers = map.layers.len(),
            objects = map.objects.len(),
            roofs = map.roofs.len(),
            obstacles = map.obstacles.len(),
            farm_plots = map.plots.len(),
            beds = map.beds.len(),
            "map_loaded"
        );
        Ok(map)
    }

    fn ingest_layer(&mut self, layer: &LayerData) {
        let kind = LayerKind::classify(&layer.name, layer.z());
        let mut tiles = HashMap::new();
        let width = self.width.max(1) as usize;

        for (index, &id) in layer.data.iter().enumerate() {
            if id == 0 {
                continue;
            }
            let cell = Cell::new((index % width) as i32, (index / width) as i32);
            match kind {
                LayerKind::Obstacles => {
                    self.obstacles.insert(cell);
                }
                LayerKind::FarmPlots => self.plots.insert_empty(cell),
                LayerKind::Beds => {
                    self.beds.insert(cell);
                }
                LayerKind::Objects => self.objects.push(Tile {
                    variant: id - 1,
                    tag: layer.name.clone(),
                    cell,
                }),
                LayerKind::Terrain => {
                    tiles.insert(
                        cell,
                        Tile {
                            variant: id - 1,
                            tag: layer.name.clone(),
                            cell,
                        },
                    );
                }
            }
        }

        if !tiles.is_empty() {
            self.layers.push(TileLayer {
                name: layer.name.clone(),
                tiles,
            });
        }
    }

    /// Farm plots that were also authored as obstacles.
    pub fn authoring_overlaps(&self) -> usize {
        self.plots
            .iter()
            .filter(|plot| self.obstacles.contains(&plot.cell))
            .count()
    }

    fn report_authoring_overlaps(&self) {
        let overlapping = self.authoring_overlaps();
        if overlapping > 0 {
            warn!(overlapping, "farm_plots_overlap_obstacles");
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn tile_size_f32(&self) -> f32 {
        self.tile_size as f32
    }

    /// Integer factor between map-document tiles and in-game tiles.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    /// Decorative objects still in the pool, sorted by anchor.
    pub fn objects(&self) -> &[Tile] {
        &self.objects
    }

    pub fn roofs(&self) -> &[Tile] {
        &self.roofs
    }

    pub fn obstacles(&self) -> &HashSet<Cell> {
        &self.obstacles
    }

    pub fn plots(&self) -> &FarmPlots {
        &self.plots
    }

    pub fn plots_mut(&mut self) -> &mut FarmPlots {
        &mut self.plots
    }

    pub fn is_bed(&self, cell: Cell) -> bool {
        self.beds.contains(&cell)
    }

    pub fn cell_at(&self, position: Vec2) -> Cell {
        Cell::containing(position, self.tile_size_f32())
    }

    /// Removes and returns the first pool object tagged `tag`.
    pub fn extract_one(&mut self, tag: &str) -> Option<Tile> {
        let index = self.objects.iter().position(|tile| tile.tag == tag)?;
        Some(self.objects.remove(index))
    }

    /// Removes and returns every pool object whose tag is in `tags`, keeping
    /// their relative order.
    pub fn extract_all(&mut self, tags: &[&str]) -> Vec<Tile> {
        let (taken, kept): (Vec<Tile>, Vec<Tile>) = std::mem::take(&mut self.objects)
            .into_iter()
            .partition(|tile| tile.has_tag(tags));
        self.objects = kept;
        taken
    }

    pub fn floating_roofs(&self) -> impl Iterator<Item = &Tile> {
        self.roofs
            .iter()
            .filter(|tile| tile.has_tag(&FLOATING_ROOF_TAGS))
    }

    pub fn obstacles_around(&self, position: Vec2) -> Vec<Rect> {
        neighbourhood(&self.obstacles, position, self.tile_size_f32())
    }

    pub fn farm_rects_around(&self, position: Vec2) -> Vec<Rect> {
        neighbourhood(&self.plots, position, self.tile_size_f32())
    }

    /// Whether any roof tile covers `cell`.
    pub fn roof_covers(&self, cell: Cell) -> bool {
        self.roofs.iter().any(|tile| tile.cell == cell)
    }

    pub fn visible_range(&self, offset: Vec2, viewport: Vec2) -> CellRange {
        visible_cell_range(offset, viewport, self.tile_size_f32())
    }

    pub fn draw_tile(&self, tileset: &Tileset, canvas: &mut dyn Canvas, tile: &Tile, offset: Vec2) {
        let Some(src) = tileset.source_rect(tile.variant) else {
            return;
        };
        let size = self.tile_size_f32();
        let origin = tile.cell.origin(size).sub(offset);
        canvas.draw_texture(
            tileset.texture(),
            src,
            Rect::new(origin.x, origin.y, size, size),
            false,
        );
    }

    pub fn draw_tiles<'a>(
        &self,
        tileset: &Tileset,
        canvas: &mut dyn Canvas,
        tiles: impl IntoIterator<Item = &'a Tile>,
        offset: Vec2,
    ) {
        for tile in tiles {
            self.draw_tile(tileset, canvas, tile, offset);
        }
    }

    /// Grid layers in z order, limited to the cells inside the viewport.
    pub fn draw_terrain(
        &self,
        tileset: &Tileset,
        canvas: &mut dyn Canvas,
        offset: Vec2,
        viewport: Vec2,
    ) {
        let range = self.visible_range(offset, viewport);
        for layer in &self.layers {
            for cell in range.cells() {
                if let Some(tile) = layer.tiles.get(&cell) {
                    self.draw_tile(tileset, canvas, tile, offset);
                }
            }
        }
    }

    /// Tilled soil, moisture tint and growing crops for visible plots.
    pub fn draw_farm(
        &self,
        visuals: &FarmVisuals,
        canvas: &mut dyn Canvas,
        offset: Vec2,
        viewport: Vec2,
    ) {
        let range = self.visible_range(offset, viewport);
        let size = self.tile_size_f32();
        let scale = self.scale as f32;

        for plot in self.plots.iter().filter(|plot| range.contains(plot.cell)) {
            if plot.state == PlotState::Empty {
                continue;
            }
            let cell_rect = plot.cell.world_rect(size);
            let screen_center = cell_rect.center().sub(offset);

            if let Some(soil) = visuals.soil() {
                let w = soil.width() as f32 * scale;
                let h = soil.height() as f32 * scale;
                canvas.draw_texture(
                    soil,
                    soil.size_rect(),
                    Rect::new(screen_center.x - w * 0.5, screen_center.y - h * 0.5, w, h),
                    false,
                );
            }
            if plot.moist {
                canvas.fill_rect(
                    Rect::new(cell_rect.x - offset.x, cell_rect.y - offset.y, size, size),
                    MOIST_SOIL_TINT,
                );
            }

            let Some(crop) = plot.crop() else {
                continue;
            };
            let Some(sheet) = visuals.crop_sheet(crop) else {
                continue;
            };
            let frame = growth_frame(plot.age, sheet.frame_count());
            let Some(src) = sheet.frame(frame) else {
                continue;
            };
            let w = src.width * scale;
            let h = src.height * scale;
            let bottom = cell_rect.bottom() - offset.y;
            canvas.draw_texture(
                sheet.texture(),
                src,
                Rect::new(screen_center.x - w * 0.5, bottom - h, w, h),
                false,
            );
        }
    }

    /// Solid roofs over the depth-sorted sprites; floating pieces are drawn
    /// elsewhere.
    pub fn draw_roofs(&self, tileset: &Tileset, canvas: &mut dyn Canvas, offset: Vec2) {
        for tile in self
            .roofs
            .iter()
            .filter(|tile| !tile.has_tag(&FLOATING_ROOF_TAGS))
        {
            self.draw_tile(tileset, canvas, tile, offset);
        }
    }
}

fn roof_priority(tag: &str) -> usize {
    ROOF_TAGS
        .iter()
        .position(|candidate| *candidate == tag)
        .unwrap_or(ROOF_TAGS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Texture;
    use image::RgbaImage;
    use serde_json::{json, Value};
    use std::path::Path;

    fn document(layers: Value, width: u32, height: u32) -> MapDocument {
        let raw = json!({
            "tilewidth": 16,
            "tileheight": 16,
            "width": width,
            "height": height,
            "layers": layers,
        })
        .to_string();
        MapDocument::parse(&raw, Path::new("test.json")).expect("parse")
    }

    fn layer(name: &str, z: Option<i64>, data: Vec<u32>) -> Value {
        let properties = match z {
            Some(z) => json!([{ "name": "z", "value": z }]),
            None => json!([]),
        };
        json!({ "name": name, "data": data, "properties": properties })
    }

    #[derive(Default)]
    struct RecordingCanvas {
        draws: Vec<(Rect, Rect)>,
        fills: Vec<Rect>,
    }

    impl Canvas for RecordingCanvas {
        fn size(&self) -> (u32, u32) {
            (640, 480)
        }

        fn draw_texture(&mut self, _texture: &Texture, src: Rect, dst: Rect, _flip_x: bool) {
            self.draws.push((src, dst));
        }

        fn fill_rect(&mut self, dst: Rect, _color: [u8; 4]) {
            self.fills.push(dst);
        }

        fn clear(&mut self, _color: [u8; 4]) {}
    }

    fn tileset() -> Tileset {
        Tileset::from_texture(&Texture::from_image(RgbaImage::new(64, 64)), 3, 48)
            .expect("tileset")
    }

    #[test]
    fn obstacle_cell_becomes_collision_rect() {
        let mut data = vec![0; 36];
        data[4 * 6 + 3] = 1;
        let map = TileMap::from_document(&document(json!([layer("obstacles", None, data)]), 6, 6), 48)
            .expect("map");

        assert!(map.obstacles().contains(&Cell::new(3, 4)));
        assert!(map.layers().is_empty());
        assert!(map.objects().is_empty());
        let around = map.obstacles_around(Vec2::new(3.5 * 48.0, 4.5 * 48.0));
        assert_eq!(around, vec![Rect::new(144.0, 192.0, 48.0, 48.0)]);
    }

    #[test]
    fn terrain_cell_keeps_zero_based_variant() {
        let mut data = vec![0; 16];
        data[2 * 4..2 * 4 + 4].copy_from_slice(&[0, 0, 5, 0]);
        let map = TileMap::from_document(&document(json!([layer("ground", Some(0), data)]), 4, 4), 48)
            .expect("map");

        assert_eq!(map.layers().len(), 1);
        let tiles = &map.layers()[0].tiles;
        assert_eq!(tiles.len(), 1);
        let tile = tiles.get(&Cell::new(2, 2)).expect("tile at (2,2)");
        assert_eq!(tile.variant, 4);
        assert_eq!(tile.tag, "ground");
    }

    #[test]
    fn layers_are_ordered_by_z_with_stable_ties() {
        let layers = json!([
            layer("top", Some(3), vec![1]),
            layer("first", Some(0), vec![1]),
            layer("second", Some(0), vec![1]),
        ]);
        let map = TileMap::from_document(&document(layers, 1, 1), 48).expect("map");
        let names: Vec<&str> = map.layers().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "top"]);
    }

    #[test]
    fn layer_without_z_is_an_object_layer() {
        let layers = json!([
            layer("fence", None, vec![0, 0, 2, 0, 0, 0, 0, 0, 3]),
            layer("bush", Some(-1), vec![4, 0, 0, 0, 0, 0, 0, 0, 0]),
        ]);
        let map = TileMap::from_document(&document(layers, 3, 3), 48).expect("map");
        assert!(map.layers().is_empty());
        let anchors: Vec<(String, Cell)> = map
            .objects()
            .iter()
            .map(|t| (t.tag.clone(), t.cell))
            .collect();
        assert_eq!(
            anchors,
            vec![
                ("fence".to_string(), Cell::new(2, 0)),
                ("bush".to_string(), Cell::new(0, 0)),
                ("fence".to_string(), Cell::new(2, 2)),
            ]
        );
    }

    #[test]
    fn farm_and_bed_layers_divert_cells() {
        let layers = json!([
            layer("farm_tile", Some(0), vec![1, 1, 0, 0]),
            layer("bed", Some(0), vec![0, 0, 0, 7]),
        ]);
        let map = TileMap::from_document(&document(layers, 2, 2), 48).expect("map");
        assert!(map.layers().is_empty());
        assert_eq!(map.plots().len(), 2);
        assert!(map.plots().get(Cell::new(1, 0)).is_some());
        assert!(map.is_bed(Cell::new(1, 1)));
        assert!(!map.is_bed(Cell::new(0, 0)));
        assert_eq!(map.farm_rects_around(Vec2::new(10.0, 10.0)).len(), 2);
    }

    #[test]
    fn roofs_are_pulled_out_in_priority_order() {
        let layers = json!([
            layer("house_roof", None, vec![1, 0, 0, 0]),
            layer("house_roof_float", None, vec![0, 0, 1, 0]),
            layer("tree", None, vec![0, 1, 0, 0]),
        ]);
        let map = TileMap::from_document(&document(layers, 2, 2), 48).expect("map");
        let tags: Vec<&str> = map.roofs().iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["house_roof_float", "house_roof"]);
        assert_eq!(map.objects().len(), 1);
        assert_eq!(map.floating_roofs().count(), 1);
        assert!(map.roof_covers(Cell::new(0, 0)));
    }

    #[test]
    fn extract_one_removes_first_match_only() {
        let layers = json!([layer("player", None, vec![1, 0, 1, 0])]);
        let mut map = TileMap::from_document(&document(layers, 2, 2), 48).expect("map");
        let spawn = map.extract_one("player").expect("spawn");
        assert_eq!(spawn.cell, Cell::new(0, 0));
        assert_eq!(map.objects().len(), 1);
        assert!(map.extract_one("missing").is_none());
        assert_eq!(map.extract_all(&["player"]).len(), 1);
        assert!(map.objects().is_empty());
    }

    #[test]
    fn non_integer_scale_is_rejected() {
        let err = TileMap::from_document(&document(json!([]), 1, 1), 40).expect_err("scale");
        assert!(matches!(err, MapError::Scale { target: 40, source_size: 16 }));
    }

    #[test]
    fn draw_terrain_visits_only_visible_cells() {
        let map = TileMap::from_document(
            &document(json!([layer("ground", Some(0), vec![1; 100])]), 10, 10),
            48,
        )
        .expect("map");
        let mut canvas = RecordingCanvas::default();
        map.draw_terrain(&tileset(), &mut canvas, Vec2::new(0.0, 0.0), Vec2::new(96.0, 96.0));
        // columns/rows 0..=3, including the margin cell
        assert_eq!(canvas.draws.len(), 16);
        assert_eq!(canvas.draws[0].1, Rect::new(0.0, 0.0, 48.0, 48.0));
    }

    #[test]
    fn draw_roofs_skips_floating_pieces() {
        let layers = json!([
            layer("house_roof_front", None, vec![1, 0]),
            layer("house_roof_float", None, vec![0, 1]),
        ]);
        let map = TileMap::from_document(&document(layers, 2, 1), 48).expect("map");
        let mut canvas = RecordingCanvas::default();
        map.draw_roofs(&tileset(), &mut canvas, Vec2::new(48.0, 0.0));
        assert_eq!(canvas.draws.len(), 1);
        assert_eq!(canvas.draws[0].1, Rect::new(-48.0, 0.0, 48.0, 48.0));
    }

    #[test]
    fn moist_plots_are_tinted() {
        let layers = json!([layer("farm_tile", Some(0), vec![1, 1])]);
        let mut map = TileMap::from_document(&document(layers, 2, 1), 48).expect("map");
        map.plots_mut().till(Cell::new(0, 0)).expect("till");
        map.plots_mut().water(Cell::new(0, 0)).expect("water");
        let mut canvas = RecordingCanvas::default();
        map.draw_farm(
            &FarmVisuals::default(),
            &mut canvas,
            Vec2::ZERO,
            Vec2::new(96.0, 48.0),
        );
        assert_eq!(canvas.fills, vec![Rect::new(0.0, 0.0, 48.0, 48.0)]);
    }

    #[test]
    fn plot_authored_on_obstacle_is_counted() {
        let layers = json!([
            layer("obstacles", Some(0), vec![0, 1, 1]),
            layer("farm_tile", Some(0), vec![1, 1, 0]),
        ]);
        let map = TileMap::from_document(&document(layers, 3, 1), 48).expect("map");
        assert_eq!(map.authoring_overlaps(), 1);
        assert_eq!(map.plots().len(), 2);
    }

    #[test]
    fn disjoint_obstacles_and_plots_have_no_overlap() {
        let layers = json!([
            layer("obstacles", Some(0), vec![1, 0, 0]),
            layer("farm_tile", Some(0), vec![0, 1, 1]),
        ]);
        let map = TileMap::from_document(&document(layers, 3, 1), 48).expect("map");
        assert_eq!(map.authoring_overlaps(), 0);
    }

    #[test]
    fn hand_built_document_with_zero_tile_width_is_rejected() {
        let document = MapDocument {
            tile_width: 0,
            tile_height: 0,
            width: 1,
            height: 1,
            layers: Vec::new(),
        };
        let err = TileMap::from_document(&document, 48).expect_err("zero source size");
        assert!(matches!(
            err,
            MapError::Scale {
                target: 48,
                source_size: 0
            }
        ));
    }
}
