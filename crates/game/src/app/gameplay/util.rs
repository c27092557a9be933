/// Map obstacles plus tree trunks around `center`.
fn obstacles_near(map: &TileMap, trunks: &[Rect], center: Vec2) -> Vec<Rect> {
    let reach = map.tile_size_f32() * 2.0;
    let mut rects = map.obstacles_around(center);
    rects.extend(
        trunks
            .iter()
            .filter(|trunk| trunk.center().sub(center).length() <= reach)
            .copied(),
    );
    rects
}

/// Collision rectangles for trees: the lower-centre of each tree's bottom
/// cell.
fn tree_trunks(objects: &[Tile], tile_size: f32) -> Vec<Rect> {
    let trees: Vec<&Tile> = objects
        .iter()
        .filter(|tile| tile.tag.starts_with(TREE_TAG_PREFIX))
        .collect();
    trees
        .iter()
        .filter(|tile| {
            let below = tile.cell.offset(0, 1);
            !trees
                .iter()
                .any(|other| other.tag == tile.tag && other.cell == below)
        })
        .map(|tile| {
            let origin = tile.cell.origin(tile_size);
            let width = tile_size * TRUNK_WIDTH_RATIO;
            let height = tile_size * TRUNK_HEIGHT_RATIO;
            Rect::new(
                origin.x + (tile_size - width) * 0.5,
                origin.y + tile_size - height,
                width,
                height,
            )
        })
        .collect()
}
