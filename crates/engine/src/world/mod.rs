mod grid;
mod map_data;
mod tilemap;
mod tileset;

pub use grid::{
    axis_cell_span, neighbourhood, visible_cell_range, Cell, CellLookup, CellRange, Rect, Vec2,
    NEIGHBOUR_OFFSETS,
};
pub use map_data::{
    LayerData, LayerObject, LayerProperty, MapDocument, MapError, OBJECT_LAYER_Z, Z_PROPERTY,
};
pub use tilemap::{
    LayerKind, Tile, TileLayer, TileMap, BED_LAYER, FARM_PLOT_LAYER, FLOATING_ROOF_TAGS,
    OBSTACLE_LAYER, ROOF_TAGS,
};
pub use tileset::Tileset;
