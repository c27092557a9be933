use std::collections::{HashMap, HashSet};

/// World-space vector in pixels. `y` grows downward, matching screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return Vec2::ZERO;
        }
        Vec2 {
            x: self.x / length,
            y: self.y / length,
        }
    }

    pub fn add(self, other: Vec2) -> Self {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn sub(self, other: Vec2) -> Self {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn scale(self, factor: f32) -> Self {
        Vec2 {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Axis-aligned rectangle, top-left anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.width * 0.5,
            y: self.y + self.height * 0.5,
        }
    }

    /// Strict overlap: rectangles sharing only an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let nearest_x = center.x.clamp(self.x, self.right());
        let nearest_y = center.y.clamp(self.y, self.bottom());
        let dx = center.x - nearest_x;
        let dy = center.y - nearest_y;
        dx * dx + dy * dy <= radius * radius
    }
}

/// Integer (column, row) address of one tile-sized unit of the world grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing `position`, using floor division so negative positions
    /// land in negative cells.
    pub fn containing(position: Vec2, tile_size: f32) -> Self {
        Self {
            x: (position.x / tile_size).floor() as i32,
            y: (position.y / tile_size).floor() as i32,
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn origin(self, tile_size: f32) -> Vec2 {
        Vec2 {
            x: self.x as f32 * tile_size,
            y: self.y as f32 * tile_size,
        }
    }

    pub fn world_rect(self, tile_size: f32) -> Rect {
        let origin = self.origin(tile_size);
        Rect::new(origin.x, origin.y, tile_size, tile_size)
    }

    /// Vertical painter's-algorithm anchor: middle of the cell.
    pub fn anchor_y(self, tile_size: f32) -> f32 {
        self.y as f32 * tile_size + tile_size * 0.5
    }
}

/// Inclusive block of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_col: i32,
    pub end_col: i32,
    pub start_row: i32,
    pub end_row: i32,
}

impl CellRange {
    pub fn contains(&self, cell: Cell) -> bool {
        (self.start_col..=self.end_col).contains(&cell.x)
            && (self.start_row..=self.end_row).contains(&cell.y)
    }

    /// Row-major walk over every cell in the range.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.start_row..=self.end_row)
            .flat_map(move |y| (self.start_col..=self.end_col).map(move |x| Cell::new(x, y)))
    }
}

/// Cells spanned by `[start, end]` on one axis: floor of the start, floor of the
/// end plus one cell of margin so tiles never pop in at the boundary.
pub fn axis_cell_span(start: f32, end: f32, tile_size: f32) -> (i32, i32) {
    (
        floor_div(start, tile_size),
        floor_div(end, tile_size).saturating_add(1),
    )
}

pub fn visible_cell_range(offset: Vec2, viewport_size: Vec2, tile_size: f32) -> CellRange {
    let (start_col, end_col) = axis_cell_span(offset.x, offset.x + viewport_size.x, tile_size);
    let (start_row, end_row) = axis_cell_span(offset.y, offset.y + viewport_size.y, tile_size);
    CellRange {
        start_col,
        end_col,
        start_row,
        end_row,
    }
}

fn floor_div(value: f32, tile_size: f32) -> i32 {
    let quotient = value / tile_size;
    let truncated = quotient as i32;
    if quotient < 0.0 && (truncated as f32) != quotient {
        truncated - 1
    } else {
        truncated
    }
}

/// The 8 surrounding cells, then the cell itself.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (0, 0),
];

/// Sparse cell-keyed collection the neighbourhood query can probe.
pub trait CellLookup {
    fn has_cell(&self, cell: Cell) -> bool;
}

impl CellLookup for HashSet<Cell> {
    fn has_cell(&self, cell: Cell) -> bool {
        self.contains(&cell)
    }
}

impl<V> CellLookup for HashMap<Cell, V> {
    fn has_cell(&self, cell: Cell) -> bool {
        self.contains_key(&cell)
    }
}

/// World rectangles of the 3x3 block around `position` that exist in `cells`.
pub fn neighbourhood<L>(cells: &L, position: Vec2, tile_size: f32) -> Vec<Rect>
where
    L: CellLookup + ?Sized,
{
    let center = Cell::containing(position, tile_size);
    NEIGHBOUR_OFFSETS
        .iter()
        .map(|&(dx, dy)| center.offset(dx, dy))
        .filter(|cell| cells.has_cell(*cell))
        .map(|cell| cell.world_rect(tile_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_offset_starts_one_cell_left() {
        let range = visible_cell_range(Vec2::new(-10.0, 0.0), Vec2::new(100.0, 48.0), 48.0);
        assert_eq!(range.start_col, -1);
        assert_eq!(range.end_col, 2);
        assert_eq!(range.start_row, 0);
        assert_eq!(range.end_row, 2);
    }

    #[test]
    fn exact_negative_multiple_is_not_over_adjusted() {
        let (start, _) = axis_cell_span(-48.0, 0.0, 48.0);
        assert_eq!(start, -1);
    }

    #[test]
    fn visible_range_covers_requested_span() {
        let tile = 48.0;
        for offset in [-1000.5_f32, -97.0, -48.0, -1.0, 0.0, 13.0, 47.99, 480.0] {
            for size in [1.0_f32, 47.0, 48.0, 1280.0] {
                let (start, end) = axis_cell_span(offset, offset + size, tile);
                assert!(start as f32 * tile <= offset, "offset={offset} size={size}");
                assert!(
                    (end + 1) as f32 * tile >= offset + size,
                    "offset={offset} size={size}"
                );
            }
        }
    }

    #[test]
    fn cell_containing_uses_floor_for_negatives() {
        assert_eq!(Cell::containing(Vec2::new(-0.5, 47.9), 48.0), Cell::new(-1, 0));
        assert_eq!(Cell::containing(Vec2::new(96.0, -96.0), 48.0), Cell::new(2, -2));
    }

    #[test]
    fn neighbourhood_returns_only_present_cells() {
        let cells: HashSet<Cell> = [Cell::new(2, 2), Cell::new(3, 3), Cell::new(9, 9)]
            .into_iter()
            .collect();
        let rects = neighbourhood(&cells, Vec2::new(2.5 * 48.0, 2.5 * 48.0), 48.0);

        assert_eq!(
            rects,
            vec![
                Rect::new(144.0, 144.0, 48.0, 48.0),
                Rect::new(96.0, 96.0, 48.0, 48.0),
            ]
        );
    }

    #[test]
    fn neighbourhood_works_over_maps() {
        let mut cells = HashMap::new();
        cells.insert(Cell::new(0, 0), "plot");
        let rects = neighbourhood(&cells, Vec2::new(60.0, 60.0), 48.0);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 48.0, 48.0)]);
    }

    #[test]
    fn edge_contact_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rect::new(9.5, 9.5, 1.0, 1.0)));
    }

    #[test]
    fn circle_touching_rect_counts_as_hit() {
        let rect = Rect::new(48.0, 48.0, 48.0, 48.0);
        assert!(rect.intersects_circle(Vec2::new(44.0, 60.0), 5.0));
        assert!(!rect.intersects_circle(Vec2::new(40.0, 60.0), 5.0));
    }

    #[test]
    fn normalized_zero_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let unit = Vec2::new(3.0, 4.0).normalized();
        assert!((unit.length() - 1.0).abs() < 1e-6);
    }
}
