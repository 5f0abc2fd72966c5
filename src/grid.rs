use log::warn;

use crate::config::GridConfig;
use crate::point::Point;

/// Cell size used in place of a non-positive or non-finite one
pub const MIN_CELL_SIZE: f32 = 1.0;

/// Walkability grid laid over world space
///
/// Cells outside `[0, cols) x [0, rows)` are always reported as blocked.
#[derive(Clone, Debug)]
pub struct NavigationGrid {
    cols: i32,
    rows: i32,
    cell_size: f32,
    walkable: Vec<bool>,
    /// Revision number - incremented whenever a cell changes
    revision: u64,
}

impl NavigationGrid {
    /// Create a new grid with every cell walkable
    ///
    /// Negative dimensions are treated as zero, and a non-positive or non-finite
    /// `cell_size` is replaced by [`MIN_CELL_SIZE`].
    pub fn new(cols: i32, rows: i32, cell_size: f32) -> Self {
        let cols = cols.max(0);
        let rows = rows.max(0);
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            warn!("Invalid cell size {}, clamping to {}", cell_size, MIN_CELL_SIZE);
            MIN_CELL_SIZE
        };

        NavigationGrid {
            cols,
            rows,
            cell_size,
            walkable: vec![true; (cols as usize) * (rows as usize)],
            revision: 0,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.cols, config.rows, config.cell_size)
    }

    /// Create a grid with specific blocked cells
    pub fn with_blocked(cols: i32, rows: i32, cell_size: f32, blocked: &[(i32, i32)]) -> Self {
        let mut grid = Self::new(cols, rows, cell_size);
        for &(x, y) in blocked {
            grid.set_walkable(x, y, false);
        }
        grid
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn world_width(&self) -> f32 {
        self.cols as f32 * self.cell_size
    }

    pub fn world_height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.cols && y >= 0 && y < self.rows
    }

    /// Convert in-bounds (x, y) coordinates to an index into the cell array
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((x + y * self.cols) as usize)
        } else {
            None
        }
    }

    /// Convert a cell index back to (x, y) coordinates
    pub fn coords(&self, index: usize) -> (i32, i32) {
        let cols = self.cols.max(1) as usize;
        ((index % cols) as i32, (index / cols) as i32)
    }

    pub fn cell_count(&self) -> usize {
        self.walkable.len()
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(id) => self.walkable[id],
            None => false, // Out of bounds is considered blocked
        }
    }

    /// Set cell walkability; out-of-bounds coordinates are ignored
    pub fn set_walkable(&mut self, x: i32, y: i32, value: bool) {
        if let Some(id) = self.index(x, y) {
            if self.walkable[id] != value {
                self.walkable[id] = value;
                self.revision += 1;
            }
        }
    }

    /// Apply `value` to every cell touched by a world-space rectangle, clipped to the grid
    pub fn set_rect_walkable(&mut self, world_x: f32, world_y: f32, world_w: f32, world_h: f32, value: bool) {
        let extents = [world_x, world_y, world_w, world_h];
        if extents.iter().any(|v| !v.is_finite()) || world_w <= 0.0 || world_h <= 0.0 {
            return;
        }

        let first_col = (world_x / self.cell_size).floor().max(0.0);
        let first_row = (world_y / self.cell_size).floor().max(0.0);
        // A rectangle ending exactly on a cell edge does not cover the next cell
        let last_col = ((world_x + world_w) / self.cell_size).ceil() - 1.0;
        let last_row = ((world_y + world_h) / self.cell_size).ceil() - 1.0;

        let last_col = last_col.min((self.cols - 1) as f32);
        let last_row = last_row.min((self.rows - 1) as f32);
        if last_col < first_col || last_row < first_row {
            return;
        }

        for y in first_row as i32..=last_row as i32 {
            for x in first_col as i32..=last_col as i32 {
                self.set_walkable(x, y, value);
            }
        }
    }

    /// World position to the cell containing it (floor division)
    pub fn world_to_grid(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Cell to the world position of its center
    pub fn grid_to_world(&self, col: i32, row: i32) -> (f32, f32) {
        let half = self.cell_size / 2.0;
        (
            col as f32 * self.cell_size + half,
            row as f32 * self.cell_size + half,
        )
    }

    pub fn cell_center(&self, col: i32, row: i32) -> Point {
        self.grid_to_world(col, row).into()
    }

    /// Whether a world position lies on the grid at all
    pub fn contains_world(&self, point: &Point) -> bool {
        point.is_finite()
            && point.x >= 0.0
            && point.y >= 0.0
            && point.x < self.world_width()
            && point.y < self.world_height()
    }

    pub fn is_walkable_world(&self, point: &Point) -> bool {
        if !point.is_finite() {
            return false;
        }
        let (x, y) = self.world_to_grid(point.x, point.y);
        self.is_walkable(x, y)
    }

    pub fn walkable_count(&self) -> usize {
        self.walkable.iter().filter(|&&w| w).count()
    }

    /// Get current grid revision number
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
