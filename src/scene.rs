use serde::Deserialize;
use std::borrow::Cow;

use crate::config::Config;
use crate::grid::NavigationGrid;
use crate::pathfinding::Pathfinder;
use crate::point::Point;

/// What a [`MovementController`](crate::movement::MovementController) needs from the scene it walks in
///
/// Read-only by construction: nothing here can change the scene.
pub trait Scene {
    /// Waypoints from `start` to `end`, or `None` when no route exists
    fn find_path(&self, start: Point, end: Point) -> Option<Vec<Point>>;

    fn is_walkable(&self, position: Point) -> bool;

    /// Where an actor moving from `old` towards `new` is allowed to end up
    fn constrain_to_walkable(&self, old: Point, new: Point) -> Point;

    /// Perspective scale factor for an actor standing at height `y`
    fn character_scale(&self, y: f32) -> f32;
}

/// A walkable polygon in world space
#[derive(Debug, Clone, Deserialize)]
pub struct WalkableArea {
    pub points: Vec<Point>,
}

impl WalkableArea {
    pub fn new(points: Vec<Point>) -> Self {
        WalkableArea { points }
    }

    /// Even-odd point-in-polygon test
    pub fn contains(&self, p: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (self.points[i], self.points[j]);
            if (a.y > p.y) != (b.y > p.y) {
                let cross_x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// Horizontal band in which actor scale is interpolated from `scale_top` to `scale_bottom`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScaleZone {
    pub y_top: f32,
    pub y_bottom: f32,
    pub scale_top: f32,
    pub scale_bottom: f32,
}

impl ScaleZone {
    pub fn contains(&self, y: f32) -> bool {
        y >= self.y_top.min(self.y_bottom) && y <= self.y_top.max(self.y_bottom)
    }

    pub fn scale_at(&self, y: f32) -> f32 {
        let span = self.y_bottom - self.y_top;
        if span.abs() < f32::EPSILON {
            return self.scale_top;
        }
        let t = ((y - self.y_top) / span).clamp(0.0, 1.0);
        self.scale_top + (self.scale_bottom - self.scale_top) * t
    }
}

/// Scene backed by a [`NavigationGrid`], optional walkable polygons and scale zones
///
/// When polygons are present a point is walkable only if it lies inside one
/// of them and on a walkable cell.
#[derive(Debug, Clone)]
pub struct GridScene {
    grid: NavigationGrid,
    allow_diagonal: bool,
    walkable_areas: Vec<WalkableArea>,
    scale_zones: Vec<ScaleZone>,
}

impl GridScene {
    pub fn new(grid: NavigationGrid, allow_diagonal: bool) -> Self {
        GridScene {
            grid,
            allow_diagonal,
            walkable_areas: Vec::new(),
            scale_zones: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        GridScene {
            grid: NavigationGrid::from_config(&config.grid),
            allow_diagonal: config.pathfinding.allow_diagonal,
            walkable_areas: config.scene.walkable_areas.clone(),
            scale_zones: config.scene.scale_zones.clone(),
        }
    }

    pub fn with_walkable_area(mut self, area: WalkableArea) -> Self {
        self.walkable_areas.push(area);
        self
    }

    pub fn with_scale_zone(mut self, zone: ScaleZone) -> Self {
        self.scale_zones.push(zone);
        self
    }

    pub fn grid(&self) -> &NavigationGrid {
        &self.grid
    }

    /// Mutable grid access for scene loading and editing
    pub fn grid_mut(&mut self) -> &mut NavigationGrid {
        &mut self.grid
    }

    pub fn allow_diagonal(&self) -> bool {
        self.allow_diagonal
    }

    pub fn set_allow_diagonal(&mut self, allow: bool) {
        self.allow_diagonal = allow;
    }

    /// The grid A* searches: cells whose center lies outside every walkable polygon are blocked
    pub fn search_grid(&self) -> Cow<'_, NavigationGrid> {
        if self.walkable_areas.is_empty() {
            return Cow::Borrowed(&self.grid);
        }

        let mut masked = self.grid.clone();
        for y in 0..masked.rows() {
            for x in 0..masked.cols() {
                if masked.is_walkable(x, y) && !self.in_walkable_area(masked.cell_center(x, y)) {
                    masked.set_walkable(x, y, false);
                }
            }
        }
        Cow::Owned(masked)
    }

    fn in_walkable_area(&self, position: Point) -> bool {
        self.walkable_areas.is_empty() || self.walkable_areas.iter().any(|a| a.contains(position))
    }
}

impl Scene for GridScene {
    fn find_path(&self, start: Point, end: Point) -> Option<Vec<Point>> {
        let grid = self.search_grid();
        Pathfinder::new(&grid, self.allow_diagonal).find_path(start.x, start.y, end.x, end.y)
    }

    fn is_walkable(&self, position: Point) -> bool {
        self.grid.is_walkable_world(&position) && self.in_walkable_area(position)
    }

    fn constrain_to_walkable(&self, old: Point, new: Point) -> Point {
        if self.is_walkable(new) {
            return new;
        }

        // Slide along whichever axis is still open
        let slide_x = Point::new(new.x, old.y);
        if slide_x != old && self.is_walkable(slide_x) {
            return slide_x;
        }
        let slide_y = Point::new(old.x, new.y);
        if slide_y != old && self.is_walkable(slide_y) {
            return slide_y;
        }

        old
    }

    fn character_scale(&self, y: f32) -> f32 {
        self.scale_zones
            .iter()
            .find(|zone| zone.contains(y))
            .map(|zone| zone.scale_at(y))
            .unwrap_or(1.0)
    }
}
