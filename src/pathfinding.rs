use log::trace;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::grid::NavigationGrid;
use crate::point::Point;

const ORTHOGONAL_COST: f64 = 1.0;
const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

/// Expansion order: east, south, west, north
static ORTHOGONAL_STEPS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
/// Expansion order after the orthogonal steps: SE, SW, NW, NE
static DIAGONAL_STEPS: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// A frontier entry in the A* open set
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    cell: usize,
    /// g + h
    priority: f64,
    /// Push order, breaks priority ties first-in first-out
    order: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other.priority.total_cmp(&self.priority)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// A* search over a [`NavigationGrid`]
///
/// The pathfinder only ever borrows the grid immutably; the neighbor rule
/// (4- or 8-connected) is fixed at construction.
pub struct Pathfinder<'a> {
    grid: &'a NavigationGrid,
    allow_diagonal: bool,
}

impl<'a> Pathfinder<'a> {
    pub fn new(grid: &'a NavigationGrid, allow_diagonal: bool) -> Self {
        Pathfinder { grid, allow_diagonal }
    }

    pub fn allow_diagonal(&self) -> bool {
        self.allow_diagonal
    }

    /// Find a world-space path between two world positions
    ///
    /// Returns the centers of every cell on the path, start cell included.
    /// `None` means there is no route: a blocked or out-of-grid destination,
    /// a start outside the grid, or a destination walled off from the start.
    pub fn find_path(&self, start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> Option<Vec<Point>> {
        if ![start_x, start_y, end_x, end_y].iter().all(|v| v.is_finite()) {
            trace!("[find_path] non-finite endpoint, no path");
            return None;
        }

        let start = self.grid.world_to_grid(start_x, start_y);
        let end = self.grid.world_to_grid(end_x, end_y);

        let cells = self.find_cell_path(start, end)?;
        Some(
            cells
                .iter()
                .map(|&(col, row)| self.grid.cell_center(col, row))
                .collect(),
        )
    }

    /// Find the cell sequence from `start` to `end`, both inclusive
    pub fn find_cell_path(&self, start: (i32, i32), end: (i32, i32)) -> Option<Vec<(i32, i32)>> {
        let grid = self.grid;

        trace!(
            "[find_path] START: ({},{}) -> ({},{}), diagonal={}",
            start.0, start.1, end.0, end.1, self.allow_diagonal
        );

        let start_id = grid.index(start.0, start.1)?;
        if !grid.is_walkable(end.0, end.1) {
            trace!("[find_path] destination ({},{}) is blocked", end.0, end.1);
            return None;
        }
        let goal_id = grid.index(end.0, end.1)?;

        let count = grid.cell_count();
        let mut g_score = vec![f64::INFINITY; count];
        let mut parent: Vec<Option<usize>> = vec![None; count];
        let mut closed = vec![false; count];
        let mut open: BinaryHeap<OpenNode> = BinaryHeap::new();
        let mut order = 0u64;

        g_score[start_id] = 0.0;
        open.push(OpenNode {
            cell: start_id,
            priority: heuristic(start, end),
            order,
        });

        let mut expanded = 0usize;
        while let Some(node) = open.pop() {
            if closed[node.cell] {
                continue;
            }
            closed[node.cell] = true;
            expanded += 1;

            if node.cell == goal_id {
                let path = self.reconstruct(&parent, goal_id);
                trace!(
                    "[find_path] FOUND PATH: {} cells, cost={:.2}, expanded={}",
                    path.len(), g_score[goal_id], expanded
                );
                return Some(path);
            }

            let (x, y) = grid.coords(node.cell);
            let current_g = g_score[node.cell];

            for (dx, dy, cost) in self.steps() {
                let (nx, ny) = (x + dx, y + dy);
                if !grid.is_walkable(nx, ny) {
                    continue;
                }
                // No corner cutting: both orthogonal neighbours of a diagonal step must be open
                if dx != 0 && dy != 0 && !(grid.is_walkable(x + dx, y) && grid.is_walkable(x, y + dy)) {
                    continue;
                }

                let Some(next) = grid.index(nx, ny) else { continue };
                if closed[next] {
                    continue;
                }

                let tentative = current_g + cost;
                if tentative < g_score[next] {
                    g_score[next] = tentative;
                    parent[next] = Some(node.cell);
                    order += 1;
                    open.push(OpenNode {
                        cell: next,
                        priority: tentative + heuristic((nx, ny), end),
                        order,
                    });
                }
            }
        }

        trace!("[find_path] NO PATH FOUND after expanding {} cells", expanded);
        None
    }

    fn steps(&self) -> impl Iterator<Item = (i32, i32, f64)> {
        let diagonal: &'static [(i32, i32)] = if self.allow_diagonal { &DIAGONAL_STEPS } else { &[] };
        ORTHOGONAL_STEPS
            .iter()
            .map(|&(dx, dy)| (dx, dy, ORTHOGONAL_COST))
            .chain(diagonal.iter().map(|&(dx, dy)| (dx, dy, DIAGONAL_COST)))
    }

    fn reconstruct(&self, parent: &[Option<usize>], goal: usize) -> Vec<(i32, i32)> {
        let mut path = vec![self.grid.coords(goal)];
        let mut current = goal;
        while let Some(previous) = parent[current] {
            path.push(self.grid.coords(previous));
            current = previous;
        }
        path.reverse();
        path
    }
}

/// Euclidean distance in cell units
fn heuristic(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = (from.0 - to.0) as f64;
    let dy = (from.1 - to.1) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Total step cost of a cell path (1 per orthogonal step, sqrt(2) per diagonal)
pub fn path_cost(cells: &[(i32, i32)]) -> f64 {
    cells
        .windows(2)
        .map(|pair| heuristic(pair[0], pair[1]))
        .sum()
}

/// Format path for display
pub fn format_path(path: &[Point]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    path.iter()
        .map(|p| format!("({:.1},{:.1})", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_node_pops_lowest_priority_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenNode { cell: 1, priority: 5.0, order: 0 });
        heap.push(OpenNode { cell: 2, priority: 3.0, order: 2 });
        heap.push(OpenNode { cell: 3, priority: 3.0, order: 1 });

        assert_eq!(heap.pop().map(|n| n.cell), Some(3));
        assert_eq!(heap.pop().map(|n| n.cell), Some(2));
        assert_eq!(heap.pop().map(|n| n.cell), Some(1));
    }

    #[test]
    fn test_same_cell_gives_single_waypoint() {
        let grid = NavigationGrid::new(4, 4, 10.0);
        let path = Pathfinder::new(&grid, true).find_path(12.0, 13.0, 18.0, 11.0).unwrap();
        assert_eq!(path, vec![Point::new(15.0, 15.0)]);
    }

    #[test]
    fn test_straight_corridor() {
        let grid = NavigationGrid::new(5, 1, 10.0);
        let cells = Pathfinder::new(&grid, false).find_cell_path((0, 0), (4, 0)).unwrap();
        assert_eq!(cells, vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        assert_eq!(path_cost(&cells), 4.0);
    }

    #[test]
    fn test_blocked_destination_has_no_path() {
        let grid = NavigationGrid::with_blocked(5, 5, 10.0, &[(3, 3)]);
        assert!(Pathfinder::new(&grid, true).find_cell_path((0, 0), (3, 3)).is_none());
    }

    #[test]
    fn test_start_outside_grid_has_no_path() {
        let grid = NavigationGrid::new(5, 5, 10.0);
        let finder = Pathfinder::new(&grid, true);
        assert!(finder.find_path(-5.0, 5.0, 25.0, 25.0).is_none());
        assert!(finder.find_path(f32::NAN, 5.0, 25.0, 25.0).is_none());
    }

    #[test]
    fn test_blocked_start_can_still_leave() {
        let grid = NavigationGrid::with_blocked(5, 1, 10.0, &[(0, 0)]);
        let cells = Pathfinder::new(&grid, false).find_cell_path((0, 0), (2, 0)).unwrap();
        assert_eq!(cells, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_diagonal_does_not_cut_corners() {
        // .#
        // ..
        let grid = NavigationGrid::with_blocked(2, 2, 10.0, &[(1, 0)]);
        let cells = Pathfinder::new(&grid, true).find_cell_path((0, 0), (1, 1)).unwrap();
        // (0,0)->(1,1) would squeeze past the blocked (1,0)
        assert_eq!(cells.len(), 3);
        assert_eq!(path_cost(&cells), 2.0);
    }

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(&[]), "No path");
        assert_eq!(
            format_path(&[Point::new(5.0, 5.0), Point::new(15.0, 5.0)]),
            "(5.0,5.0) -> (15.0,5.0)"
        );
    }
}
