#![allow(dead_code)]

use scene_nav::NavigationGrid;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Grid parsed from the text layout format
/// Format:
/// - S: start cell
/// - D: destination cell
/// - ■: blocked cell
/// - □ or .: free cell
pub struct Layout {
    pub grid: NavigationGrid,
    pub start: Option<(i32, i32)>,
    pub dest: Option<(i32, i32)>,
}

pub fn parse_layout<S: AsRef<str>>(lines: &[S], cell_size: f32) -> Layout {
    let rows = lines.len() as i32;
    let cols = lines.first().map_or(0, |l| l.as_ref().chars().count()) as i32;

    let mut grid = NavigationGrid::new(cols, rows, cell_size);
    let mut start = None;
    let mut dest = None;

    for (y, line) in lines.iter().enumerate() {
        for (x, ch) in line.as_ref().chars().enumerate() {
            let (x, y) = (x as i32, y as i32);
            match ch {
                '■' => grid.set_walkable(x, y, false),
                'S' => start = Some((x, y)),
                'D' => dest = Some((x, y)),
                _ => {}
            }
        }
    }

    Layout { grid, start, dest }
}

/// Golden path fixture pinning the exact cells A* returns
#[derive(Debug, Deserialize)]
pub struct GoldenPath {
    pub name: String,
    pub allow_diagonal: bool,
    pub layout: Vec<String>,
    pub expected_cells: Option<Vec<(i32, i32)>>,
    pub expected_cost: Option<f64>,
}

pub fn load_golden_paths(path: &Path) -> Result<Vec<GoldenPath>, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let fixtures: Vec<GoldenPath> = serde_json::from_str(&contents)?;
    Ok(fixtures)
}

/// Visualize a cell path on a grid
pub fn visualize_path(grid: &NavigationGrid, path: &[(i32, i32)], start: (i32, i32), dest: (i32, i32)) -> String {
    let mut result = String::new();

    for y in 0..grid.rows() {
        for x in 0..grid.cols() {
            let symbol = if (x, y) == start {
                'S'
            } else if (x, y) == dest {
                'D'
            } else if path.contains(&(x, y)) {
                '*'
            } else if !grid.is_walkable(x, y) {
                '■'
            } else {
                '□'
            };
            result.push(symbol);
        }
        result.push('\n');
    }

    result
}
