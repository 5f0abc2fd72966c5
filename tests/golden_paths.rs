mod common;

use common::{load_golden_paths, parse_layout, visualize_path};
use scene_nav::pathfinding::{path_cost, Pathfinder};
use std::path::Path;

#[test]
fn test_golden_paths() {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/golden_paths.json");
    let fixtures = load_golden_paths(&fixture_path).expect("Failed to load golden path fixtures");
    assert!(!fixtures.is_empty());

    for fixture in &fixtures {
        let layout = parse_layout(&fixture.layout, 10.0);
        let start = layout.start.unwrap_or_else(|| panic!("{}: layout has no S", fixture.name));
        let dest = layout.dest.unwrap_or_else(|| panic!("{}: layout has no D", fixture.name));

        let cells = Pathfinder::new(&layout.grid, fixture.allow_diagonal).find_cell_path(start, dest);

        if let Some(cells) = &cells {
            println!("{}:\n{}", fixture.name, visualize_path(&layout.grid, cells, start, dest));
        }

        assert_eq!(cells, fixture.expected_cells, "{}: cell sequence differs", fixture.name);

        match (&cells, fixture.expected_cost) {
            (Some(cells), Some(expected)) => {
                let cost = path_cost(cells);
                assert!(
                    (cost - expected).abs() < 1e-9,
                    "{}: cost {} expected {}",
                    fixture.name, cost, expected
                );
            }
            (None, None) => {}
            _ => panic!("{}: fixture cost and path disagree", fixture.name),
        }
    }
}

#[test]
fn test_golden_paths_through_world_coordinates() {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/golden_paths.json");
    let fixtures = load_golden_paths(&fixture_path).expect("Failed to load golden path fixtures");

    for fixture in fixtures.iter().filter(|f| f.expected_cells.is_some()) {
        let layout = parse_layout(&fixture.layout, 24.0);
        let (start, dest) = (layout.start.unwrap(), layout.dest.unwrap());
        let grid = &layout.grid;

        // Off-center points inside the start and destination cells
        let sx = start.0 as f32 * 24.0 + 3.0;
        let sy = start.1 as f32 * 24.0 + 20.0;
        let ex = dest.0 as f32 * 24.0 + 23.0;
        let ey = dest.1 as f32 * 24.0 + 1.0;

        let path = Pathfinder::new(grid, fixture.allow_diagonal)
            .find_path(sx, sy, ex, ey)
            .unwrap_or_else(|| panic!("{}: expected a path", fixture.name));

        let expected: Vec<_> = fixture
            .expected_cells
            .iter()
            .flatten()
            .map(|&(x, y)| grid.cell_center(x, y))
            .collect();
        assert_eq!(path, expected, "{}", fixture.name);
    }
}
