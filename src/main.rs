use arboard::Clipboard;
use log::{info, warn};
use macroquad::prelude::*;
use scene_nav::config::Config;
use scene_nav::movement::{MovementController, MovementGoal, MovementOutcome};
use scene_nav::scene::GridScene;
use scene_nav::{Actor, NavigationGrid, Point};

const BLOCKED: char = '■';
const FREE: char = '□';

/// Visualization state
struct DemoState {
    config: Config,
    scene: GridScene,
    controller: MovementController,
    use_pathfinding: bool,
}

impl DemoState {
    fn new(config: Config) -> Self {
        let scene = GridScene::from_config(&config);
        let cell_size = scene.grid().cell_size();
        let start = scene.grid().cell_center(1, 1);
        let actor = Actor::new(0, start, cell_size * 0.8, config.movement.default_speed);
        let controller = MovementController::new(actor, config.movement.clone());

        DemoState {
            config,
            scene,
            controller,
            use_pathfinding: true,
        }
    }

    fn mouse_cell(&self) -> Option<(i32, i32)> {
        let (mouse_x, mouse_y) = mouse_position();
        let (x, y) = self.scene.grid().world_to_grid(mouse_x, mouse_y);
        self.scene.grid().in_bounds(x, y).then_some((x, y))
    }

    fn toggle_cell(&mut self) {
        let Some((x, y)) = self.mouse_cell() else { return };
        let actor_cell = {
            let p = self.controller.actor().position;
            self.scene.grid().world_to_grid(p.x, p.y)
        };
        if actor_cell == (x, y) {
            return;
        }
        let grid = self.scene.grid_mut();
        let walkable = grid.is_walkable(x, y);
        grid.set_walkable(x, y, !walkable);
    }

    fn send_actor(&mut self) {
        let (mouse_x, mouse_y) = mouse_position();
        let target = Point::new(mouse_x, mouse_y);
        if !self.scene.grid().contains_world(&target) {
            return;
        }
        self.controller.on_complete(|outcome| match outcome {
            MovementOutcome::Arrived => info!("Actor arrived"),
            MovementOutcome::Cancelled => info!("Movement cancelled"),
            MovementOutcome::Aborted => warn!("Movement aborted"),
        });
        // Rejections are already logged by the controller
        let _ = self.controller.move_to(&self.scene, target, Some(self.use_pathfinding));
    }

    fn grid_to_string(&self) -> String {
        let grid = self.scene.grid();
        let mut result = String::new();

        for y in 0..grid.rows() {
            for x in 0..grid.cols() {
                result.push(if grid.is_walkable(x, y) { FREE } else { BLOCKED });
            }
            result.push('\n');
        }

        result
    }

    /// Replace the grid with a layout from text; the grid keeps its own size
    fn apply_layout(&mut self, text: &str) {
        let grid = self.scene.grid_mut();
        for (y, line) in text.lines().enumerate().take(grid.rows() as usize) {
            for (x, ch) in line.chars().enumerate().take(grid.cols() as usize) {
                grid.set_walkable(x as i32, y as i32, ch != BLOCKED);
            }
        }
        self.controller.stop_movement();
    }

    fn copy_to_clipboard(&self) {
        let grid_string = self.grid_to_string();
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(grid_string) {
                    warn!("Failed to copy to clipboard: {}", e);
                } else {
                    info!("Grid layout copied to clipboard!");
                    // Keep clipboard alive for a moment to ensure clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => warn!("Failed to access clipboard: {}", e),
        }
    }

    fn paste_from_clipboard(&mut self) {
        match Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
            Ok(text) => {
                self.apply_layout(&text);
                info!("Grid layout pasted from clipboard");
            }
            Err(e) => warn!("Failed to read clipboard: {}", e),
        }
    }

    fn handle_input(&mut self) {
        if is_mouse_button_pressed(MouseButton::Left) {
            self.toggle_cell();
        }
        if is_mouse_button_pressed(MouseButton::Right) {
            self.send_actor();
        }
        if is_key_pressed(KeyCode::P) {
            self.use_pathfinding = !self.use_pathfinding;
        }
        if is_key_pressed(KeyCode::D) {
            let allow = !self.scene.allow_diagonal();
            self.scene.set_allow_diagonal(allow);
        }
        if is_key_pressed(KeyCode::S) {
            self.controller.stop_movement();
        }
        if is_key_pressed(KeyCode::C) {
            self.copy_to_clipboard();
        }
        if is_key_pressed(KeyCode::V) {
            self.paste_from_clipboard();
        }
    }

    fn draw(&self) {
        let visual = &self.config.visual;
        clear_background(Color::from_rgba(visual.background_r, visual.background_g, visual.background_b, 255));

        let grid = self.scene.grid();
        let cell_size = grid.cell_size();
        for y in 0..grid.rows() {
            for x in 0..grid.cols() {
                let color = if grid.is_walkable(x, y) {
                    Color::from_rgba(60, 60, 60, 255)
                } else {
                    RED
                };
                draw_rectangle(
                    x as f32 * cell_size,
                    y as f32 * cell_size,
                    cell_size - 1.0,
                    cell_size - 1.0,
                    color,
                );
            }
        }

        if visual.show_path {
            self.draw_goal();
            if let Some(target) = self.controller.goal().target() {
                draw_circle_lines(target.x, target.y, cell_size / 3.0, 2.0, ORANGE);
            }
        }

        let actor = self.controller.actor();
        let (left, top, right, bottom) = actor.bounds();
        let color = if actor.animation.is_walking() { GREEN } else { BLUE };
        draw_rectangle(left, top, right - left, bottom - top, color);

        let info = format!(
            "Animation: {}  Scale: {:.2}  Remaining: {:.1}\nPathfinding (P): {}  Diagonal (D): {}\nLeft click: toggle wall  Right click: walk  S: stop  C/V: copy/paste grid  Esc: quit",
            actor.animation.name(),
            actor.scale,
            self.controller.distance_to_target(),
            self.use_pathfinding,
            self.scene.allow_diagonal(),
        );
        for (i, line) in info.lines().enumerate() {
            draw_text(line, 10.0, 20.0 + i as f32 * 20.0, 20.0, WHITE);
        }
    }

    fn draw_goal(&self) {
        let mut previous = self.controller.actor().position;
        let mut draw_leg = |to: Point| {
            draw_line(previous.x, previous.y, to.x, to.y, 2.0, YELLOW);
            previous = to;
        };

        match self.controller.goal() {
            MovementGoal::None => {}
            MovementGoal::Direct(target) => draw_leg(*target),
            MovementGoal::Path { waypoints, index, target } => {
                for waypoint in waypoints.iter().skip(*index) {
                    draw_leg(*waypoint);
                    draw_circle(waypoint.x, waypoint.y, 3.0, YELLOW);
                }
                draw_leg(*target);
            }
        }
    }
}

fn window_conf() -> Conf {
    let config = Config::load();
    let grid = NavigationGrid::from_config(&config.grid);
    Conf {
        window_title: config.visual.window_title.clone(),
        window_width: grid.world_width().max(640.0) as i32,
        window_height: grid.world_height().max(480.0) as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = Config::load();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    let mut state = DemoState::new(config);

    loop {
        state.handle_input();

        // Close window on Escape
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        state.controller.update(&state.scene, get_frame_time());
        state.draw();

        next_frame().await
    }
}
