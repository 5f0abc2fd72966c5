pub mod actor;
pub mod config;
pub mod error;
pub mod grid;
pub mod movement;
pub mod pathfinding;
pub mod point;
pub mod scene;

pub use actor::{Actor, Animation, Facing};
pub use config::Config;
pub use error::NavError;
pub use grid::NavigationGrid;
pub use movement::{MovementController, MovementGoal, MovementOutcome, MovementState};
pub use pathfinding::Pathfinder;
pub use point::Point;
pub use scene::{GridScene, Scene};
