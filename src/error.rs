use thiserror::Error;

/// Reasons a navigation request is refused
///
/// A refused request leaves the controller exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    #[error("target ({x}, {y}) is not a finite point inside the world bounds")]
    InvalidTarget { x: f32, y: f32 },
    #[error("waypoint list is empty")]
    EmptyPath,
    #[error("waypoint {index} at ({x}, {y}) is not a finite point inside the world bounds")]
    InvalidWaypoint { index: usize, x: f32, y: f32 },
    #[error("waypoint list has {count} points, limit is {max}")]
    TooManyWaypoints { count: usize, max: usize },
    #[error("speed {0} is outside the accepted range")]
    InvalidSpeed(f32),
}
