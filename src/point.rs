use serde::{Deserialize, Serialize};

/// A position in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Move at most `max_step` towards `goal`, landing exactly on it instead of overshooting
    pub fn step_towards(&self, goal: &Point, max_step: f32) -> Point {
        let distance = self.distance(goal);
        if distance <= max_step || distance == 0.0 {
            return *goal;
        }

        let ratio = max_step / distance;
        Point::new(
            self.x + (goal.x - self.x) * ratio,
            self.y + (goal.y - self.y) * ratio,
        )
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_never_overshoots() {
        let start = Point::new(0.0, 0.0);
        let goal = Point::new(3.0, 4.0);

        assert_eq!(start.step_towards(&goal, 10.0), goal);

        let halfway = start.step_towards(&goal, 2.5);
        assert!((halfway.x - 1.5).abs() < 1e-5);
        assert!((halfway.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f32::INFINITY).is_finite());
    }
}
