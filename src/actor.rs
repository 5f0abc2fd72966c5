use crate::point::Point;

/// Horizontal facing; sprite sets only distinguish left and right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a horizontal delta
    pub fn from_dx(dx: f32) -> Self {
        if dx < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

/// Animation cue for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    Idle(Facing),
    Walk(Facing),
}

impl Animation {
    /// Sprite-set key, e.g. `"walk_left"`
    pub fn name(&self) -> &'static str {
        match self {
            Animation::Idle(Facing::Left) => "idle_left",
            Animation::Idle(Facing::Right) => "idle_right",
            Animation::Walk(Facing::Left) => "walk_left",
            Animation::Walk(Facing::Right) => "walk_right",
        }
    }

    pub fn is_walking(&self) -> bool {
        matches!(self, Animation::Walk(_))
    }
}

impl Default for Animation {
    fn default() -> Self {
        Animation::Idle(Facing::default())
    }
}

/// Actor represents a movable character with precise floating-point positioning
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: usize,

    /// Floating-point position (feet of the actor)
    pub position: Point,

    /// Unscaled size of the actor's square
    pub size: f32,

    /// Walking speed in world units per second
    pub speed: f32,

    /// Current perspective scale
    pub scale: f32,

    /// When set, perspective scaling from the scene is ignored
    pub manual_scale: Option<f32>,

    pub facing: Facing,
    pub animation: Animation,

    /// Whether `move_to` uses pathfinding when the caller does not say
    pub use_pathfinding: bool,
}

impl Actor {
    /// Create a new actor at the given floating-point position
    pub fn new(id: usize, position: Point, size: f32, speed: f32) -> Self {
        Actor {
            id,
            position,
            size,
            speed,
            scale: 1.0,
            manual_scale: None,
            facing: Facing::default(),
            animation: Animation::default(),
            use_pathfinding: true,
        }
    }

    pub fn with_manual_scale(mut self, scale: f32) -> Self {
        self.manual_scale = Some(scale);
        self.scale = scale;
        self
    }

    pub fn with_pathfinding(mut self, use_pathfinding: bool) -> Self {
        self.use_pathfinding = use_pathfinding;
        self
    }

    /// Effective size after perspective scaling
    pub fn scaled_size(&self) -> f32 {
        self.size * self.scale
    }

    /// Get the corners of the actor's scaled square: (left, top, right, bottom)
    ///
    /// The position is the bottom-center of the square, where the actor stands.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let size = self.scaled_size();
        let half_size = size / 2.0;
        let left = self.position.x - half_size;
        let top = self.position.y - size;
        let right = self.position.x + half_size;
        let bottom = self.position.y;

        (left, top, right, bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_follow_scale() {
        let mut actor = Actor::new(0, Point::new(100.0, 200.0), 20.0, 50.0);
        assert_eq!(actor.bounds(), (90.0, 180.0, 110.0, 200.0));

        actor.scale = 0.5;
        assert_eq!(actor.bounds(), (95.0, 190.0, 105.0, 200.0));
    }

    #[test]
    fn test_manual_scale_sets_scale() {
        let actor = Actor::new(0, Point::new(0.0, 0.0), 10.0, 10.0).with_manual_scale(2.0);
        assert_eq!(actor.scale, 2.0);
        assert_eq!(actor.scaled_size(), 20.0);
    }

    #[test]
    fn test_animation_names() {
        assert_eq!(Animation::Walk(Facing::Left).name(), "walk_left");
        assert_eq!(Animation::default().name(), "idle_right");
        assert_eq!(Facing::from_dx(-0.1), Facing::Left);
        assert_eq!(Facing::from_dx(3.0), Facing::Right);
    }
}
