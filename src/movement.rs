use log::{debug, warn};
use std::cell::Cell;

use crate::actor::{Actor, Animation, Facing};
use crate::config::MovementConfig;
use crate::error::NavError;
use crate::point::Point;
use crate::scene::Scene;

/// A tick that covers less than this share of its intended step counts as stalled
const STALL_PROGRESS_RATIO: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    Idle,
    Walking,
}

/// Where the controller is currently heading
#[derive(Debug, Clone, PartialEq)]
pub enum MovementGoal {
    None,
    /// Straight towards a single point
    Direct(Point),
    /// Through `waypoints[index..]`, then on to `target`
    Path {
        waypoints: Vec<Point>,
        index: usize,
        target: Point,
    },
}

impl MovementGoal {
    /// The ultimate destination, if any
    pub fn target(&self) -> Option<Point> {
        match self {
            MovementGoal::None => None,
            MovementGoal::Direct(target) => Some(*target),
            MovementGoal::Path { target, .. } => Some(*target),
        }
    }

    /// The point currently being walked towards
    pub fn current_point(&self) -> Option<Point> {
        match self {
            MovementGoal::None => None,
            MovementGoal::Direct(target) => Some(*target),
            MovementGoal::Path { waypoints, index, target } => {
                Some(waypoints.get(*index).copied().unwrap_or(*target))
            }
        }
    }
}

/// How a movement episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementOutcome {
    /// Reached the target
    Arrived,
    /// `stop_movement` was called
    Cancelled,
    /// Stopped because the actor stalled or its state became invalid
    Aborted,
}

pub type CompletionCallback = Box<dyn FnOnce(MovementOutcome)>;

enum GoalStep {
    Toward(Point),
    Snap(Point),
    Arrived,
}

/// Per-actor movement state machine, ticked once per frame
///
/// The scene is passed into each call that needs it; the controller owns
/// its actor and nothing else.
pub struct MovementController {
    actor: Actor,
    config: MovementConfig,
    state: MovementState,
    goal: MovementGoal,
    /// Length of the path beyond the current waypoint
    cached_tail: Cell<Option<f32>>,
    stalled_ticks: u32,
    on_complete: Option<CompletionCallback>,
}

impl MovementController {
    pub fn new(actor: Actor, config: MovementConfig) -> Self {
        MovementController {
            actor,
            config: config.sanitized(),
            state: MovementState::Idle,
            goal: MovementGoal::None,
            cached_tail: Cell::new(None),
            stalled_ticks: 0,
            on_complete: None,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Direct access to the actor; any invalid values are caught on the next `update`
    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn goal(&self) -> &MovementGoal {
        &self.goal
    }

    pub fn is_moving(&self) -> bool {
        self.state == MovementState::Walking
    }

    pub fn is_following_path(&self) -> bool {
        matches!(self.goal, MovementGoal::Path { .. })
    }

    pub fn current_speed(&self) -> f32 {
        self.actor.speed
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<(), NavError> {
        if !speed.is_finite() || speed <= 0.0 || speed > self.config.max_speed {
            return self.reject(NavError::InvalidSpeed(speed));
        }
        self.actor.speed = speed;
        Ok(())
    }

    /// Register the callback fired when the current (or next) movement ends
    ///
    /// Replaces any callback still pending.
    pub fn on_complete(&mut self, callback: impl FnOnce(MovementOutcome) + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn has_pending_callback(&self) -> bool {
        self.on_complete.is_some()
    }

    /// Remaining travel distance: along the remaining waypoints in path mode
    pub fn distance_to_target(&self) -> f32 {
        let position = self.actor.position;
        match &self.goal {
            MovementGoal::None => 0.0,
            MovementGoal::Direct(target) => position.distance(target),
            MovementGoal::Path { waypoints, index, target } => match waypoints.get(*index) {
                Some(waypoint) => position.distance(waypoint) + self.tail_length(),
                None => position.distance(target),
            },
        }
    }

    /// Walk to `target`, through a scene path when pathfinding is requested
    ///
    /// `use_pathfinding` overrides the actor's own preference. When the scene
    /// has no path the actor walks straight at the target instead.
    pub fn move_to<S: Scene + ?Sized>(
        &mut self,
        scene: &S,
        target: Point,
        use_pathfinding: Option<bool>,
    ) -> Result<(), NavError> {
        if !self.point_is_sane(&target) {
            return self.reject(NavError::InvalidTarget { x: target.x, y: target.y });
        }

        self.begin_walking();

        let wants_path = use_pathfinding.unwrap_or(self.actor.use_pathfinding);
        self.goal = if wants_path {
            self.path_goal(scene, target)
                .unwrap_or(MovementGoal::Direct(target))
        } else {
            MovementGoal::Direct(target)
        };

        debug!(
            "actor {}: walking to ({:.1},{:.1}) {}",
            self.actor.id,
            target.x,
            target.y,
            if self.is_following_path() { "along path" } else { "directly" }
        );
        self.face_current_goal();
        Ok(())
    }

    /// Follow a path computed elsewhere; the last waypoint is the target
    pub fn move_along_path(&mut self, waypoints: Vec<Point>) -> Result<(), NavError> {
        if let Err(e) = self.validate_waypoints(&waypoints) {
            return self.reject(e);
        }
        let Some(&target) = waypoints.last() else {
            return self.reject(NavError::EmptyPath);
        };

        self.begin_walking();
        debug!("actor {}: following {} waypoints", self.actor.id, waypoints.len());
        self.goal = MovementGoal::Path { waypoints, index: 0, target };
        self.face_current_goal();
        Ok(())
    }

    /// Cancel any movement and fire the pending callback; safe to call at any time
    pub fn stop_movement(&mut self) {
        self.finish(MovementOutcome::Cancelled);
    }

    /// Advance the actor by one frame of `dt` seconds
    pub fn update<S: Scene + ?Sized>(&mut self, scene: &S, dt: f32) {
        if self.state != MovementState::Walking {
            return;
        }

        if !dt.is_finite() || dt < 0.0 {
            debug!("actor {}: ignoring delta time {}", self.actor.id, dt);
            return;
        }
        let dt = dt.min(self.config.max_delta_time);

        if let Some(problem) = self.runtime_problem() {
            warn!("actor {}: {}, stopping", self.actor.id, problem);
            self.finish(MovementOutcome::Aborted);
            return;
        }

        let goal = match self.advance_goal() {
            GoalStep::Toward(goal) => goal,
            GoalStep::Snap(target) if scene.is_walkable(target) => {
                self.actor.position = target;
                self.update_scale(scene);
                self.finish(MovementOutcome::Arrived);
                return;
            }
            GoalStep::Snap(target) => {
                debug!(
                    "actor {}: target ({:.1},{:.1}) is off the walkable area, approaching directly",
                    self.actor.id, target.x, target.y
                );
                self.goal = MovementGoal::Direct(target);
                self.invalidate_cache();
                target
            }
            GoalStep::Arrived => {
                self.finish(MovementOutcome::Arrived);
                return;
            }
        };

        self.face_towards(goal);

        let old = self.actor.position;
        let desired = old.step_towards(&goal, self.actor.speed * dt);
        let constrained = scene.constrain_to_walkable(old, desired);
        if !constrained.is_finite() {
            warn!("actor {}: position became non-finite, stopping", self.actor.id);
            self.finish(MovementOutcome::Aborted);
            return;
        }
        self.actor.position = constrained;

        let intended = desired.distance(&old);
        if intended > 0.0 && constrained.distance(&old) < intended * STALL_PROGRESS_RATIO {
            self.stalled_ticks += 1;
            if self.stalled_ticks >= self.config.max_stalled_ticks {
                warn!(
                    "actor {}: stuck at ({:.1},{:.1}) for {} ticks, giving up",
                    self.actor.id, old.x, old.y, self.stalled_ticks
                );
                self.finish(MovementOutcome::Aborted);
                return;
            }
        } else {
            self.stalled_ticks = 0;
        }

        self.update_scale(scene);
    }

    fn begin_walking(&mut self) {
        self.state = MovementState::Walking;
        self.goal = MovementGoal::None;
        self.stalled_ticks = 0;
        self.invalidate_cache();
    }

    fn finish(&mut self, outcome: MovementOutcome) {
        if self.state == MovementState::Walking {
            debug!("actor {}: movement ended ({:?})", self.actor.id, outcome);
        }
        self.state = MovementState::Idle;
        self.goal = MovementGoal::None;
        self.stalled_ticks = 0;
        self.invalidate_cache();
        self.actor.animation = Animation::Idle(self.actor.facing);

        if let Some(callback) = self.on_complete.take() {
            callback(outcome);
        }
    }

    /// Ask the scene for a path and turn it into a goal, if it is usable
    fn path_goal<S: Scene + ?Sized>(&self, scene: &S, target: Point) -> Option<MovementGoal> {
        let Some(mut waypoints) = scene.find_path(self.actor.position, target) else {
            debug!("actor {}: no path found, falling back to direct movement", self.actor.id);
            return None;
        };

        if let Err(e) = self.validate_waypoints(&waypoints) {
            warn!("actor {}: scene returned unusable path ({}), walking directly", self.actor.id, e);
            return None;
        }

        // Target in the actor's own cell, nothing to route around
        if waypoints.len() <= 1 {
            return None;
        }
        // The first waypoint is the center of the cell the actor already stands in
        waypoints.remove(0);

        Some(MovementGoal::Path { waypoints, index: 0, target })
    }

    /// Skip reached waypoints and report what to do this tick
    fn advance_goal(&mut self) -> GoalStep {
        let position = self.actor.position;
        let arrival = self.config.arrival_threshold;
        let waypoint_threshold = self.config.waypoint_threshold;

        match &mut self.goal {
            MovementGoal::None => GoalStep::Arrived,
            MovementGoal::Direct(target) => {
                if position.distance(target) <= arrival {
                    GoalStep::Arrived
                } else {
                    GoalStep::Toward(*target)
                }
            }
            MovementGoal::Path { waypoints, index, target } => {
                while let Some(waypoint) = waypoints.get(*index) {
                    let threshold = if *index + 1 == waypoints.len() { arrival } else { waypoint_threshold };
                    if position.distance(waypoint) > threshold {
                        return GoalStep::Toward(*waypoint);
                    }
                    *index += 1;
                    self.cached_tail.set(None);
                }

                if position.distance(target) <= arrival {
                    GoalStep::Arrived
                } else {
                    GoalStep::Snap(*target)
                }
            }
        }
    }

    fn face_current_goal(&mut self) {
        if let Some(goal) = self.goal.current_point() {
            self.face_towards(goal);
        }
    }

    /// Only a clear horizontal delta changes facing, to avoid flicker on near-vertical moves
    fn face_towards(&mut self, goal: Point) {
        let dx = goal.x - self.actor.position.x;
        if dx.abs() > self.config.direction_threshold {
            self.actor.facing = Facing::from_dx(dx);
        }
        self.actor.animation = Animation::Walk(self.actor.facing);
    }

    fn update_scale<S: Scene + ?Sized>(&mut self, scene: &S) {
        if self.actor.manual_scale.is_some() {
            return;
        }
        let scale = scene.character_scale(self.actor.position.y);
        if scale.is_finite() && scale > 0.0 {
            self.actor.scale = scale;
        }
    }

    fn tail_length(&self) -> f32 {
        if let Some(length) = self.cached_tail.get() {
            return length;
        }

        let length = match &self.goal {
            MovementGoal::Path { waypoints, index, target } => {
                let rest = waypoints.get(*index..).unwrap_or(&[]);
                let between: f32 = rest.windows(2).map(|pair| pair[0].distance(&pair[1])).sum();
                between + rest.last().map_or(0.0, |last| last.distance(target))
            }
            _ => 0.0,
        };
        self.cached_tail.set(Some(length));
        length
    }

    fn invalidate_cache(&self) {
        self.cached_tail.set(None);
    }

    fn point_is_sane(&self, point: &Point) -> bool {
        let range = self.config.world_min..=self.config.world_max;
        point.is_finite() && range.contains(&point.x) && range.contains(&point.y)
    }

    fn validate_waypoints(&self, waypoints: &[Point]) -> Result<(), NavError> {
        if waypoints.is_empty() {
            return Err(NavError::EmptyPath);
        }
        if waypoints.len() > self.config.max_waypoints {
            return Err(NavError::TooManyWaypoints {
                count: waypoints.len(),
                max: self.config.max_waypoints,
            });
        }
        match waypoints.iter().position(|p| !self.point_is_sane(p)) {
            Some(index) => Err(NavError::InvalidWaypoint {
                index,
                x: waypoints[index].x,
                y: waypoints[index].y,
            }),
            None => Ok(()),
        }
    }

    /// Describes the first broken invariant of the actor, if any
    fn runtime_problem(&self) -> Option<String> {
        let actor = &self.actor;
        if !actor.size.is_finite() || actor.size <= 0.0 || actor.size > self.config.max_size {
            return Some(format!("invalid size {}", actor.size));
        }
        if !actor.speed.is_finite() || actor.speed <= 0.0 || actor.speed > self.config.max_speed {
            return Some(format!("invalid speed {}", actor.speed));
        }
        if !self.point_is_sane(&actor.position) {
            return Some(format!("invalid position ({}, {})", actor.position.x, actor.position.y));
        }
        None
    }

    fn reject(&self, error: NavError) -> Result<(), NavError> {
        warn!("actor {}: rejected movement request: {}", self.actor.id, error);
        Err(error)
    }
}
