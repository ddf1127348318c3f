use std::cell::Cell;

use glam::Vec2;
use log::{trace, warn};

use crate::{
    collision::{
        contact::Arbiter,
        queries::{PointQuery, PointQueryInfo},
    },
    config::{
        error_bias_for, SandboxConfig, DEFAULT_COLLISION_CORRECTION_RATE, DEFAULT_COLLISION_STEP_RATE,
    },
    core::{body::Body, constraint::Constraint, shape::Shape, types::ShapeFilter},
    dynamics::solver::active_constraints,
    utils::{
        allocator::{Arena, BodyHandle, ConstraintHandle, ShapeHandle},
        logging::ScopedTimer,
        profiling::StepProfile,
    },
};

mod collision_manager;
mod dynamics_manager;

pub use collision_manager::CollisionManager;
pub use dynamics_manager::DynamicsManager;

/// World-wide simulation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSettings {
    pub gravity: Vec2,
    pub iterations: u32,
    pub sleep_time_threshold: f32,
    pub idle_speed_threshold: f32,
    pub collision_slop: f32,
    /// Fraction of contact overlap left after one second.
    pub collision_bias: f32,
    pub damping: f32,
    pub broadphase_cell_size: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self::from_config(&SandboxConfig::default())
    }
}

impl WorldSettings {
    pub fn from_config(config: &SandboxConfig) -> Self {
        Self {
            gravity: config.gravity,
            iterations: config.iterations,
            sleep_time_threshold: config.sleep_time_threshold,
            idle_speed_threshold: config.idle_speed_threshold,
            collision_slop: config.collision_slop,
            collision_bias: error_bias_for(
                DEFAULT_COLLISION_CORRECTION_RATE,
                DEFAULT_COLLISION_STEP_RATE,
            ),
            damping: config.damping,
            broadphase_cell_size: config.broadphase_cell_size,
        }
    }
}

/// Marks the world as mid-traversal for as long as it lives.
struct TraversalGuard<'a>(&'a Cell<u32>);

impl<'a> TraversalGuard<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for TraversalGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// The simulated scene: bodies, shapes, constraints and a static anchor body.
///
/// Structural mutation takes `&mut self` while the `each_*` traversals take
/// `&self`, so nothing can be added or removed from inside a traversal.
/// Removals discovered during a traversal go through
/// [`DeferredDestructionQueue`](crate::lifecycle::DeferredDestructionQueue).
pub struct World {
    bodies: Arena<Body>,
    shapes: Arena<Shape>,
    constraints: Arena<Constraint>,
    static_body: BodyHandle,
    settings: WorldSettings,
    collision: CollisionManager,
    dynamics: DynamicsManager,
    next_hash_id: u32,
    traversal_depth: Cell<u32>,
    profile: StepProfile,
    step_count: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldSettings::default())
    }
}

impl World {
    pub fn new(settings: WorldSettings) -> Self {
        let mut bodies = Arena::new();
        let static_body = BodyHandle::from(bodies.insert(Body::static_body()));
        if let Some(body) = bodies.get_mut(static_body) {
            body.id = static_body;
        }

        Self {
            bodies,
            shapes: Arena::new(),
            constraints: Arena::new(),
            static_body,
            collision: CollisionManager::new(settings.broadphase_cell_size),
            dynamics: DynamicsManager::new(&settings),
            settings,
            next_hash_id: 0,
            traversal_depth: Cell::new(0),
            profile: StepProfile::default(),
            step_count: 0,
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: WorldSettings) {
        self.dynamics = DynamicsManager::new(&settings);
        if settings.broadphase_cell_size != self.settings.broadphase_cell_size {
            self.collision = CollisionManager::new(settings.broadphase_cell_size);
        }
        self.settings = settings;
    }

    /// The immovable anchor body for boundary geometry. Never removed.
    pub fn static_body(&self) -> BodyHandle {
        self.static_body
    }

    /// Whether `handle` is the static body or a detached body. Neither can be removed.
    pub fn is_permanent_body(&self, handle: BodyHandle) -> bool {
        handle == self.static_body || self.bodies.get(handle).is_some_and(Body::is_detached)
    }

    /// True while an `each_*` traversal is running.
    pub fn is_locked(&self) -> bool {
        self.traversal_depth.get() > 0
    }

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        debug_assert!(!self.is_locked(), "bodies cannot be added during a traversal");
        let handle = BodyHandle::from(self.bodies.insert(body));
        if let Some(stored) = self.bodies.get_mut(handle) {
            stored.id = handle;
        }
        handle
    }

    /// Stores a body that constraints may reference but that is not a world
    /// member: it is never integrated, put to sleep, queried or traversed.
    pub fn add_detached_body(&mut self, mut body: Body) -> BodyHandle {
        body.detached = true;
        self.add_body(body)
    }

    pub fn add_shape(&mut self, mut shape: Shape) -> ShapeHandle {
        debug_assert!(!self.is_locked(), "shapes cannot be added during a traversal");
        debug_assert!(
            self.bodies.contains(shape.body),
            "shape must reference a live body"
        );
        shape.hash_id = self.next_hash_id;
        self.next_hash_id = self.next_hash_id.wrapping_add(1);

        let body = shape.body;
        let handle = ShapeHandle::from(self.shapes.insert(shape));
        if let Some(stored) = self.shapes.get_mut(handle) {
            stored.id = handle;
        }
        self.activate_body(body);
        handle
    }

    /// Adds a constraint and wakes both of its bodies.
    pub fn add_constraint(&mut self, constraint: Constraint) -> ConstraintHandle {
        debug_assert!(!self.is_locked(), "constraints cannot be added during a traversal");
        debug_assert!(
            self.bodies.contains(constraint.body_a) && self.bodies.contains(constraint.body_b),
            "constraint must reference two live bodies"
        );
        let (a, b) = constraint.bodies();
        let handle = ConstraintHandle::from(self.constraints.insert(constraint));
        if let Some(stored) = self.constraints.get_mut(handle) {
            stored.id = handle;
        }
        self.activate_body(a);
        self.activate_body(b);
        handle
    }

    pub fn remove_shape(&mut self, handle: ShapeHandle) -> Option<Shape> {
        debug_assert!(!self.is_locked(), "shapes cannot be removed during a traversal");
        let shape = self.shapes.remove(handle)?;
        self.collision.forget_shape(handle);
        self.activate_body(shape.body);
        Some(shape)
    }

    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Option<Constraint> {
        debug_assert!(!self.is_locked(), "constraints cannot be removed during a traversal");
        let constraint = self.constraints.remove(handle)?;
        self.activate_body(constraint.body_a);
        self.activate_body(constraint.body_b);
        Some(constraint)
    }

    /// Removes a body. Its shapes and constraints must already be gone.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        debug_assert!(!self.is_locked(), "bodies cannot be removed during a traversal");
        if self.is_permanent_body(handle) {
            warn!("Refusing to remove permanent body {handle:?}");
            return None;
        }
        debug_assert!(
            self.shapes_of(handle).is_empty() && self.constraints_of(handle).is_empty(),
            "body removed while shapes or constraints still reference it"
        );
        self.bodies.remove(handle)
    }

    pub fn contains_body(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    pub fn contains_shape(&self, handle: ShapeHandle) -> bool {
        self.shapes.contains(handle)
    }

    pub fn contains_constraint(&self, handle: ConstraintHandle) -> bool {
        self.constraints.contains(handle)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn shape(&self, handle: ShapeHandle) -> Option<&Shape> {
        self.shapes.get(handle)
    }

    pub fn constraint(&self, handle: ConstraintHandle) -> Option<&Constraint> {
        self.constraints.get(handle)
    }

    pub fn constraint_mut(&mut self, handle: ConstraintHandle) -> Option<&mut Constraint> {
        self.constraints.get_mut(handle)
    }

    pub fn shapes_of(&self, body: BodyHandle) -> Vec<ShapeHandle> {
        self.shapes
            .iter()
            .filter(|(_, shape)| shape.body == body)
            .map(|(id, _)| ShapeHandle::from(id))
            .collect()
    }

    pub fn constraints_of(&self, body: BodyHandle) -> Vec<ConstraintHandle> {
        self.constraints
            .iter()
            .filter(|(_, constraint)| constraint.references(body))
            .map(|(id, _)| ConstraintHandle::from(id))
            .collect()
    }

    /// Member bodies: everything except the static anchor and detached bodies.
    pub fn body_count(&self) -> usize {
        self.bodies
            .iter()
            .filter(|(id, body)| BodyHandle::from(*id) != self.static_body && !body.is_detached())
            .count()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Visits every member body in insertion order.
    pub fn each_body(&self, mut f: impl FnMut(&Body)) {
        let _guard = TraversalGuard::enter(&self.traversal_depth);
        for (id, body) in self.bodies.iter() {
            if BodyHandle::from(id) == self.static_body || body.is_detached() {
                continue;
            }
            f(body);
        }
    }

    pub fn each_shape(&self, mut f: impl FnMut(&Shape)) {
        let _guard = TraversalGuard::enter(&self.traversal_depth);
        for (_, shape) in self.shapes.iter() {
            f(shape);
        }
    }

    pub fn each_constraint(&self, mut f: impl FnMut(&Constraint)) {
        let _guard = TraversalGuard::enter(&self.traversal_depth);
        for (_, constraint) in self.constraints.iter() {
            f(constraint);
        }
    }

    /// Nearest non-sensor shape accepted by `filter` whose surface is within `max_distance`.
    pub fn point_query_nearest(
        &self,
        point: Vec2,
        max_distance: f32,
        filter: ShapeFilter,
    ) -> Option<PointQueryInfo> {
        PointQuery::nearest(point, max_distance, filter, &self.shapes, &self.bodies)
    }

    /// Arbiters of the last step, sorted by shape pair.
    pub fn arbiters(&self) -> &[Arbiter] {
        self.collision.arbiters()
    }

    pub fn contact_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.arbiters()
            .iter()
            .flat_map(|arbiter| arbiter.contacts.iter().map(|c| c.point))
    }

    /// Wakes a body and resets its idle timer.
    pub fn activate_body(&mut self, handle: BodyHandle) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.activate();
        }
    }

    pub fn last_profile(&self) -> &StepProfile {
        &self.profile
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        debug_assert!(!self.is_locked(), "step called during a traversal");
        debug_assert!(dt > 0.0, "time step must be positive");
        let mut profile = StepProfile::default();

        {
            let _timer = ScopedTimer::accumulating("world::integrate_positions", &mut profile.integrate_time);
            for (_, body) in self.bodies.iter_mut() {
                if !body.is_detached() {
                    self.dynamics.integrator.integrate_position(body, dt);
                }
            }
        }

        {
            let _timer = ScopedTimer::accumulating("world::collide", &mut profile.collide_time);
            self.collision.collide(&self.shapes, &self.bodies);
        }

        {
            let _timer = ScopedTimer::accumulating("world::sleep", &mut profile.sleep_time);
            self.dynamics.sleep.update(
                &mut self.bodies,
                self.collision.arbiters(),
                &self.constraints,
                self.settings.gravity,
                dt,
            );
            self.collision.retain_active(&self.bodies);
        }

        {
            let _timer = ScopedTimer::accumulating("world::solve", &mut profile.solve_time);
            let active = active_constraints(&self.bodies, &self.constraints);
            let solver = &self.dynamics.solver;
            solver.pre_step(
                &self.bodies,
                self.collision.arbiters_mut(),
                &mut self.constraints,
                &active,
                dt,
            );
            for (_, body) in self.bodies.iter_mut() {
                if !body.is_detached() {
                    self.dynamics.integrator.integrate_velocity(body, dt);
                }
            }
            solver.warm_start(&mut self.bodies, self.collision.arbiters(), &self.constraints, &active);
            solver.solve(
                &mut self.bodies,
                self.collision.arbiters_mut(),
                &mut self.constraints,
                &active,
            );
            profile.constraint_count = active.len();
        }

        profile.body_count = self.body_count();
        profile.awake_body_count = self.bodies.iter().filter(|(_, b)| b.is_active()).count();
        profile.arbiter_count = self.arbiters().len();
        profile.contact_count = self.arbiters().iter().map(|a| a.contacts.len()).sum();
        self.profile = profile;
        self.step_count += 1;

        trace!("step {} done (dt = {dt})", self.step_count);
        self.profile.report();
    }
}
