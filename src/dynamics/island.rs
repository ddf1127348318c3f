use std::collections::HashMap;

use glam::Vec2;

use crate::{
    collision::contact::Arbiter,
    core::{body::Body, constraint::Constraint},
    utils::allocator::{Arena, BodyHandle},
};

/// Tracks idle time and puts groups of touching bodies to sleep together.
#[derive(Debug, Clone)]
pub struct SleepManager {
    /// Seconds a group must stay idle; `INFINITY` disables sleeping.
    pub time_threshold: f32,
    /// Speed below which a body counts as idle; `0` derives it from gravity.
    pub idle_speed_threshold: f32,
}

/// Disjoint-set forest over the awake dynamic bodies of one step.
struct Islands {
    parent: Vec<usize>,
}

impl Islands {
    fn new(count: usize) -> Self {
        Self {
            parent: (0..count).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            self.parent[root_b.max(root_a)] = root_a.min(root_b);
        }
    }
}

impl SleepManager {
    pub fn new(time_threshold: f32, idle_speed_threshold: f32) -> Self {
        Self {
            time_threshold,
            idle_speed_threshold,
        }
    }

    pub fn enabled(&self) -> bool {
        self.time_threshold.is_finite()
    }

    /// Squared speed under which a body is idle.
    fn idle_speed_sq(&self, gravity: Vec2, dt: f32) -> f32 {
        if self.idle_speed_threshold > 0.0 {
            self.idle_speed_threshold * self.idle_speed_threshold
        } else {
            gravity.length_squared() * dt * dt
        }
    }

    /// Updates idle timers, wakes bodies disturbed by contacts or kinematic joints,
    /// then puts fully idle groups to sleep. Returns how many bodies fell asleep.
    pub fn update(
        &self,
        bodies: &mut Arena<Body>,
        arbiters: &[Arbiter],
        constraints: &Arena<Constraint>,
        gravity: Vec2,
        dt: f32,
    ) -> usize {
        if !self.enabled() {
            return 0;
        }

        let dv_sq = self.idle_speed_sq(gravity, dt);
        for (_, body) in bodies.iter_mut() {
            if body.is_detached() {
                continue;
            }
            if body.is_kinematic() {
                body.sleeping.idle_time = 0.0;
            } else if body.is_active() {
                let threshold = body.mass() * dv_sq;
                body.sleeping.idle_time = if body.kinetic_energy() > threshold {
                    0.0
                } else {
                    body.sleeping.idle_time + dt
                };
            }
        }

        for arbiter in arbiters {
            Self::wake_if_sleeping(bodies, arbiter.body_a);
            Self::wake_if_sleeping(bodies, arbiter.body_b);
        }
        for (_, constraint) in constraints.iter() {
            let kinematic = |handle: BodyHandle| bodies.get(handle).is_some_and(Body::is_kinematic);
            let (wake_a, wake_b) = (kinematic(constraint.body_b), kinematic(constraint.body_a));
            if wake_a {
                if let Some(body) = bodies.get_mut(constraint.body_a) {
                    body.activate();
                }
            }
            if wake_b {
                if let Some(body) = bodies.get_mut(constraint.body_b) {
                    body.activate();
                }
            }
        }

        self.sleep_idle_groups(bodies, arbiters, constraints)
    }

    fn wake_if_sleeping(bodies: &mut Arena<Body>, handle: BodyHandle) {
        if let Some(body) = bodies.get_mut(handle) {
            if body.is_sleeping() {
                body.activate();
            }
        }
    }

    fn sleep_idle_groups(
        &self,
        bodies: &mut Arena<Body>,
        arbiters: &[Arbiter],
        constraints: &Arena<Constraint>,
    ) -> usize {
        let members: Vec<BodyHandle> = bodies
            .iter()
            .filter(|(_, b)| b.is_active() && !b.is_detached())
            .map(|(id, _)| BodyHandle::from(id))
            .collect();
        let index: HashMap<BodyHandle, usize> =
            members.iter().enumerate().map(|(i, h)| (*h, i)).collect();

        let mut islands = Islands::new(members.len());
        let edges = arbiters
            .iter()
            .map(|a| (a.body_a, a.body_b))
            .chain(constraints.iter().map(|(_, c)| c.bodies()));
        for (a, b) in edges {
            if let (Some(&ia), Some(&ib)) = (index.get(&a), index.get(&b)) {
                islands.union(ia, ib);
            }
        }

        let mut restless = vec![false; members.len()];
        for (i, handle) in members.iter().enumerate() {
            let idle = bodies
                .get(*handle)
                .is_some_and(|b| b.sleeping.idle_time >= self.time_threshold);
            if !idle {
                let root = islands.find(i);
                restless[root] = true;
            }
        }

        let mut slept = 0;
        for (i, handle) in members.iter().enumerate() {
            let root = islands.find(i);
            if restless[root] {
                continue;
            }
            if let Some(body) = bodies.get_mut(*handle) {
                body.sleeping.asleep = true;
                slept += 1;
            }
        }
        if slept > 0 {
            log::debug!("{slept} bodies fell asleep");
        }
        slept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::allocator::ConstraintHandle;

    #[test]
    fn resting_body_falls_asleep_after_threshold() {
        let mut bodies = Arena::new();
        let handle = BodyHandle::from(bodies.insert(Body::dynamic(1.0, 1.0)));
        let constraints = Arena::new();
        let manager = SleepManager::new(0.5, 0.0);

        let mut slept = 0;
        for _ in 0..60 {
            slept += manager.update(&mut bodies, &[], &constraints, Vec2::new(0.0, 100.0), 0.01);
        }
        assert_eq!(slept, 1);
        assert!(bodies.get(handle).is_some_and(Body::is_sleeping));
    }

    #[test]
    fn kinematic_joint_keeps_body_awake() {
        let mut bodies = Arena::new();
        let proxy = BodyHandle::from(bodies.insert(Body::kinematic()));
        let held = BodyHandle::from(bodies.insert(Body::dynamic(1.0, 1.0)));
        let mut constraints = Arena::new();
        let _joint: ConstraintHandle =
            constraints.insert(Constraint::pivot(proxy, held, Vec2::ZERO, Vec2::ZERO)).into();
        let manager = SleepManager::new(0.05, 0.0);

        for _ in 0..20 {
            manager.update(&mut bodies, &[], &constraints, Vec2::new(0.0, 100.0), 0.01);
        }
        assert!(bodies.get(held).is_some_and(|b| !b.is_sleeping()));
    }

    #[test]
    fn moving_member_keeps_group_awake() {
        let mut bodies = Arena::new();
        let a = BodyHandle::from(bodies.insert(Body::dynamic(1.0, 1.0)));
        let b = BodyHandle::from(bodies.insert(Body::dynamic(1.0, 1.0)));
        if let Some(body) = bodies.get_mut(b) {
            body.velocity = Vec2::new(50.0, 0.0);
        }
        let mut constraints = Arena::new();
        let _joint: ConstraintHandle =
            constraints.insert(Constraint::pivot(a, b, Vec2::ZERO, Vec2::ZERO)).into();
        let manager = SleepManager::new(0.05, 0.0);

        for _ in 0..20 {
            manager.update(&mut bodies, &[], &constraints, Vec2::new(0.0, 100.0), 0.01);
        }
        assert!(bodies.get(a).is_some_and(|body| !body.is_sleeping()));
    }

    #[test]
    fn infinite_threshold_disables_sleep() {
        let mut bodies = Arena::new();
        bodies.insert(Body::dynamic(1.0, 1.0));
        let manager = SleepManager::new(f32::INFINITY, 0.0);
        assert_eq!(
            manager.update(&mut bodies, &[], &Arena::new(), Vec2::ZERO, 1.0),
            0
        );
    }
}
