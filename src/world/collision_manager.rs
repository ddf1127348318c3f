#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::collision::{broadphase::BroadPhase, contact::Arbiter, narrowphase::NarrowPhase};
use crate::core::{
    body::Body,
    shape::{Aabb, Shape, ShapeGeometry},
    types::Material,
};
use crate::utils::allocator::{Arena, BodyHandle, ShapeHandle};

/// World-space view of a shape taking part in this step's collision pass.
struct CollisionProxy<'a> {
    shape: &'a Shape,
    body: &'a Body,
    geometry: ShapeGeometry,
    aabb: Aabb,
}

/// Owns the broad phase and the persistent arbiter list.
pub struct CollisionManager {
    pub broadphase: BroadPhase,
    /// Sorted by `Arbiter::key`.
    arbiters: Vec<Arbiter>,
}

impl CollisionManager {
    pub fn new(cell_size: f32) -> Self {
        Self {
            broadphase: BroadPhase::new(cell_size),
            arbiters: Vec::new(),
        }
    }

    pub fn arbiters(&self) -> &[Arbiter] {
        &self.arbiters
    }

    pub fn arbiters_mut(&mut self) -> &mut [Arbiter] {
        &mut self.arbiters
    }

    /// Rebuilds the arbiter list from the current shape positions, carrying
    /// accumulated impulses over from matching arbiters of the previous step.
    pub fn collide(&mut self, shapes: &Arena<Shape>, bodies: &Arena<Body>) {
        let proxies: Vec<CollisionProxy> = shapes
            .iter()
            .filter(|(_, shape)| !shape.sensor)
            .filter_map(|(_, shape)| {
                let body = bodies.get(shape.body).filter(|b| !b.is_detached())?;
                let geometry = shape.geometry.transformed(body);
                let aabb = geometry.aabb();
                Some(CollisionProxy {
                    shape,
                    body,
                    geometry,
                    aabb,
                })
            })
            .collect();

        let aabbs: Vec<Aabb> = proxies.iter().map(|p| p.aabb).collect();
        let pairs = self.broadphase.potential_pairs(&aabbs);
        let previous = &self.arbiters;
        let make_arbiter = |&(i, j): &(usize, usize)| Self::arbiter_for(&proxies[i], &proxies[j], previous);

        #[cfg(feature = "parallel")]
        let mut arbiters: Vec<Arbiter> = pairs.par_iter().filter_map(make_arbiter).collect();
        #[cfg(not(feature = "parallel"))]
        let mut arbiters: Vec<Arbiter> = pairs.iter().filter_map(make_arbiter).collect();

        arbiters.sort_by_key(|a| a.key);
        self.arbiters = arbiters;
    }

    fn arbiter_for(a: &CollisionProxy, b: &CollisionProxy, previous: &[Arbiter]) -> Option<Arbiter> {
        if a.shape.body == b.shape.body || a.shape.filter.rejects(&b.shape.filter) {
            return None;
        }
        if !a.body.is_active() && !b.body.is_active() {
            return None;
        }

        let (first, second) = if a.shape.hash_id <= b.shape.hash_id {
            (a, b)
        } else {
            (b, a)
        };
        let manifold = NarrowPhase::collide(&first.geometry, &second.geometry)?;
        let key = (first.shape.hash_id, second.shape.hash_id);
        let mut arbiter = Arbiter::new(
            first.shape.id,
            second.shape.id,
            first.shape.body,
            second.shape.body,
            key,
            Material::combine_pair(&first.shape.material, &second.shape.material),
            manifold,
        );
        if let Ok(index) = previous.binary_search_by_key(&key, |old| old.key) {
            arbiter.warm_start_from(&previous[index]);
        }
        Some(arbiter)
    }

    /// Keeps only arbiters with at least one awake dynamic body.
    pub fn retain_active(&mut self, bodies: &Arena<Body>) {
        self.arbiters.retain(|arbiter| {
            let active = |b: BodyHandle| bodies.get(b).is_some_and(Body::is_active);
            active(arbiter.body_a) || active(arbiter.body_b)
        });
    }

    /// Drops arbiters that reference a removed shape.
    pub fn forget_shape(&mut self, shape: ShapeHandle) {
        self.arbiters
            .retain(|arbiter| arbiter.shape_a != shape && arbiter.shape_b != shape);
    }
}
