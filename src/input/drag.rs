use glam::Vec2;
use log::{debug, trace};

use super::PointerEvent;
use crate::config::DragSettings;
use crate::core::{constraint::Constraint, types::ShapeFilter};
use crate::lifecycle::DeferredDestructionQueue;
use crate::utils::allocator::{BodyHandle, ConstraintHandle};
use crate::world::World;

/// Whether a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ConstraintHandle),
}

/// Drags dynamic bodies around with a pivot joint attached to a kinematic proxy.
///
/// The proxy chases the pointer with smoothed motion rather than snapping to
/// it, so the joint never sees an unbounded position error.
#[derive(Debug)]
pub struct MouseDragController {
    proxy: BodyHandle,
    target: Vec2,
    state: DragState,
    settings: DragSettings,
}

impl MouseDragController {
    pub fn new(proxy: BodyHandle, settings: DragSettings) -> Self {
        Self {
            proxy,
            target: Vec2::ZERO,
            state: DragState::Idle,
            settings,
        }
    }

    pub fn proxy(&self) -> BodyHandle {
        self.proxy
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn settings(&self) -> &DragSettings {
        &self.settings
    }

    pub fn active_constraint(&self) -> Option<ConstraintHandle> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging(handle) => Some(handle),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn handle_event(
        &mut self,
        world: &mut World,
        queue: &mut DeferredDestructionQueue,
        event: PointerEvent,
    ) {
        match event {
            PointerEvent::Moved(point) => self.on_pointer_move(point),
            PointerEvent::Pressed => {
                self.on_pointer_down(world);
            }
            PointerEvent::Released => self.on_pointer_up(queue),
        }
    }

    pub fn on_pointer_move(&mut self, point: Vec2) {
        self.target = point;
    }

    /// Grabs the nearest grabbable shape with finite mass around the pointer.
    ///
    /// Returns whether a drag started. A drag already in progress is dropped
    /// first; its joint is removed right away so the body is never held by two.
    pub fn on_pointer_down(&mut self, world: &mut World) -> bool {
        if let DragState::Dragging(previous) = std::mem::take(&mut self.state) {
            world.remove_constraint(previous);
            debug!("Replaced drag joint {previous:?}");
        }

        let Some(info) =
            world.point_query_nearest(self.target, self.settings.pick_radius, ShapeFilter::GRAB)
        else {
            trace!("Nothing to grab at {:?}", self.target);
            return false;
        };
        let Some(body) = world.body(info.body).filter(|b| b.has_finite_mass()) else {
            trace!("Shape at {:?} has infinite mass; not grabbing", self.target);
            return false;
        };

        let nearest = if info.distance > 0.0 { info.point } else { self.target };
        let anchor = body.world_to_local(nearest);
        let joint = Constraint::pivot(self.proxy, info.body, Vec2::ZERO, anchor)
            .with_max_force(self.settings.max_force)
            .with_error_bias(self.settings.error_bias());
        let handle = world.add_constraint(joint);
        self.state = DragState::Dragging(handle);

        debug!("Grabbed body {:?} at {nearest:?}", info.body);
        true
    }

    /// Schedules the drag joint for removal; nothing happens when idle.
    pub fn on_pointer_up(&mut self, queue: &mut DeferredDestructionQueue) {
        if let DragState::Dragging(handle) = std::mem::take(&mut self.state) {
            queue.schedule_constraint(handle);
            debug!("Released drag joint {handle:?}");
        }
    }

    /// Returns to [`DragState::Idle`] when the drag joint no longer exists,
    /// e.g. because the grabbed body was removed by a flush.
    pub fn sync_with_world(&mut self, world: &World) {
        if let DragState::Dragging(handle) = self.state {
            if !world.contains_constraint(handle) {
                self.state = DragState::Idle;
                debug!("Drag joint {handle:?} is gone; drag ended");
            }
        }
    }

    /// Moves the proxy a fixed fraction of the way toward the pointer.
    ///
    /// Called once per frame before stepping. The factor is per call, not per
    /// second, so the feel depends on the call rate.
    pub fn update_proxy(&self, world: &mut World) {
        let Some(proxy) = world.body_mut(self.proxy) else {
            return;
        };
        let current = proxy.position;
        let next = current.lerp(self.target, self.settings.smoothing);
        proxy.velocity = (next - current) * self.settings.velocity_scale;
        proxy.position = next;
    }
}
