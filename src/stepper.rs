//! Fixed-order frame advance: proxy update, world step, removal flush.

use crate::input::drag::MouseDragController;
use crate::lifecycle::{DeferredDestructionQueue, FlushReport};
use crate::utils::logging::ScopedTimer;
use crate::world::World;

#[derive(Debug, Default)]
pub struct SimulationStepper {
    frames: u64,
}

impl SimulationStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames advanced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances one frame. The order is fixed: the proxy must move before the
    /// step so the drag joint sees its new velocity, and removals are applied
    /// only once the step has finished touching the world. A drag whose joint
    /// was removed by the flush ends here.
    pub fn advance(
        &mut self,
        world: &mut World,
        drag: &mut MouseDragController,
        queue: &mut DeferredDestructionQueue,
        dt: f32,
    ) -> FlushReport {
        let _frame = ScopedTimer::new("stepper::advance");
        drag.update_proxy(world);
        world.step(dt);
        let report = queue.flush(world);
        drag.sync_with_world(world);
        self.frames += 1;
        report
    }
}
