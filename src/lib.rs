//! Rigid Sandbox – an interactive 2D rigid-body playground.
//!
//! The crate builds a scene of static walls, a pyramid of boxes and a ball,
//! steps it at a fixed rate, lets a pointer drag bodies around through a
//! pivot joint, and describes each frame to a renderer through the
//! [`DebugDraw`] trait. Windowing and rasterization are left to the caller.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod render;
pub mod scene;
pub mod stepper;
pub mod utils;
pub mod world;

use std::time::Instant;

use log::info;

pub use glam::Vec2;

pub use collision::queries::PointQueryInfo;
pub use config::{DragSettings, SandboxConfig};
pub use core::{
    body::Body,
    constraint::{Constraint, Joint},
    shape::{Shape, ShapeBuilder, ShapeGeometry},
    types::{BodyType, Material, ShapeFilter},
};
pub use error::{Result, SandboxError};
pub use input::{DragState, MouseDragController, PointerEvent};
pub use lifecycle::{free_world_children, DeferredDestructionQueue, FlushReport, Removal};
pub use render::{color_for_shape, debug_draw, DebugDraw, DrawList, DrawOptions, Rgba};
pub use scene::{Scene, SceneBuilder};
pub use stepper::SimulationStepper;
pub use utils::allocator::{BodyHandle, ConstraintHandle, ShapeHandle};
pub use world::{World, WorldSettings};

use utils::logging::warn_if_frame_budget_exceeded;

/// High-level driver that owns the world, the drag controller and the removal queue.
///
/// One [`Sandbox::frame`] is: apply pointer events, advance one fixed step, draw.
pub struct Sandbox {
    world: World,
    drag: MouseDragController,
    queue: DeferredDestructionQueue,
    stepper: SimulationStepper,
    config: SandboxConfig,
    draw_options: DrawOptions,
}

impl Sandbox {
    /// Validates `config` and builds the initial scene at the configured viewport size.
    pub fn new(config: SandboxConfig) -> Result<Self> {
        config.validate()?;
        let Scene { world, drag_proxy } =
            SceneBuilder::new(&config).build(config.viewport_width, config.viewport_height);
        info!(
            "Sandbox ready: {} bodies, {} shapes, dt = {}",
            world.body_count(),
            world.shape_count(),
            config.time_step
        );

        Ok(Self {
            world,
            drag: MouseDragController::new(drag_proxy, config.drag),
            queue: DeferredDestructionQueue::new(),
            stepper: SimulationStepper::new(),
            config,
            draw_options: DrawOptions::default(),
        })
    }

    /// Parses a JSON configuration and builds the sandbox from it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(SandboxConfig::from_json_str(json)?)
    }

    pub fn handle_event(&mut self, event: PointerEvent) {
        self.drag.handle_event(&mut self.world, &mut self.queue, event);
    }

    /// Advances one fixed timestep.
    pub fn advance(&mut self) -> FlushReport {
        self.advance_by(self.config.time_step)
    }

    pub fn advance_by(&mut self, dt: f32) -> FlushReport {
        self.stepper.advance(&mut self.world, &mut self.drag, &mut self.queue, dt)
    }

    pub fn draw(&self, drawer: &mut impl DebugDraw) {
        debug_draw(&self.world, &self.draw_options, drawer);
    }

    /// Runs one complete frame and warns when it overruns the frame budget.
    pub fn frame(
        &mut self,
        events: impl IntoIterator<Item = PointerEvent>,
        drawer: &mut impl DebugDraw,
    ) -> FlushReport {
        let start = Instant::now();
        for event in events {
            self.handle_event(event);
        }
        let report = self.advance();
        self.draw(drawer);
        warn_if_frame_budget_exceeded(start.elapsed(), self.config.frame_budget_ms);
        report
    }

    /// Releases any drag and removes every member object from the world.
    pub fn destroy_all(&mut self) -> FlushReport {
        self.drag.on_pointer_up(&mut self.queue);
        free_world_children(&mut self.world, &mut self.queue)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn drag(&self) -> &MouseDragController {
        &self.drag
    }

    pub fn queue(&self) -> &DeferredDestructionQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut DeferredDestructionQueue {
        &mut self.queue
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn draw_options(&self) -> &DrawOptions {
        &self.draw_options
    }

    pub fn set_draw_options(&mut self, options: DrawOptions) {
        self.draw_options = options;
    }

    /// Frames advanced so far.
    pub fn frames(&self) -> u64 {
        self.stepper.frames()
    }
}
