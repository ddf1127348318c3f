//! Configuration constants and the serde-backed [`SandboxConfig`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SandboxError};

/// Default gravity in screen coordinates (y grows downward).
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, 100.0];

/// Default fixed timestep handed to every `advance` call (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 0.01;

/// Number of constraint solver iterations performed per step.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 30;

/// Seconds a body group must stay idle before it is put to sleep.
pub const DEFAULT_SLEEP_TIME_THRESHOLD: f32 = 0.5;

/// Speed under which a body counts as idle; `0.0` derives it from gravity.
pub const DEFAULT_IDLE_SPEED_THRESHOLD: f32 = 0.0;

/// Penetration allowed before contacts start pushing shapes apart.
pub const DEFAULT_COLLISION_SLOP: f32 = 0.5;

/// Fraction of contact overlap corrected per step at the reference step rate.
pub const DEFAULT_COLLISION_CORRECTION_RATE: f32 = 0.1;

/// Steps per second the correction rates above are expressed against.
pub const DEFAULT_COLLISION_STEP_RATE: f32 = 60.0;

/// Fraction of velocity kept per second (`1.0` disables damping).
pub const DEFAULT_DAMPING: f32 = 1.0;

/// Default cell size for the broad-phase uniform grid.
pub const DEFAULT_BROADPHASE_CELL_SIZE: f32 = 40.0;

pub const DEFAULT_VIEWPORT_WIDTH: f32 = 480.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 480.0;

/// Frame duration above which the driver logs a warning.
pub const DEFAULT_FRAME_BUDGET_MS: f32 = 16.0;

/// Collision category bit reserved for shapes the pointer may grab.
pub const GRABBABLE_MASK_BIT: u32 = 1 << 31;

/// Pointer pick radius, so small shapes stay easy to click.
pub const DEFAULT_PICK_RADIUS: f32 = 5.0;
pub const DEFAULT_DRAG_MAX_FORCE: f32 = 50_000.0;
pub const DEFAULT_DRAG_CORRECTION_RATE: f32 = 0.15;
pub const DEFAULT_DRAG_STEP_RATE: f32 = 60.0;
pub const DEFAULT_PROXY_SMOOTHING: f32 = 0.25;
pub const DEFAULT_PROXY_VELOCITY_SCALE: f32 = 60.0;

/// Error bias that leaves `1 - correction_rate` of an error after `step_rate` corrections.
pub fn error_bias_for(correction_rate: f32, step_rate: f32) -> f32 {
    (1.0 - correction_rate).powf(step_rate)
}

/// Tuning of the pointer drag controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragSettings {
    pub pick_radius: f32,
    pub max_force: f32,
    pub correction_rate: f32,
    pub step_rate: f32,
    /// Per-call lerp factor toward the pointer; not scaled by elapsed time.
    pub smoothing: f32,
    pub velocity_scale: f32,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            pick_radius: DEFAULT_PICK_RADIUS,
            max_force: DEFAULT_DRAG_MAX_FORCE,
            correction_rate: DEFAULT_DRAG_CORRECTION_RATE,
            step_rate: DEFAULT_DRAG_STEP_RATE,
            smoothing: DEFAULT_PROXY_SMOOTHING,
            velocity_scale: DEFAULT_PROXY_VELOCITY_SCALE,
        }
    }
}

impl DragSettings {
    pub fn error_bias(&self) -> f32 {
        error_bias_for(self.correction_rate, self.step_rate)
    }
}

/// Everything needed to build and drive a sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub time_step: f32,
    pub gravity: Vec2,
    pub iterations: u32,
    pub sleep_time_threshold: f32,
    pub idle_speed_threshold: f32,
    pub collision_slop: f32,
    pub damping: f32,
    pub broadphase_cell_size: f32,
    pub frame_budget_ms: f32,
    pub drag: DragSettings,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            time_step: DEFAULT_TIME_STEP,
            gravity: Vec2::from_array(DEFAULT_GRAVITY),
            iterations: DEFAULT_SOLVER_ITERATIONS,
            sleep_time_threshold: DEFAULT_SLEEP_TIME_THRESHOLD,
            idle_speed_threshold: DEFAULT_IDLE_SPEED_THRESHOLD,
            collision_slop: DEFAULT_COLLISION_SLOP,
            damping: DEFAULT_DAMPING,
            broadphase_cell_size: DEFAULT_BROADPHASE_CELL_SIZE,
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
            drag: DragSettings::default(),
        }
    }
}

impl SandboxConfig {
    /// Parses a (possibly partial) JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0)
            || !self.viewport_width.is_finite()
            || !self.viewport_height.is_finite()
        {
            return Err(SandboxError::InvalidViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(SandboxError::InvalidTimeStep(self.time_step));
        }
        if self.iterations == 0 {
            return Err(SandboxError::InvalidConfig(
                "solver iterations must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(SandboxError::InvalidConfig(format!(
                "damping must lie in [0, 1], got {}",
                self.damping
            )));
        }
        if !(self.broadphase_cell_size > 0.0) {
            return Err(SandboxError::InvalidConfig(format!(
                "broadphase cell size must be positive, got {}",
                self.broadphase_cell_size
            )));
        }
        if !(self.sleep_time_threshold > 0.0) {
            return Err(SandboxError::InvalidConfig(format!(
                "sleep time threshold must be positive (use inf to disable sleeping), got {}",
                self.sleep_time_threshold
            )));
        }
        let drag = &self.drag;
        if !(drag.pick_radius >= 0.0 && drag.max_force > 0.0) {
            return Err(SandboxError::InvalidConfig(
                "drag pick radius must be non-negative and max force positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&drag.correction_rate) || !(0.0..=1.0).contains(&drag.smoothing)
        {
            return Err(SandboxError::InvalidConfig(
                "drag correction rate and smoothing must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}
