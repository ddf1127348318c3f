//! Simulation dynamics: integration, the impulse solver and sleeping.

pub mod integrator;
pub mod island;
pub mod solver;

pub use integrator::Integrator;
pub use island::SleepManager;
pub use solver::{active_constraints, ConstraintSolver};
