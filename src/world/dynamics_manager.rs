use super::WorldSettings;
use crate::dynamics::{integrator::Integrator, island::SleepManager, solver::ConstraintSolver};

/// Integration, impulse solving and sleeping, configured from [`WorldSettings`].
pub struct DynamicsManager {
    pub integrator: Integrator,
    pub solver: ConstraintSolver,
    pub sleep: SleepManager,
}

impl DynamicsManager {
    pub fn new(settings: &WorldSettings) -> Self {
        Self {
            integrator: Integrator::new(settings.gravity, settings.damping),
            solver: ConstraintSolver::new(
                settings.iterations,
                settings.collision_bias,
                settings.collision_slop,
            ),
            sleep: SleepManager::new(settings.sleep_time_threshold, settings.idle_speed_threshold),
        }
    }
}
