use log::{debug, log_enabled, Level};
use std::time::Duration;

/// Timing and population counters for a single `World::step`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepProfile {
    pub integrate_time: Duration,
    pub collide_time: Duration,
    pub sleep_time: Duration,
    pub solve_time: Duration,

    pub body_count: usize,
    pub awake_body_count: usize,
    pub arbiter_count: usize,
    pub contact_count: usize,
    pub constraint_count: usize,
}

impl StepProfile {
    pub fn total_time(&self) -> Duration {
        self.integrate_time + self.collide_time + self.sleep_time + self.solve_time
    }

    pub fn report(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        let total_us = self.total_time().as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        let share = |d: Duration| d.as_micros() as f32 / total_us * 100.0;
        debug!(
            "step: {} bodies ({} awake), {} arbiters / {} contacts, {} constraints",
            self.body_count,
            self.awake_body_count,
            self.arbiter_count,
            self.contact_count,
            self.constraint_count
        );
        debug!(
            "step: {:.2} ms total | integrate {:.1}% | collide {:.1}% | sleep {:.1}% | solve {:.1}%",
            self.total_time().as_secs_f32() * 1000.0,
            share(self.integrate_time),
            share(self.collide_time),
            share(self.sleep_time),
            share(self.solve_time)
        );
    }
}
