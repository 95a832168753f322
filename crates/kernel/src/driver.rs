use crate::grid::GridError;
use crate::simulation::{GridSimulation, StepStats};
use lifegrid_common::TickConfig;

/// Whether the driver is currently advancing generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Paused,
}

/// Fixed-interval generation timer.
///
/// The host calls [`TickDriver::advance`] once per frame with the frame's
/// elapsed time and the simulation it owns. Time accumulates only while
/// running; once the accumulator exceeds the interval it resets to zero and
/// exactly one generation is computed, however much time was passed in.
#[derive(Debug, Clone)]
pub struct TickDriver {
    interval: f32,
    accumulator: f32,
    state: DriverState,
    ticks_fired: u64,
}

impl TickDriver {
    /// Create a running driver. `interval` is in seconds and must be finite and non-negative.
    pub fn new(interval: f32) -> Result<Self, GridError> {
        validate_interval(interval)?;
        Ok(Self {
            interval,
            accumulator: 0.0,
            state: DriverState::Running,
            ticks_fired: 0,
        })
    }

    pub fn from_config(config: &TickConfig) -> Result<Self, GridError> {
        let mut driver = Self::new(config.interval)?;
        if config.start_paused {
            driver.state = DriverState::Paused;
        }
        Ok(driver)
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Change the interval. The accumulated time is kept.
    pub fn set_interval(&mut self, interval: f32) -> Result<(), GridError> {
        validate_interval(interval)?;
        self.interval = interval;
        Ok(())
    }

    /// Time accumulated toward the next generation.
    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == DriverState::Paused
    }

    /// Number of generations this driver has triggered.
    pub fn ticks_fired(&self) -> u64 {
        self.ticks_fired
    }

    /// Flip between running and paused. The accumulator is left untouched.
    pub fn toggle_pause(&mut self) -> DriverState {
        self.state = match self.state {
            DriverState::Running => DriverState::Paused,
            DriverState::Paused => DriverState::Running,
        };
        tracing::debug!(state = ?self.state, accumulated = self.accumulator, "pause toggled");
        self.state
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused != self.is_paused() {
            self.toggle_pause();
        }
    }

    /// Accumulate `dt` seconds and step the simulation at most once.
    ///
    /// Returns the step's stats when a generation was computed. A negative or
    /// non-finite `dt` counts as no time passing.
    pub fn advance(&mut self, dt: f32, sim: &mut GridSimulation) -> Option<StepStats> {
        if self.is_paused() {
            return None;
        }

        if !dt.is_finite() || dt < 0.0 {
            tracing::warn!(dt, "ignoring invalid frame time");
            return None;
        }
        self.accumulator += dt;
        if self.accumulator > self.interval {
            self.accumulator = 0.0;
            self.ticks_fired += 1;
            Some(sim.step())
        } else {
            None
        }
    }
}

fn validate_interval(interval: f32) -> Result<(), GridError> {
    if interval.is_finite() && interval >= 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidConfiguration(format!(
            "tick interval must be finite and non-negative, got {interval}"
        )))
    }
}
