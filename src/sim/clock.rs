//! Simulation clock
//!
//! Turns host frames into a monotonic sequence of simulation steps. The host
//! calls [`StepClock::frame`] once per display frame and runs as many steps
//! as it returns.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, STEP_DT};

/// How host frames map to simulation steps
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClockMode {
    /// One frame, one step, whatever the frame time
    #[default]
    PerFrame,
    /// Fixed timestep accumulator, capped at `MAX_SUBSTEPS` per frame
    Fixed { step_secs: f32 },
}

impl ClockMode {
    /// Reject step lengths the accumulator cannot work with
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            ClockMode::PerFrame => Ok(()),
            ClockMode::Fixed { step_secs } if step_secs.is_finite() && step_secs > 0.0 => Ok(()),
            ClockMode::Fixed { step_secs } => Err(format!("step_secs must be a positive number, got {step_secs}")),
        }
    }
}

/// Step source for one session host
#[derive(Debug, Clone)]
pub struct StepClock {
    mode: ClockMode,
    accumulator: f32,
    /// Steps handed out so far
    issued: u64,
    running: bool,
}

impl StepClock {
    pub fn new(mode: ClockMode) -> Self {
        Self {
            mode,
            accumulator: 0.0,
            issued: 0,
            running: true,
        }
    }

    /// Fixed-timestep clock at the reference rate
    pub fn reference_fixed() -> Self {
        Self::new(ClockMode::Fixed { step_secs: STEP_DT })
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Total steps issued since creation
    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Request the steps owed for a frame that took `elapsed_secs`
    ///
    /// Returns zero once the clock is stopped. A non-finite frame time counts
    /// as zero, and a fixed clock with an invalid step never issues steps.
    pub fn frame(&mut self, elapsed_secs: f32) -> u32 {
        if !self.running {
            return 0;
        }

        let steps = match self.mode {
            ClockMode::PerFrame => 1,
            ClockMode::Fixed { .. } if self.mode.validate().is_err() => 0,
            ClockMode::Fixed { step_secs } => {
                let elapsed = if elapsed_secs.is_finite() { elapsed_secs } else { 0.0 };
                // Clamp long stalls (tab switches, debugger pauses)
                self.accumulator += elapsed.clamp(0.0, 0.25);

                let mut steps = 0;
                while self.accumulator >= step_secs && steps < MAX_SUBSTEPS {
                    self.accumulator -= step_secs;
                    steps += 1;
                }
                if steps == MAX_SUBSTEPS {
                    // Drop the backlog rather than spiral
                    self.accumulator = self.accumulator.min(step_secs);
                }
                steps
            }
        };

        self.issued += u64::from(steps);
        steps
    }

    /// Release the subscription; no further steps are issued
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    /// Resume issuing steps with an empty accumulator
    pub fn restart(&mut self) {
        self.running = true;
        self.accumulator = 0.0;
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new(ClockMode::default())
    }
}
