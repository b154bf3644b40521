use crate::config::{MAX_PHYSICS_STEPS_PER_FRAME, PHYSICS_FRAME_TIME};

/// Turns variable frame times into whole fixed simulation steps.
#[derive(Clone, Debug)]
pub struct SimulationClock {
    step: f32,
    elapsed: f32,
    paused: bool,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(PHYSICS_FRAME_TIME)
    }
}

impl SimulationClock {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            elapsed: 0.0,
            paused: false,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stops scheduling steps and drops any time already accumulated.
    pub fn pause(&mut self) {
        self.paused = true;
        self.elapsed = 0.0;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Number of steps to run for a frame that took `frame_time` seconds.
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        if self.paused || !frame_time.is_finite() || frame_time <= 0.0 {
            return 0;
        }
        self.elapsed += frame_time;
        let mut steps = 0;
        while self.elapsed >= self.step {
            self.elapsed -= self.step;
            steps += 1;
            if steps == MAX_PHYSICS_STEPS_PER_FRAME {
                // drop the backlog instead of spiralling
                self.elapsed = 0.0;
                break;
            }
        }
        steps
    }
}
