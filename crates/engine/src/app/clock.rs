use std::time::Duration;

/// Simulation time as seen by actors: the step just taken and the total so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameTime {
    delta: Duration,
    elapsed: Duration,
    ticks: u64,
}

impl GameTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed = self.elapsed.saturating_add(delta);
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
