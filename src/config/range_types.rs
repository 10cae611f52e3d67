use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// An agent movement speed constrained to [0.1, 50.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct MoveSpeed(f32);

impl MoveSpeed {
    const MIN: f32 = 0.1;
    const MAX: f32 = 50.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for MoveSpeed {
    fn default() -> Self {
        Self::new(4.0)
    }
}

/// A mover stopping distance constrained to [0.0, 2.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct StoppingDistance(f32);

impl StoppingDistance {
    const MIN: f32 = 0.0;
    const MAX: f32 = 2.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for StoppingDistance {
    fn default() -> Self {
        Self::new(0.05)
    }
}

/// Remaining distance at which a waypoint counts as reached, constrained to [0.0, 5.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct ArrivalTolerance(f32);

impl ArrivalTolerance {
    const MIN: f32 = 0.0;
    const MAX: f32 = 5.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ArrivalTolerance {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Radius of a waypoint's proximity sensor, constrained to [0.1, 10.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct TriggerRadius(f32);

impl TriggerRadius {
    const MIN: f32 = 0.1;
    const MAX: f32 = 10.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TriggerRadius {
    fn default() -> Self {
        Self::new(0.5)
    }
}
