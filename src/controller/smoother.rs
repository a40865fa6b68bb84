/// Converges a live parameter toward a target over several frames
///
/// `value()` reports the target, since smoothing happens behind the scenes;
/// `current()` is what the simulation should use this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSmoother {
    current_value: f32,
    target_value: f32,
    convergence_factor: f32,
    min: f32,
    max: f32,
}

/// Distance below which the current value snaps to the target
const SNAP_DISTANCE: f32 = 0.0001;

impl ParameterSmoother {
    pub fn new(value: f32, (min, max): (f32, f32), convergence_factor: f32) -> Self {
        let value = value.clamp(min, max);
        Self {
            current_value: value,
            target_value: value,
            convergence_factor,
            min,
            max,
        }
    }

    pub fn value(&self) -> f32 {
        self.target_value
    }

    pub fn current(&self) -> f32 {
        self.current_value
    }

    pub fn set_value(&mut self, value: f32) {
        self.target_value = value.clamp(self.min, self.max);
    }

    pub fn set_value_immediate(&mut self, value: f32) {
        self.target_value = value.clamp(self.min, self.max);
        self.current_value = self.target_value;
    }

    pub fn set_convergence_factor(&mut self, value: f32) {
        self.convergence_factor = value;
    }

    /// Step toward the target; returns the new current value
    pub fn update(&mut self) -> f32 {
        if self.current_value != self.target_value {
            self.current_value += (self.target_value - self.current_value) * self.convergence_factor;
            if (self.current_value - self.target_value).abs() < SNAP_DISTANCE {
                self.current_value = self.target_value;
            }
        }
        self.current_value
    }
}
