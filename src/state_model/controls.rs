/// A complete, internally consistent set of pilot inputs.
///
/// Every constructor clamps to the declared ranges, so a published value is
/// always usable as-is. Fields are read through accessors; a change of input
/// is a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInputs {
    throttle: f64,
    elevator: f64,
    aileron: f64,
    rudder: f64,
    flaps: f64,
    gear: f64,
}

impl ControlInputs {
    pub fn new(throttle: f64, elevator: f64, aileron: f64, rudder: f64) -> Self {
        ControlInputs {
            throttle: clamp_unit(throttle),
            elevator: clamp_signed(elevator),
            aileron: clamp_signed(aileron),
            rudder: clamp_signed(rudder),
            flaps: 0.0,
            gear: 1.0,
        }
    }

    pub fn with_flaps(self, flaps: f64) -> Self {
        ControlInputs {
            flaps: clamp_unit(flaps),
            ..self
        }
    }

    pub fn with_gear(self, gear: f64) -> Self {
        ControlInputs {
            gear: clamp_unit(gear),
            ..self
        }
    }

    pub fn with_throttle(self, throttle: f64) -> Self {
        ControlInputs {
            throttle: clamp_unit(throttle),
            ..self
        }
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn elevator(&self) -> f64 {
        self.elevator
    }

    pub fn aileron(&self) -> f64 {
        self.aileron
    }

    pub fn rudder(&self) -> f64 {
        self.rudder
    }

    pub fn flaps(&self) -> f64 {
        self.flaps
    }

    /// 1.0 is gear down.
    pub fn gear(&self) -> f64 {
        self.gear
    }
}

impl Default for ControlInputs {
    fn default() -> Self {
        ControlInputs::new(0.0, 0.0, 0.0, 0.0)
    }
}

// NaN collapses to the neutral position rather than leaking into the model.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn clamp_signed(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}
