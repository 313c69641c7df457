use std::ops::Add;

use crate::utils::vector3d::Vector3;

/// Body-axis force (N) and moment (N·m) acting over one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForcesMoments {
    pub force: Vector3,
    pub moment: Vector3,
}

impl ForcesMoments {
    pub fn new(force: Vector3, moment: Vector3) -> Self {
        ForcesMoments { force, moment }
    }
}

impl Add for ForcesMoments {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        ForcesMoments::new(self.force + other.force, self.moment + other.moment)
    }
}
