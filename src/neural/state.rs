// Aggregate numeric state of the neural gait pipeline
// Owned by the controller and threaded through stimuli -> cpg -> locomotion every tick.

use serde::{Deserialize, Serialize};

use crate::gait::LegAngles;

pub const OSCILLATOR_COUNT: usize = 10;
pub const LEG_COUNT: usize = 6;

/// Initial stance length estimate for a freshly created robot
pub const INITIAL_STANCE_LENGTH: f32 = 20.0;

/// Per-leg integrator state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegState {
    /// Coxa command angle (degrees)
    pub coxa: f32,
    /// Femur command angle (degrees)
    pub femur: f32,
    /// Tibia command angle (degrees)
    pub tibia: f32,
    /// Stance error estimate
    pub stance_error: f32,
    /// Integral of the stance error
    pub stance_integral: f32,
    /// Projected stance length
    pub stance_length: f32,
    /// Femur length projected on the horizontal plane
    pub femur_projection: f32,
    /// Tibia length projected on the horizontal plane
    pub tibia_projection: f32,
}

impl LegState {
    pub fn angles(&self) -> LegAngles {
        LegAngles::new(self.coxa, self.femur, self.tibia)
    }
}

/// Command and direction interneurons
///
/// Intent neurons (`fw`..`mov`, `dir4`) are firing rates in [0, 1];
/// `dir1`..`dir3` are signed biases in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Interneurons {
    pub fw: f32,
    pub bw: f32,
    pub tl: f32,
    pub tr: f32,
    pub l: f32,
    pub r: f32,
    pub mov: f32,
    pub dir1: f32,
    pub dir2: f32,
    pub dir3: f32,
    pub dir4: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotState {
    pub oscillators: [f32; OSCILLATOR_COUNT],
    pub legs: [LegState; LEG_COUNT],
    pub neurons: Interneurons,
}

impl RobotState {
    /// All-zero state
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero state with every stance length estimate set to `stance_length`
    pub fn seeded(stance_length: f32) -> Self {
        let mut state = Self::new();
        for leg in &mut state.legs {
            leg.stance_length = stance_length;
        }
        state
    }

    /// Current command angles of every leg
    pub fn joint_angles(&self) -> [LegAngles; LEG_COUNT] {
        self.legs.map(|leg| leg.angles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero() {
        let s = RobotState::new();
        assert!(s.oscillators.iter().all(|&v| v == 0.0));
        assert!(s.legs.iter().all(|l| *l == LegState::default()));
        assert_eq!(s.neurons, Interneurons::default());
    }

    #[test]
    fn test_seeded_sets_only_stance_length() {
        let s = RobotState::seeded(INITIAL_STANCE_LENGTH);
        for leg in &s.legs {
            assert_eq!(leg.stance_length, 20.0);
            assert_eq!(leg.angles(), LegAngles::default());
        }
    }
}
