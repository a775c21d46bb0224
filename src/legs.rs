// Per-leg configuration table
// Replaces six hand-unrolled leg calls with one row per leg, iterated uniformly.

use serde::{Deserialize, Serialize};

use crate::config::NeuralConfig;
use crate::gait::LegAngles;
use crate::neural::{LegDrive, RobotState, LEG_COUNT};

/// Which tripod drive pair of the oscillator network feeds a leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivePair {
    /// Oscillators 5 (horizontal) and 8 (vertical)
    A,
    /// Oscillators 6 (horizontal) and 9 (vertical)
    B,
}

impl DrivePair {
    pub fn xy_index(&self) -> usize {
        match self {
            DrivePair::A => 5,
            DrivePair::B => 6,
        }
    }

    pub fn z_index(&self) -> usize {
        match self {
            DrivePair::A => 8,
            DrivePair::B => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegConfig {
    /// Multiplier applied to all three published joint angles (+1 or -1)
    pub output_sign: f32,
    /// Body side of the neural drive (+1 or -1)
    pub side: f32,
    pub pair: DrivePair,
    /// Weight of the turn neuron on the stance length target
    pub turn_weight: f32,
    /// Resting coxa drive (degrees)
    pub coxa_offset: f32,
}

/// One row per leg, index 0..5
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegTable {
    pub legs: [LegConfig; LEG_COUNT],
}

impl Default for LegTable {
    fn default() -> Self {
        Self::split_halves()
    }
}

/// Neural rows: (side, pair, turn weight, coxa offset)
const NEURAL_ROWS: [(f32, DrivePair, f32, f32); LEG_COUNT] = [
    (1.0, DrivePair::A, -0.1, 50.0),
    (-1.0, DrivePair::A, 0.0, 0.0),
    (1.0, DrivePair::A, 0.1, -50.0),
    (-1.0, DrivePair::B, -0.1, -50.0),
    (1.0, DrivePair::B, 0.0, 0.0),
    (-1.0, DrivePair::B, 0.1, 50.0),
];

impl LegTable {
    fn with_signs(signs: [f32; LEG_COUNT]) -> Self {
        let legs = std::array::from_fn(|i| {
            let (side, pair, turn_weight, coxa_offset) = NEURAL_ROWS[i];
            LegConfig {
                output_sign: signs[i],
                side,
                pair,
                turn_weight,
                coxa_offset,
            }
        });
        Self { legs }
    }

    /// Legs 0-2 published as-is, legs 3-5 mirrored
    pub fn split_halves() -> Self {
        Self::with_signs([1.0, 1.0, 1.0, -1.0, -1.0, -1.0])
    }

    /// Even legs published as-is, odd legs mirrored
    pub fn parity() -> Self {
        Self::with_signs([1.0, -1.0, 1.0, -1.0, 1.0, -1.0])
    }

    /// Identity output convention
    pub fn unsigned() -> Self {
        Self::with_signs([1.0; LEG_COUNT])
    }

    /// Apply each leg's output sign
    pub fn publish(&self, angles: &[LegAngles; LEG_COUNT]) -> [LegAngles; LEG_COUNT] {
        std::array::from_fn(|i| angles[i].scaled(self.legs[i].output_sign))
    }

    /// Drive signals of leg `leg` from the freshly updated neural state
    pub fn drive(&self, leg: usize, state: &RobotState, cfg: &NeuralConfig) -> LegDrive {
        let row = &self.legs[leg];
        let n = &state.neurons;
        let osc_xy = state.oscillators[row.pair.xy_index()];
        let osc_z = state.oscillators[row.pair.z_index()];
        let swing = row.side * osc_xy * cfg.drive_gain;
        let heading = if row.side > 0.0 { n.dir1 } else { n.dir2 };

        LegDrive {
            target_length: cfg.stance_target + swing * (n.dir3 + row.turn_weight * n.dir4),
            cpg_xy: swing * heading + row.coxa_offset,
            cpg_z: cfg.lift_gain * osc_z,
        }
    }
}
