// Central pattern generator: ten coupled first-order oscillator variables
//
// 0..3  two rational half-center pairs (fast 0/1, slow adaptation 2/3)
// 4, 7  slow common-mode trackers
// 5, 6  tripod drive pair (horizontal), clamped to [-U_XY, U_XY]
// 8, 9  tripod drive pair (vertical), clamped to [-U_Z, U_Z]

use serde::{Deserialize, Serialize};

use super::state::OSCILLATOR_COUNT;

const GAIN: f32 = 100.0; // Ao
const HALF_SAT: f32 = 120.0; // Bo
const ADAPT_GAIN: f32 = 1.5; // Co
const CROSS_GAIN: f32 = 2.7; // Do
const CROSS_BIAS: f32 = 150.0;
const TAU_1: f32 = 8.0;
const TAU_2: f32 = 16.0;
const TAU_SLOW: f32 = 150.0;
const TRACK_GAIN: f32 = 1.01;
const LIFT_GAIN: f32 = 1.2;

/// Bound of the horizontal drive pair (5, 6)
pub const U_XY: f32 = 2.0;
/// Bound of the vertical drive pair (8, 9)
pub const U_Z: f32 = 2.0;

/// Which clamped outputs hit their bound during an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saturation {
    pub xy_a: bool,
    pub xy_b: bool,
    pub z_a: bool,
    pub z_b: bool,
}

impl Saturation {
    pub fn any(&self) -> bool {
        self.xy_a || self.xy_b || self.z_a || self.z_b
    }
}

/// Saturating cross-inhibition from the partner oscillator
fn inhibition(partner: f32, adaptation: f32) -> f32 {
    let drive = (CROSS_BIAS - CROSS_GAIN * partner).powi(2);
    GAIN * drive / ((HALF_SAT + adaptation).powi(2) + drive)
}

fn clamp_flag(value: f32, bound: f32) -> (f32, bool) {
    let clamped = value.clamp(-bound, bound);
    (clamped, clamped != value)
}

/// Advance the oscillator network by one explicit Euler step of `dt`
pub fn update(x: &mut [f32; OSCILLATOR_COUNT], dt: f32) -> Saturation {
    let k1 = dt / TAU_1;
    let k2 = dt / TAU_2;
    let ks = dt / TAU_SLOW;
    let kz = dt / (TAU_SLOW * 0.5);

    // Sequential in-place updates: later rows see the fresh earlier values
    x[0] += k1 * (-x[0] + inhibition(x[1], x[2]));
    x[1] += k2 * (-x[1] + inhibition(x[0], x[3]));

    x[2] += ks * (-x[2] + ADAPT_GAIN * x[0]);
    x[3] += ks * (-x[3] + ADAPT_GAIN * x[1]);

    x[4] += ks * (-x[4] + TRACK_GAIN * (0.5 * x[0] + 0.5 * x[1]));
    let (v5, xy_a) = clamp_flag(x[5] + ks * (-x[5] + x[0] - x[4]), U_XY);
    let (v6, xy_b) = clamp_flag(x[6] + ks * (-x[6] + x[1] - x[4]), U_XY);
    x[5] = v5;
    x[6] = v6;

    x[7] += ks * (-x[7] + TRACK_GAIN * (0.5 * x[2] + 0.5 * x[3]));
    let (v8, z_a) = clamp_flag(x[8] + kz * (-x[8] + LIFT_GAIN * (x[2] - x[7])), U_Z);
    let (v9, z_b) = clamp_flag(x[9] + kz * (-x[9] + LIFT_GAIN * (x[3] - x[7])), U_Z);
    x[8] = v8;
    x[9] = v9;

    Saturation {
        xy_a,
        xy_b,
        z_a,
        z_b,
    }
}
