// Interneuron layer: raw commands -> mutually inhibiting intent and direction neurons

use serde::{Deserialize, Serialize};

use super::state::{Interneurons, RobotState};

/// Naka-Rushton parameters
const NR_GAIN: f32 = 1.0;
const NR_SIGMA: f32 = 0.5;
const NR_EXPONENT: i32 = 2;

/// Leaky integrator time constant of every interneuron
const TAU: f32 = 10.0;

/// Weight of the total intent activity on the movement neuron
const MOV_WEIGHT: f32 = 5.0;

/// Raw command intensities (unitless, typically 0..10)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuralCommands {
    pub go: f32,
    pub back: f32,
    pub spin_left: f32,
    pub spin_right: f32,
    pub left: f32,
    pub right: f32,
}

impl NeuralCommands {
    pub fn forward(go: f32) -> Self {
        Self {
            go,
            ..Self::default()
        }
    }
}

/// Saturating firing-rate nonlinearity; negative (or NaN) drive is silent
///
/// Evaluated as `g / (1 + (σ/x)^n)`, which equals `g·x^n / (x^n + σ^n)` but
/// cannot overflow for huge inputs.
pub fn naka_rushton(x: f32) -> f32 {
    if !(x > 0.0) {
        return 0.0;
    }
    NR_GAIN / (1.0 + (NR_SIGMA / x).powi(NR_EXPONENT))
}

#[inline]
fn relax(neuron: &mut f32, target: f32, dt: f32) {
    *neuron += (dt / TAU) * (-*neuron + target);
}

/// Advance the interneuron layer of `state` by `dt`
pub fn update(state: &mut RobotState, cmd: &NeuralCommands, dt: f32) {
    step(&mut state.neurons, cmd, dt);
}

fn step(s: &mut Interneurons, cmd: &NeuralCommands, dt: f32) {
    // Drives are computed from the previous tick's rates
    let fw_in = cmd.go - s.bw - s.tl - s.tr;
    let bw_in = cmd.back - s.fw - s.tl - s.tr;
    let tl_in = cmd.spin_left - s.bw - s.fw - s.tr;
    let tr_in = cmd.spin_right - s.bw - s.fw - s.tl;
    let l_in = cmd.left - s.r;
    let r_in = cmd.right - s.l;
    let mov_in = MOV_WEIGHT * (s.fw + s.bw + s.tl + s.tr + s.l + s.r);
    let dir4_in = s.tl + s.tr;

    relax(&mut s.fw, naka_rushton(fw_in), dt);
    relax(&mut s.bw, naka_rushton(bw_in), dt);
    relax(&mut s.tl, naka_rushton(tl_in), dt);
    relax(&mut s.tr, naka_rushton(tr_in), dt);
    relax(&mut s.l, naka_rushton(l_in), dt);
    relax(&mut s.r, naka_rushton(r_in), dt);
    relax(&mut s.mov, naka_rushton(mov_in), dt);
    relax(&mut s.dir4, naka_rushton(dir4_in), dt);

    // Direction neurons read the freshly updated intents
    let dir1_in = s.fw + s.tl - s.bw - s.tr;
    let dir2_in = s.fw - s.tl - s.bw + s.tr;
    let dir3_in = s.r - s.l;

    relax(&mut s.dir1, dir1_in.tanh(), dt);
    relax(&mut s.dir2, dir2_in.tanh(), dt);
    relax(&mut s.dir3, dir3_in.tanh(), dt);
}
