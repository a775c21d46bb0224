// Explicit tripod gait: six foot targets per phase sample
//
// Two tripods move 180° out of phase. Each foot target is one of four phase
// vectors rotated by a heading-dependent angle, plus a per-leg footprint offset.

use std::f32::consts::{FRAC_PI_4, PI, TAU};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Phase wraps back to zero once it reaches this value
pub const PHASE_WRAP: f32 = 60.0 * PI;

/// Phase advance per unit of simulation time step `dt`
pub const PHASE_RATE: f32 = 60.0 * PI / 1000.0;

/// Footprint offsets are expressed in tenths
const FOOTPRINT_SCALE: f32 = 0.1;

/// Error types for rejected gait parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GaitParamsError {
    #[error("Side direction w must be +1 or -1, got {0}")]
    InvalidSideSign(f32),

    #[error("Gait parameter {0} is not finite")]
    NonFinite(&'static str),
}

/// Parameters of the explicit gait, supplied every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitParameters {
    /// Stride speed (fore-aft amplitude)
    pub d: f32,
    /// Vertical lift amplitude
    pub al: f32,
    /// Secondary fore-aft amplitude
    pub n: f32,
    /// Direction sign of the second side, +1 or -1
    pub w: f32,
    /// Heading (radians)
    pub rs: f32,
    /// Turn orientation
    pub ra: f32,
    /// Turn curvature
    pub c: f32,
    /// Phase accumulator
    pub k: f32,
    /// Body height offset
    pub hb: f32,
    /// Body width scale
    pub wb: f32,
}

impl Default for GaitParameters {
    fn default() -> Self {
        Self {
            d: 40.0,
            al: 60.0,
            n: 20.0,
            w: 1.0,
            rs: 0.0,
            ra: 0.0,
            c: 0.0,
            k: 0.0,
            hb: -2.0,
            wb: 1.0,
        }
    }
}

impl GaitParameters {
    /// Check the parameters a command may carry; the phase `k` is ignored
    pub fn validate(&self) -> Result<(), GaitParamsError> {
        let fields = [
            ("d", self.d),
            ("al", self.al),
            ("n", self.n),
            ("w", self.w),
            ("rs", self.rs),
            ("ra", self.ra),
            ("c", self.c),
            ("hb", self.hb),
            ("wb", self.wb),
        ];
        if let Some(&(name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(GaitParamsError::NonFinite(name));
        }
        if self.w != 1.0 && self.w != -1.0 {
            return Err(GaitParamsError::InvalidSideSign(self.w));
        }
        Ok(())
    }

    /// Advance the phase by one tick of length `dt`, wrapping at [`PHASE_WRAP`]
    pub fn advance_phase(&mut self, dt: f32) {
        self.k += PHASE_RATE * dt;
        if self.k >= PHASE_WRAP {
            self.k = 0.0;
        }
    }

    /// Fore-aft excursion profile
    fn fp(&self, x: f32) -> f32 {
        let cos = x.cos();
        self.d * x.sin() + self.n * x.sin() * cos * cos
    }

    /// Lateral arc bias for a given fore-aft excursion
    fn lateral(&self, excursion: f32) -> f32 {
        // Without stride speed the ratio is undefined; treat it as zero
        let ratio = if self.d != 0.0 { excursion / self.d } else { 0.0 };
        self.c * ratio.cos()
    }
}

/// The four phase vectors before rotation and footprint offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripodVectors {
    /// Right side, phase k
    pub rd: Vec3,
    /// Right side, phase k + π
    pub bd: Vec3,
    /// Left side, phase w·k
    pub ri: Vec3,
    /// Left side, phase w·k + π
    pub bi: Vec3,
}

pub fn tripod_vectors(p: &GaitParameters) -> TripodVectors {
    let k = p.k;
    let wk = p.w * p.k;

    let side = |phase: f32, lift_phase: f32, lateral_sign: f32| {
        let excursion = p.fp(phase);
        Vec3::new(
            lateral_sign * p.lateral(excursion),
            excursion,
            p.al * lift_phase.cos(),
        )
    };

    TripodVectors {
        rd: side(k, k, 1.0),
        bd: side(k + PI, k + PI, 1.0),
        ri: side(wk, k, -1.0),
        bi: side(wk + PI, k + PI, -1.0),
    }
}

#[derive(Debug, Clone, Copy)]
enum PhaseVector {
    Rd,
    Bd,
    Ri,
    Bi,
}

#[derive(Debug, Clone, Copy)]
enum Heading {
    /// rs + ra·π/4
    Front,
    /// rs
    Center,
    /// rs − ra·π/4
    Rear,
}

/// Per-leg trajectory layout: (heading, phase vector, footprint [x, y])
const LAYOUT: [(Heading, PhaseVector, [f32; 2]); 6] = [
    (Heading::Front, PhaseVector::Bi, [2.0, 1.7]),
    (Heading::Center, PhaseVector::Ri, [2.5, 0.0]),
    (Heading::Rear, PhaseVector::Bi, [2.0, -1.7]),
    (Heading::Rear, PhaseVector::Rd, [-2.0, 1.7]),
    (Heading::Center, PhaseVector::Bd, [-2.5, 0.0]),
    (Heading::Front, PhaseVector::Rd, [-2.0, -1.7]),
];

/// Compute the six foot targets for phase `p.k`
///
/// Stateless and periodic in `k` with period 2π.
pub fn trajectory(p: &GaitParameters) -> [Vec3; 6] {
    let v = tripod_vectors(p);
    let turn = p.ra * FRAC_PI_4;

    let front = Quat::from_rotation_z(p.rs + turn);
    let center = Quat::from_rotation_z(p.rs);
    let rear = Quat::from_rotation_z(p.rs - turn);

    LAYOUT.map(|(heading, which, [fx, fy])| {
        let rot = match heading {
            Heading::Front => front,
            Heading::Center => center,
            Heading::Rear => rear,
        };
        let vec = match which {
            PhaseVector::Rd => v.rd,
            PhaseVector::Bd => v.bd,
            PhaseVector::Ri => v.ri,
            PhaseVector::Bi => v.bi,
        };
        let footprint = Vec3::new(fx * p.wb, fy, p.hb) * FOOTPRINT_SCALE;
        rot * vec + footprint
    })
}

/// Period of the trajectory in `k`
pub const PERIOD: f32 = TAU;
