// Per-leg multi-rate integrator: oscillator drive + stance target -> joint angles
//
// One call is one control tick, subdivided into many inner Euler sub-steps so the
// leg reaches a quasi-steady state before its angles are read out. Stance and
// swing are not discrete states: they emerge from sigmoid gating of the vertical
// drive.

use serde::{Deserialize, Serialize};

use super::state::LegState;
use crate::gait::LegGeometry;

/// Inner time constant of the fast variables
const TAU_FAST: f32 = 5.0;
/// Inner time constant of the lite model's femur/tibia
const TAU_LITE_JOINT: f32 = 30.0;

/// Sub-step index after which the stance-error loop closes
const STANCE_GATE_STEP: usize = 25;

/// Scale of the vertical drive inside the sigmoid gates
const LIFT_SCALE: f32 = 6.0;

const FULL_SUBSTEPS: usize = 150;
const LITE_SUBSTEPS: usize = 50;

/// Integrator revision used for every leg
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorModel {
    /// 150 sub-steps with the stance-error integral
    #[default]
    Full,
    /// 50 sub-steps, proportional stance error only
    Lite,
}

impl IntegratorModel {
    pub fn substeps(&self) -> usize {
        match self {
            IntegratorModel::Full => FULL_SUBSTEPS,
            IntegratorModel::Lite => LITE_SUBSTEPS,
        }
    }
}

/// Drive signals for one leg during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegDrive {
    /// Desired stance length
    pub target_length: f32,
    /// Horizontal (coxa) drive
    pub cpg_xy: f32,
    /// Vertical (lift) drive
    pub cpg_z: f32,
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[inline]
fn relax(value: &mut f32, target: f32, rate: f32) {
    *value += rate * (-*value + target);
}

/// Advance one leg by one control tick
pub fn update(
    leg: &mut LegState,
    drive: LegDrive,
    geometry: &LegGeometry,
    model: IntegratorModel,
    dt: f32,
) {
    let steps = model.substeps();
    match model {
        IntegratorModel::Full => run_full(leg, drive, geometry, dt, steps),
        IntegratorModel::Lite => run_lite(leg, drive, geometry, dt, steps),
    }
}

fn run_full(leg: &mut LegState, drive: LegDrive, g: &LegGeometry, dt: f32, steps: usize) {
    let rate = dt / TAU_FAST;
    let stance_gate = sigmoid(drive.cpg_z / LIFT_SCALE);
    let swing_gate = sigmoid(-drive.cpg_z / LIFT_SCALE);
    let coxa_target = drive.cpg_xy.atan2(drive.target_length).to_degrees();

    for i in 0..steps {
        let e = leg.stance_error;
        let ei = leg.stance_integral;

        let femur_target = (e + 0.34 * ei) * stance_gate;
        let integral_target = e + ei;
        let tibia_target = -leg.femur - 90.0 * stance_gate + (e + 0.2 * ei) * swing_gate;

        let length_target =
            (g.coxa + leg.femur_projection + leg.tibia_projection) * leg.coxa.to_radians().cos();
        let error_target = if i > STANCE_GATE_STEP {
            drive.target_length - leg.stance_length
        } else {
            0.0
        };
        let femur_proj_target = g.femur * leg.femur.to_radians().cos();
        let tibia_proj_target = g.tibia * (leg.femur + leg.tibia).to_radians().cos();

        relax(&mut leg.coxa, coxa_target, rate);
        relax(&mut leg.femur, femur_target, rate);
        relax(&mut leg.tibia, tibia_target, rate);
        relax(&mut leg.stance_error, error_target, rate);
        relax(&mut leg.stance_integral, integral_target, rate);

        relax(&mut leg.stance_length, length_target, rate);
        relax(&mut leg.femur_projection, femur_proj_target, rate);
        relax(&mut leg.tibia_projection, tibia_proj_target, rate);
    }
}

fn run_lite(leg: &mut LegState, drive: LegDrive, g: &LegGeometry, dt: f32, steps: usize) {
    let rate = dt / TAU_FAST;
    let joint_rate = dt / TAU_LITE_JOINT;
    let lift = (drive.cpg_z.powi(3) / 9.0).tanh();

    for i in 0..steps {
        let femur_target = (leg.femur * 0.35 + 5.5 * leg.stance_error) * lift + drive.cpg_z;
        let tibia_target = -femur_target - 90.0;

        let length_target = (g.coxa + leg.femur_projection) * leg.coxa.to_radians().cos();
        let error_target = if i > STANCE_GATE_STEP {
            drive.target_length - leg.stance_length
        } else {
            0.0
        };
        let femur_proj_target = g.femur * leg.femur.to_radians().cos();
        let tibia_proj_target = g.tibia * (leg.femur + leg.tibia).to_radians().cos();

        relax(&mut leg.coxa, drive.cpg_xy, rate);
        relax(&mut leg.femur, (femur_target / 60.0).tanh() * 180.0, joint_rate);
        relax(&mut leg.tibia, tibia_target, joint_rate);
        relax(&mut leg.stance_error, error_target, rate);

        relax(&mut leg.stance_length, length_target, rate);
        relax(&mut leg.femur_projection, femur_proj_target, rate);
        relax(&mut leg.tibia_projection, tibia_proj_target, rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn drive(target_length: f32, cpg_xy: f32, cpg_z: f32) -> LegDrive {
        LegDrive {
            target_length,
            cpg_xy,
            cpg_z,
        }
    }

    #[test]
    fn test_substep_counts() {
        assert_eq!(IntegratorModel::Full.substeps(), 150);
        assert_eq!(IntegratorModel::Lite.substeps(), 50);
        assert_eq!(IntegratorModel::default(), IntegratorModel::Full);
    }

    #[test]
    fn test_coxa_settles_on_drive_heading() {
        let g = LegGeometry::default();
        let mut leg = LegState::default();
        for _ in 0..20 {
            update(&mut leg, drive(100.0, 100.0, 0.0), &g, IntegratorModel::Full, 1.0);
        }
        assert_abs_diff_eq!(leg.coxa, 45.0, epsilon = 1e-2);
        assert!(leg.angles().is_finite());
    }

    #[test]
    fn test_stance_error_waits_for_gate() {
        // Sub-steps 0..=25 hold the error target at zero; the 27th is the first
        // to see the stance-length mismatch
        let g = LegGeometry::default();
        let seeded = LegState {
            stance_length: 20.0,
            ..LegState::default()
        };
        let d = drive(100.0, 0.0, 0.0);

        let mut closed = seeded;
        run_full(&mut closed, d, &g, 1.0, STANCE_GATE_STEP + 1);
        assert_eq!(closed.stance_error, 0.0);
        let mut open = seeded;
        run_full(&mut open, d, &g, 1.0, STANCE_GATE_STEP + 2);
        assert!(open.stance_error != 0.0);

        let mut closed = seeded;
        run_lite(&mut closed, d, &g, 1.0, STANCE_GATE_STEP + 1);
        assert_eq!(closed.stance_error, 0.0);
        let mut open = seeded;
        run_lite(&mut open, d, &g, 1.0, STANCE_GATE_STEP + 2);
        assert!(open.stance_error != 0.0);
    }

    #[test]
    fn test_lift_gate_bends_tibia() {
        // Positive vertical drive pulls the tibia towards -femur - 90,
        // negative drive leaves the femur gate closed
        let g = LegGeometry::default();
        let seeded = LegState {
            stance_length: 20.0,
            ..LegState::default()
        };

        let mut lifted = seeded;
        update(&mut lifted, drive(100.0, 0.0, 60.0), &g, IntegratorModel::Full, 0.05);
        let mut lowered = seeded;
        update(&mut lowered, drive(100.0, 0.0, -60.0), &g, IntegratorModel::Full, 0.05);

        assert!(lifted.tibia < -60.0, "tibia = {}", lifted.tibia);
        assert!(lowered.tibia > 0.0, "tibia = {}", lowered.tibia);
        assert!(lowered.femur.abs() < 1e-2);
        assert!(lifted.femur > 1.0);
    }

    #[test]
    fn test_lite_coxa_tracks_raw_drive() {
        let g = LegGeometry::default();
        let mut leg = LegState::default();
        for _ in 0..20 {
            update(&mut leg, drive(100.0, 30.0, 0.0), &g, IntegratorModel::Lite, 1.0);
        }
        assert_abs_diff_eq!(leg.coxa, 30.0, epsilon = 1e-2);
        assert_eq!(leg.stance_integral, 0.0);
    }

    #[test]
    fn test_lite_swing_posture() {
        let g = LegGeometry::default();
        let mut leg = LegState::default();
        for _ in 0..40 {
            update(&mut leg, drive(0.0, 0.0, 0.0), &g, IntegratorModel::Lite, 1.0);
        }
        // Zero drive: femur rests at 0 and tibia at -90
        assert_abs_diff_eq!(leg.femur, 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(leg.tibia, -90.0, epsilon = 0.5);
    }
}
