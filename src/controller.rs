// Gait controller: selects the explicit or the neural pipeline each tick
//
// Trajectory mode: gait parameters -> six foot targets -> per-leg IK.
// Neural mode: commands -> stimuli -> cpg -> six leg integrators.
// The two pipelines are mutually exclusive within one tick.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{NeuralConfig, RobotConfig};
use crate::gait::{self, GaitParameters, LegAngles, LegGeometry};
use crate::legs::LegTable;
use crate::neural::state::INITIAL_STANCE_LENGTH;
use crate::neural::{
    cpg, locomotion, stimuli, Interneurons, NeuralCommands, RobotState, Saturation, LEG_COUNT,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Parametric trajectory + inverse kinematics
    Trajectory,
    /// Oscillator network + leg integrators
    #[default]
    Neural,
}

/// Read-only snapshot of the controller for monitoring layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub mode: ControlMode,
    pub tick: u64,
    pub phase: f32,
    pub oscillators: [f32; 10],
    pub neurons: Interneurons,
    /// Angles before the per-leg output sign
    pub raw_angles: [LegAngles; LEG_COUNT],
    /// Angles as published
    pub angles: [LegAngles; LEG_COUNT],
    /// Legs whose IK target was out of reach on the last trajectory tick
    pub ik_clamped: [bool; LEG_COUNT],
    pub cpg_saturation: Saturation,
}

pub struct GaitController {
    mode: ControlMode,
    geometry: LegGeometry,
    legs: LegTable,
    neural_cfg: NeuralConfig,
    state: RobotState,
    gait: GaitParameters,
    commands: NeuralCommands,
    raw_angles: [LegAngles; LEG_COUNT],
    ik_clamped: [bool; LEG_COUNT],
    saturation: Saturation,
    tick: u64,
}

impl GaitController {
    /// Create a controller from a validated config
    pub fn new(config: RobotConfig) -> Self {
        Self {
            mode: ControlMode::default(),
            geometry: config.geometry,
            legs: config.legs,
            neural_cfg: config.neural,
            state: RobotState::seeded(INITIAL_STANCE_LENGTH),
            gait: GaitParameters::default(),
            commands: NeuralCommands::default(),
            raw_angles: [LegAngles::default(); LEG_COUNT],
            ik_clamped: [false; LEG_COUNT],
            saturation: Saturation::default(),
            tick: 0,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        if mode != self.mode {
            info!("Switching gait mode: {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn set_commands(&mut self, commands: NeuralCommands) {
        self.commands = commands;
    }

    pub fn commands(&self) -> &NeuralCommands {
        &self.commands
    }

    /// Replace the gait parameters; the controller keeps its own phase
    pub fn set_gait_parameters(&mut self, params: GaitParameters) {
        let k = self.gait.k;
        self.gait = GaitParameters { k, ..params };
    }

    pub fn gait_parameters(&self) -> &GaitParameters {
        &self.gait
    }

    pub fn state(&self) -> &RobotState {
        &self.state
    }

    /// Run one control tick of the active pipeline; returns published angles
    pub fn tick(&mut self, dt: f32) -> [LegAngles; LEG_COUNT] {
        self.step(dt, true)
    }

    /// Tick without advancing the trajectory phase
    pub fn hold(&mut self, dt: f32) -> [LegAngles; LEG_COUNT] {
        self.step(dt, false)
    }

    fn step(&mut self, dt: f32, advance: bool) -> [LegAngles; LEG_COUNT] {
        self.raw_angles = match self.mode {
            ControlMode::Trajectory => self.trajectory_tick(dt, advance),
            ControlMode::Neural => self.neural_tick(dt),
        };
        self.tick += 1;
        self.legs.publish(&self.raw_angles)
    }

    fn trajectory_tick(&mut self, dt: f32, advance: bool) -> [LegAngles; LEG_COUNT] {
        let targets = gait::trajectory(&self.gait);
        let mut angles = [LegAngles::default(); LEG_COUNT];

        for (leg, target) in targets.into_iter().enumerate() {
            let sol = gait::solve_leg(&self.geometry, leg, target);
            if sol.clamped && !self.ik_clamped[leg] {
                debug!("Leg {} target out of reach (cos = {:.3}), clamped", leg, sol.cosine);
            }
            self.ik_clamped[leg] = sol.clamped;
            angles[leg] = sol.angles;
        }

        if advance {
            self.gait.advance_phase(dt);
        }
        angles
    }

    fn neural_tick(&mut self, dt: f32) -> [LegAngles; LEG_COUNT] {
        stimuli::update(&mut self.state, &self.commands, dt);

        let saturation = cpg::update(&mut self.state.oscillators, dt);
        if saturation.any() != self.saturation.any() {
            debug!("CPG saturation changed: {:?}", saturation);
        }
        self.saturation = saturation;

        for leg in 0..LEG_COUNT {
            let drive = self.legs.drive(leg, &self.state, &self.neural_cfg);
            locomotion::update(
                &mut self.state.legs[leg],
                drive,
                &self.geometry,
                self.neural_cfg.model,
                dt,
            );
        }
        self.state.joint_angles()
    }

    /// Run `steps` neural ticks with fixed commands before control starts
    pub fn warm_up(&mut self, steps: usize, commands: NeuralCommands, dt: f32) {
        info!("Warming up neural pipeline: {} steps, dt = {}", steps, dt);
        let saved = self.commands;
        self.commands = commands;
        for _ in 0..steps {
            self.neural_tick(dt);
        }
        self.commands = saved;
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            mode: self.mode,
            tick: self.tick,
            phase: self.gait.k,
            oscillators: self.state.oscillators,
            neurons: self.state.neurons,
            raw_angles: self.raw_angles,
            angles: self.legs.publish(&self.raw_angles),
            ik_clamped: self.ik_clamped,
            cpg_saturation: self.saturation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gait::trajectory::PHASE_RATE;
    use approx::assert_abs_diff_eq;

    fn controller(mode: ControlMode) -> GaitController {
        let mut c = GaitController::new(RobotConfig::default());
        c.set_mode(mode);
        c
    }

    fn run(c: &mut GaitController, ticks: usize) -> Vec<[LegAngles; LEG_COUNT]> {
        (0..ticks).map(|_| c.tick(1.0)).collect()
    }

    #[test]
    fn test_neural_replay_is_deterministic() {
        let script = [
            NeuralCommands::forward(5.0),
            NeuralCommands {
                spin_left: 3.0,
                ..NeuralCommands::default()
            },
            NeuralCommands {
                right: 8.0,
                go: 2.0,
                ..NeuralCommands::default()
            },
        ];
        let replay = || {
            let mut c = controller(ControlMode::Neural);
            let mut out = Vec::new();
            for cmd in script {
                c.set_commands(cmd);
                out.extend(run(&mut c, 200));
            }
            out
        };
        assert_eq!(replay(), replay());
    }

    #[test]
    fn test_neural_output_stays_finite() {
        let mut c = controller(ControlMode::Neural);
        c.set_commands(NeuralCommands::forward(10.0));
        for angles in run(&mut c, 2_000) {
            assert!(angles.iter().all(|a| a.is_finite()));
        }
        let t = c.telemetry();
        assert!(t.oscillators[5].abs() <= 2.0 && t.oscillators[9].abs() <= 2.0);
        assert_eq!(t.tick, 2_000);
    }

    #[test]
    fn test_trajectory_matches_direct_ik() {
        let mut c = controller(ControlMode::Trajectory);
        let params = GaitParameters::default();
        let out = c.tick(1.0);

        let g = LegGeometry::default();
        let targets = gait::trajectory(&params);
        for leg in 0..LEG_COUNT {
            let expected = gait::solve_leg(&g, leg, targets[leg]).angles;
            let sign = if leg < 3 { 1.0 } else { -1.0 };
            assert_eq!(out[leg], expected.scaled(sign));
        }
    }

    #[test]
    fn test_trajectory_advances_and_holds_phase() {
        let mut c = controller(ControlMode::Trajectory);
        c.tick(2.0);
        assert_abs_diff_eq!(c.gait_parameters().k, 2.0 * PHASE_RATE, epsilon = 1e-6);
        c.hold(2.0);
        assert_abs_diff_eq!(c.gait_parameters().k, 2.0 * PHASE_RATE, epsilon = 1e-6);
    }

    #[test]
    fn test_set_gait_parameters_keeps_phase() {
        let mut c = controller(ControlMode::Trajectory);
        c.tick(1.0);
        let k = c.gait_parameters().k;
        c.set_gait_parameters(GaitParameters {
            d: 10.0,
            k: 99.0,
            ..GaitParameters::default()
        });
        assert_eq!(c.gait_parameters().k, k);
        assert_eq!(c.gait_parameters().d, 10.0);
    }

    #[test]
    fn test_trajectory_tick_leaves_neural_state_untouched() {
        let mut c = controller(ControlMode::Trajectory);
        let before = c.state().clone();
        run(&mut c, 10);
        assert_eq!(*c.state(), before);
    }

    #[test]
    fn test_reference_trajectory_reports_clamps() {
        // Trajectory targets sit near the body origin; the middle legs end up
        // inside the femur/tibia annulus of the mm-scale mounts
        let mut c = controller(ControlMode::Trajectory);
        c.tick(1.0);
        let t = c.telemetry();
        assert!(t.ik_clamped.iter().any(|&b| b));
        assert!(t.angles.iter().all(|a| a.is_finite()));
    }

    #[test]
    fn test_warm_up_restores_commands() {
        let mut c = controller(ControlMode::Neural);
        c.warm_up(50, NeuralCommands::forward(1.0), 1.0);
        assert_eq!(*c.commands(), NeuralCommands::default());
        assert!(c.state().neurons.fw > 0.0);
        assert_eq!(c.telemetry().tick, 0);
    }

    #[test]
    fn test_telemetry_applies_output_signs() {
        let mut c = controller(ControlMode::Neural);
        c.set_commands(NeuralCommands::forward(3.0));
        let out = run(&mut c, 20).pop().unwrap();
        let t = c.telemetry();
        assert_eq!(t.angles, out);
        assert_eq!(t.angles[4], t.raw_angles[4].scaled(-1.0));
    }
}
