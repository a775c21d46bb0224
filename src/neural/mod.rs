// Neuromotor gait pipeline
//
// Provides:
// - Interneuron layer (raw commands -> intent and direction neurons)
// - Central pattern generator (ten coupled oscillator variables)
// - Per-leg multi-rate integrator (oscillator drive -> joint angles)
//
// Each tick must run stimuli, then cpg, then the six legs.

pub mod cpg;
pub mod locomotion;
pub mod state;
pub mod stimuli;

pub use cpg::Saturation;
pub use locomotion::{IntegratorModel, LegDrive};
pub use state::{Interneurons, LegState, RobotState, LEG_COUNT};
pub use stimuli::NeuralCommands;
