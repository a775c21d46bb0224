// Explicit gait pipeline for the hexapod
//
// Provides:
// - Parametric tripod foot trajectories (phase -> six foot targets)
// - Closed-form 3-DOF leg inverse kinematics (foot target -> joint angles)

pub mod kinematics;
pub mod trajectory;

pub use kinematics::{forward, solve, solve_leg, IkSolution, LegAngles, LegGeometry};
pub use trajectory::{trajectory, tripod_vectors, GaitParameters, GaitParamsError, TripodVectors};
