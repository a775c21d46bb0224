// Define message types for the runtime

use serde::{Deserialize, Serialize};

use crate::controller::ControlMode;
use crate::gait::{GaitParameters, LegAngles};
use crate::neural::{NeuralCommands, LEG_COUNT};

// Command from teleop/scripts -> runtime
// Tagged by "type": {"type": "neural", "go": 5.0}, {"type": "mode", "mode": "trajectory"}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GaitCommand {
    Neural(NeuralCommands),
    Trajectory(GaitParameters),
    Mode { mode: ControlMode },
}

// Joint angles from runtime -> actuation layer
// Default is the all-zero pose, published before the first tick
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JointActuation {
    pub mode: ControlMode,
    pub legs: [LegAngles; LEG_COUNT],
}

impl JointActuation {
    pub fn new(mode: ControlMode, legs: [LegAngles; LEG_COUNT]) -> Self {
        Self { mode, legs }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
}
