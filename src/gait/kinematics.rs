// Closed-form inverse kinematics for one 3-DOF hexapod leg
// Converts a body-frame foot target into coxa/femur/tibia angles (degrees).

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Coxa offset of the reference robot (mm)
pub const COXA_LENGTH: f32 = 86.0;
/// Femur length of the reference robot (mm)
pub const FEMUR_LENGTH: f32 = 74.28;
/// Tibia length of the reference robot (mm)
pub const TIBIA_LENGTH: f32 = 140.85;

/// Body height of the reference robot's coxa mounts (mm)
pub const MOUNT_HEIGHT: f32 = 123.83;

/// Coxa mount points in the body frame, leg 0..5
const MOUNT_XY: [[f32; 2]; 6] = [
    [62.77, 90.45],
    [86.0, 0.0],
    [65.89, -88.21],
    [-65.89, 88.21],
    [-86.0, 0.0],
    [-62.77, -90.45],
];

/// Joint angles for one leg, in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegAngles {
    pub coxa: f32,
    pub femur: f32,
    pub tibia: f32,
}

impl LegAngles {
    pub fn new(coxa: f32, femur: f32, tibia: f32) -> Self {
        Self { coxa, femur, tibia }
    }

    /// Returns angles as array [coxa, femur, tibia]
    pub fn as_array(&self) -> [f32; 3] {
        [self.coxa, self.femur, self.tibia]
    }

    /// Multiply every joint by `sign`
    pub fn scaled(&self, sign: f32) -> Self {
        Self::new(self.coxa * sign, self.femur * sign, self.tibia * sign)
    }

    pub fn is_finite(&self) -> bool {
        self.coxa.is_finite() && self.femur.is_finite() && self.tibia.is_finite()
    }
}

/// Static leg geometry shared by all six legs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegGeometry {
    /// Coxa mount point of each leg in the body frame
    pub mounts: [Vec3; 6],
    /// L0: horizontal coxa offset
    pub coxa: f32,
    /// L1: femur length
    pub femur: f32,
    /// L2: tibia length
    pub tibia: f32,
}

impl Default for LegGeometry {
    fn default() -> Self {
        Self {
            mounts: MOUNT_XY.map(|[x, y]| Vec3::new(x, y, MOUNT_HEIGHT)),
            coxa: COXA_LENGTH,
            femur: FEMUR_LENGTH,
            tibia: TIBIA_LENGTH,
        }
    }
}

/// Result of a single leg solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkSolution {
    pub angles: LegAngles,
    /// Law-of-cosines argument before clamping
    pub cosine: f32,
    /// True when the target was outside the reachable annulus
    pub clamped: bool,
}

/// Solve coxa/femur/tibia angles (degrees) placing the foot at `target`
///
/// # Arguments
/// * `base` - Coxa mount point in the body frame
/// * `target` - Desired foot position in the body frame
/// * `l0` - Coxa offset, `l1` - femur length, `l2` - tibia length
///
/// Unreachable targets never fail: the cosine is clamped to [-1, 1] and the
/// nearest reachable pose is returned with `clamped` set.
pub fn solve(base: Vec3, target: Vec3, l0: f32, l1: f32, l2: f32) -> IkSolution {
    let delta = target - base;

    let theta1 = delta.y.atan2(delta.x);

    // Rotate into the leg plane: x along the leg, z vertical
    let (sin_t, cos_t) = (-theta1).sin_cos();
    let local_x = cos_t * delta.x - sin_t * delta.y;

    let x_local = local_x - l0;
    let z_local = delta.z;

    let r_sq = x_local * x_local + z_local * z_local;
    let cosine = (r_sq - l1 * l1 - l2 * l2) / (2.0 * l1 * l2);
    let clamped = !(-1.0..=1.0).contains(&cosine);
    let d = cosine.clamp(-1.0, 1.0);

    let theta3 = d.acos();
    let alpha = z_local.atan2(x_local);
    let beta = (l2 * (-theta3).sin()).atan2(l1 + l2 * (-theta3).cos());
    let theta2 = -(alpha - beta);

    IkSolution {
        angles: LegAngles::new(theta1.to_degrees(), theta2.to_degrees(), theta3.to_degrees()),
        cosine,
        clamped,
    }
}

/// Solve using the links of `geometry` for leg `leg`
pub fn solve_leg(geometry: &LegGeometry, leg: usize, target: Vec3) -> IkSolution {
    solve(
        geometry.mounts[leg],
        target,
        geometry.coxa,
        geometry.femur,
        geometry.tibia,
    )
}

/// Foot position produced by `angles` for a leg mounted at `base`
pub fn forward(base: Vec3, angles: LegAngles, l0: f32, l1: f32, l2: f32) -> Vec3 {
    let yaw = angles.coxa.to_radians();
    let hip = (-angles.femur).to_radians();
    let knee = (-angles.tibia).to_radians();

    let reach = l0 + l1 * hip.cos() + l2 * (hip + knee).cos();
    let height = l1 * hip.sin() + l2 * (hip + knee).sin();

    base + Vec3::new(reach * yaw.cos(), reach * yaw.sin(), height)
}
