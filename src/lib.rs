// Hexapod gait generation and neuromotor control
//
// Two mutually exclusive pipelines drive the six legs:
// - gait: parametric tripod trajectory + closed-form leg IK
// - neural: interneurons -> central pattern generator -> per-leg integrators
//
// The controller picks one per tick; the runtime feeds it over Zenoh.

pub mod config;
pub mod controller;
pub mod gait;
pub mod legs;
pub mod messages;
pub mod neural;
pub mod runtime;
