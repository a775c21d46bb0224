// Fixed-rate control loop with watchdog
// Note: if the command source goes quiet the watchdog zeroes the neural commands and
// freezes the trajectory phase, so the robot settles instead of walking away

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{info, warn};

use crate::config::{
    RobotConfig, CMD_TIMEOUT, TELEMETRY_EVERY, TOPIC_CMD_GAIT, TOPIC_HEALTH, TOPIC_RT_JOINTS,
    TOPIC_TELEMETRY, WARMUP_DT, WARMUP_GO,
};
use crate::controller::{ControlMode, GaitController};
use crate::messages::{GaitCommand, JointActuation, RuntimeHealth};
use crate::neural::NeuralCommands;

/// Loop settings chosen on the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: RobotConfig,
    pub mode: ControlMode,
    pub dt: f32,
    pub warmup_steps: usize,
    pub loop_hz: u64,
}

pub struct Runtime {
    controller: GaitController,
    cmd_received_at: Option<Instant>,
    health: RuntimeHealth,
    dt: f32,
}

impl Runtime {
    pub fn new(controller: GaitController, dt: f32) -> Self {
        Self {
            controller,
            cmd_received_at: None,
            health: RuntimeHealth::CmdStale, // Start stale until first cmd
            dt,
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    pub fn controller(&self) -> &GaitController {
        &self.controller
    }

    /// Process incoming command
    fn on_command(&mut self, cmd: GaitCommand, now: Instant) {
        info!("Received command: {:?}", &cmd);
        match cmd {
            GaitCommand::Neural(commands) => self.controller.set_commands(commands),
            GaitCommand::Trajectory(params) => {
                if let Err(e) = params.validate() {
                    warn!("Rejected gait parameters: {}", e);
                    return;
                }
                self.controller.set_gait_parameters(params)
            }
            GaitCommand::Mode { mode } => self.controller.set_mode(mode),
        }
        self.cmd_received_at = Some(now);
    }

    /// Run one tick of the controller based on watchdog state
    fn compute_actuation(&mut self, now: Instant) -> JointActuation {
        let fresh = self
            .cmd_received_at
            .is_some_and(|at| now.duration_since(at) <= CMD_TIMEOUT);

        let legs = if fresh {
            self.health = RuntimeHealth::Ok;
            self.controller.tick(self.dt)
        } else {
            // Watchdog triggered - let the robot settle
            if self.health != RuntimeHealth::CmdStale {
                warn!("Commands stale, settling robot");
            }
            self.health = RuntimeHealth::CmdStale;
            self.controller.set_commands(NeuralCommands::default());
            self.controller.hold(self.dt)
        };

        JointActuation::new(self.controller.mode(), legs)
    }
}

/// Interval between loop ticks; never zero
pub fn tick_period(loop_hz: u64) -> Duration {
    Duration::from_secs_f64(1.0 / loop_hz.max(1) as f64)
}

/// Controller in its initial mode, warmed up into steady oscillation
pub fn build_controller(options: &RunOptions) -> GaitController {
    let mut controller = GaitController::new(options.config.clone());
    if options.warmup_steps > 0 {
        controller.warm_up(
            options.warmup_steps,
            NeuralCommands::forward(WARMUP_GO),
            WARMUP_DT,
        );
    }
    controller.set_mode(options.mode);
    controller
}

pub async fn run(options: RunOptions) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let controller = build_controller(&options);

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(TOPIC_CMD_GAIT).await?;
    let pub_joints = session.declare_publisher(TOPIC_RT_JOINTS).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;
    let pub_telemetry = session.declare_publisher(TOPIC_TELEMETRY).await?;

    let mut runtime = Runtime::new(controller, options.dt);
    let mut tick = interval(tick_period(options.loop_hz));
    let mut ticks: u64 = 0;

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout, dt = {}",
        options.loop_hz,
        CMD_TIMEOUT.as_millis(),
        options.dt
    );
    info!("Subscribed to: {}", TOPIC_CMD_GAIT);
    info!(
        "Publishing to: {}, {}, {}",
        TOPIC_RT_JOINTS, TOPIC_HEALTH, TOPIC_TELEMETRY
    );

    loop {
        tick.tick().await;

        // 1. Drain all pending commands (non-blocking), apply in order
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<GaitCommand>(&payload) {
                Ok(cmd) => {
                    runtime.on_command(cmd, Instant::now());
                }
                Err(e) => {
                    warn!("Failed to parse command: {}", e);
                }
            }
        }

        // 2. Tick the controller (includes watchdog logic)
        let actuation = runtime.compute_actuation(Instant::now());

        // 3. Publish joint angles
        let actuation_json = serde_json::to_string(&actuation)?;
        pub_joints.put(actuation_json).await?;

        // 4. Publish health
        let health_json = serde_json::to_string(&runtime.health)?;
        pub_health.put(health_json).await?;

        // 5. Publish telemetry (decimated)
        ticks += 1;
        if ticks % TELEMETRY_EVERY == 0 {
            let telemetry_json = serde_json::to_string(&runtime.controller.telemetry())?;
            pub_telemetry.put(telemetry_json).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gait::GaitParameters;

    fn runtime(mode: ControlMode) -> Runtime {
        let mut controller = GaitController::new(RobotConfig::default());
        controller.set_mode(mode);
        Runtime::new(controller, 1.0)
    }

    #[test]
    fn test_starts_stale() {
        let mut rt = runtime(ControlMode::Neural);
        rt.compute_actuation(Instant::now());
        assert_eq!(rt.health(), RuntimeHealth::CmdStale);
    }

    #[test]
    fn test_fresh_command_is_ok() {
        let mut rt = runtime(ControlMode::Neural);
        let now = Instant::now();
        rt.on_command(GaitCommand::Neural(NeuralCommands::forward(4.0)), now);
        rt.compute_actuation(now);
        assert_eq!(rt.health(), RuntimeHealth::Ok);
        assert_eq!(rt.controller().commands().go, 4.0);
    }

    #[test]
    fn test_watchdog_zeroes_commands() {
        let mut rt = runtime(ControlMode::Neural);
        let start = Instant::now();
        rt.on_command(GaitCommand::Neural(NeuralCommands::forward(4.0)), start);
        rt.compute_actuation(start + CMD_TIMEOUT + Duration::from_millis(1));
        assert_eq!(rt.health(), RuntimeHealth::CmdStale);
        assert_eq!(*rt.controller().commands(), NeuralCommands::default());
    }

    #[test]
    fn test_watchdog_freezes_phase() {
        let mut rt = runtime(ControlMode::Trajectory);
        let start = Instant::now();
        rt.on_command(GaitCommand::Trajectory(GaitParameters::default()), start);
        rt.compute_actuation(start);
        let k = rt.controller().gait_parameters().k;
        assert!(k > 0.0);

        let late = start + CMD_TIMEOUT * 2;
        let act = rt.compute_actuation(late);
        assert_eq!(rt.controller().gait_parameters().k, k);
        assert_eq!(act.mode, ControlMode::Trajectory);
    }

    #[test]
    fn test_mode_command_switches_pipeline() {
        let mut rt = runtime(ControlMode::Neural);
        rt.on_command(
            GaitCommand::Mode {
                mode: ControlMode::Trajectory,
            },
            Instant::now(),
        );
        assert_eq!(rt.controller().mode(), ControlMode::Trajectory);
    }

    #[test]
    fn test_invalid_gait_parameters_are_rejected() {
        let mut rt = runtime(ControlMode::Trajectory);
        let before = *rt.controller().gait_parameters();
        let now = Instant::now();
        let half_sign = GaitParameters {
            w: 0.5,
            d: 10.0,
            ..GaitParameters::default()
        };
        rt.on_command(GaitCommand::Trajectory(half_sign), now);
        assert_eq!(*rt.controller().gait_parameters(), before);

        // A rejected command does not feed the watchdog
        rt.compute_actuation(now);
        assert_eq!(rt.health(), RuntimeHealth::CmdStale);
    }

    #[test]
    fn test_tick_period_matches_rate() {
        assert_eq!(tick_period(50), Duration::from_millis(20));
        let fast = tick_period(300);
        assert!((fast.as_secs_f64() - 1.0 / 300.0).abs() < 1e-9);
        assert!(tick_period(5_000) > Duration::ZERO);
        assert!(tick_period(0) > Duration::ZERO);
    }

    #[test]
    fn test_warm_up_walks_forward() {
        let options = RunOptions {
            config: RobotConfig::default(),
            mode: ControlMode::Trajectory,
            dt: 1.0,
            warmup_steps: 1000,
            loop_hz: 50,
        };
        let controller = build_controller(&options);
        assert!(controller.state().neurons.fw > 0.1);
        assert_eq!(*controller.commands(), NeuralCommands::default());
        assert_eq!(controller.mode(), ControlMode::Trajectory);
    }
}
