// Scripted command publisher: walks forward, spins, strafes, then switches to the
// trajectory pipeline. Commands are re-sent at 20 Hz so the runtime watchdog stays fed.
//
// Usage: cargo run --example cmd_publisher
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::info;

const TOPIC: &str = "hexapod/cmd/gait";
const SEND_HZ: u64 = 20;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC).await?;

    // (label, seconds, command)
    let script = [
        ("forward", 5, json!({ "type": "neural", "go": 5.0 })),
        ("spin left", 4, json!({ "type": "neural", "spin_left": 5.0 })),
        ("strafe right", 4, json!({ "type": "neural", "go": 2.0, "right": 6.0 })),
        ("stop", 2, json!({ "type": "neural" })),
        ("switch", 0, json!({ "type": "mode", "mode": "trajectory" })),
        ("tripod", 6, json!({ "type": "trajectory", "d": 40.0, "al": 60.0, "n": 20.0 })),
        ("arc", 6, json!({ "type": "trajectory", "d": 40.0, "al": 60.0, "ra": 0.5, "c": 3.0 })),
    ];

    let mut tick = interval(Duration::from_millis(1000 / SEND_HZ));
    for (label, seconds, cmd) in script {
        info!("Step: {} ({}s)", label, seconds);
        let payload = cmd.to_string();
        let until = Instant::now() + Duration::from_secs(seconds);
        loop {
            tick.tick().await;
            publisher.put(payload.clone()).await?;
            if Instant::now() >= until {
                break;
            }
        }
    }

    info!("Script finished");
    Ok(())
}
