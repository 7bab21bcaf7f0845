//! Synthetic load generator.
//!
//! Stands in for a fleet of field devices during development and load
//! testing. It is just another producer: generated records go through the
//! same ingestion queue and line format as real devices, so the engine
//! cannot tell the difference. Per tick it emits one telemetry record per
//! simulated rescuee and a sweep of proximity reports from each simulated
//! rescuer over every 25th rescuee.

use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::Config;

// ---

const LINK_STRIDE: u32 = 25;

pub async fn run(cfg: Config, lines: mpsc::Sender<String>) {
    // ---
    info!(
        "Simulator started: {} rescuees, {} rescuers, {}ms tick",
        cfg.sim_rescuees, cfg.sim_rescuers, cfg.sim_interval_ms
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(u64::from(cfg.sim_interval_ms)));
    let mut tick = 0u64;

    loop {
        ticker.tick().await;
        tick += 1;

        for line in generate_tick(&cfg, tick) {
            if lines.send(line).await.is_err() {
                debug!("ingestion queue closed, simulator stopping");
                return;
            }
        }
    }
}

/// All lines for one simulation tick. Contact drops out one tick in twenty,
/// emergencies fire with 1% probability per rescuee per tick.
fn generate_tick(cfg: &Config, tick: u64) -> Vec<String> {
    // ---
    let mut rng = rand::thread_rng();
    let mut out = Vec::new();

    let contact = if tick % 20 < 19 { "OK" } else { "LOST" };
    for i in 1..=cfg.sim_rescuees {
        let bpm = 60 + rng.gen_range(0..=20);
        let emergency = u8::from(rng.gen_bool(0.01));
        out.push(format!(
            "TYPE=RESCUEE,ID=R{i},BPM={bpm},AVG=75,CONTACT={contact},EMERGENCY={emergency}"
        ));
    }

    for j in 1..=cfg.sim_rescuers {
        for i in (1..=cfg.sim_rescuees).step_by(LINK_STRIDE as usize) {
            let rssi = -60 - rng.gen_range(0..20);
            out.push(format!("TYPE=RESCUER,ID=H{j},TARGET=R{i},RSSI={rssi}"));
        }
    }

    out
}
