//! Nightlight: headless two-peer platformer match with snapshot replication.

mod config;
mod level;
mod net_sim;
mod peer;
mod script;
mod session;

use anyhow::Result;
use config::GameConfig;
use session::Session;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load();
    if std::env::args().skip(1).any(|arg| arg == "--write-config") {
        config.save();
        log::info!("Wrote config.ron");
        return Ok(());
    }

    log::info!(
        "Starting Nightlight match: {} characters, {} frames, snapshot every {} ticks",
        config.roster.len(),
        config.frames,
        config.snapshot_interval
    );

    let report = Session::new(&config)?.run();

    log::info!(
        "Match over after {} frames ({:.1}s), {} characters still standing",
        report.frames,
        report.seconds,
        report.survivors
    );
    log::info!(
        "Network: {} sent, {} delivered, {} reordered",
        report.network.sent,
        report.network.delivered,
        report.network.reordered
    );
    log::info!(
        "Replica: {} snapshots applied ({} snapped), {} stale, {} rejected, {} sounds, {} deaths; max divergence {:.3}",
        report.replica.applied,
        report.replica.snapped,
        report.replica.dropped,
        report.replica.rejected,
        report.replica.sounds,
        report.replica.deaths,
        report.max_divergence
    );

    Ok(())
}
