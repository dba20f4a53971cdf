//! pcmtune - play a melody through an audio device
//!
//! Run with: cargo run -- --score "e e:3:300 e:4:300 as:3:300 a:3:300 500"

mod cli;

use std::path::Path;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use pcmtune::{
    io::{CpalBackend, MemoryBackend},
    sequencing::{FrequencyTable, Score, Sequencer},
    session::{self, SessionConfig},
};

use cli::Cli;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.session_config();
    let score = cli.score();

    if let Some(path) = &cli.bounce {
        return bounce(&config, &score, path);
    }

    let report = if cli.dry_run {
        session::run(MemoryBackend::new(), &config, &score)
    } else {
        session::run(CpalBackend::new(), &config, &score)
    }
    .wrap_err("playback failed")?;

    if !report.is_clean() {
        log::warn!("audio dropped for score entries {:?}", report.dropped);
    }
    Ok(())
}

/// Render offline and write raw PCM
fn bounce(config: &SessionConfig, score: &Score, path: &Path) -> EyreResult<()> {
    config.validate()?;
    let table = FrequencyTable::new();
    let pcm = Sequencer::new(&table, &config.spec, config.amplitude as f64).bounce(score)?;

    std::fs::write(path, pcm.to_bytes())
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;

    log::info!(
        "wrote {} samples to {} (raw s8, {} Hz, mono)",
        pcm.len(),
        path.display(),
        config.spec.sample_rate_hz
    );
    Ok(())
}
