//! Report per-source audio gains at a timeline time.

use std::path::PathBuf;

use cutreel_composition::Composition;
use cutreel_playback::compute_gains;

pub fn run(path: PathBuf, time: f64) -> anyhow::Result<()> {
    let comp = Composition::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load composition: {e}"))?;

    let gains = compute_gains(&comp, time);
    if gains.is_empty() {
        println!("No decodable sources at t={time:.2}s.");
        return Ok(());
    }

    println!("Audio gains at t={time:.2}s:");
    let mut sources: Vec<_> = gains.iter().collect();
    sources.sort_by(|a, b| a.0.cmp(b.0));
    for (source, gain) in sources {
        let marker = if *gain > 0.0 { "" } else { "  (silent)" };
        println!("  {:<40} {:.3}{}", source, gain, marker);
    }

    Ok(())
}
