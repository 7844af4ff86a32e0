//! Create a starter composition document.

use std::path::PathBuf;

use cutreel_composition::{Composition, TrackKind};

pub fn run(name: String, output: PathBuf, width: u32, height: u32, fps: u32) -> anyhow::Result<()> {
    let path = output.join(format!("{name}.json"));
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    let mut comp = Composition::new(width, height, fps);
    comp.add_track(TrackKind::Video, Some("Main Video"));
    comp.add_track(TrackKind::Overlay, Some("Overlay"));
    comp.add_track(TrackKind::Audio, Some("Audio"));

    comp.save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write composition: {e}"))?;

    println!("Created composition '{}':", name);
    println!("  File: {}", path.display());
    println!("  Canvas: {}x{} @ {}fps", width, height, fps);
    println!("  Tracks: Overlay, Main Video, Audio");

    Ok(())
}
