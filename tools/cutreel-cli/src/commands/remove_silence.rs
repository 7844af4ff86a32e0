//! Re-segment clips around detected speech intervals.

use std::path::PathBuf;

use cutreel_common::CutreelError;
use cutreel_composition::Composition;
use cutreel_silence::{remove_silence, SpeechMap};

pub fn run(
    path: PathBuf,
    speech: PathBuf,
    padding: f64,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut comp = Composition::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load composition: {e}"))?;

    if !speech.exists() {
        return Err(CutreelError::FileNotFound { path: speech }.into());
    }
    let speech_json = std::fs::read_to_string(&speech)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", speech.display()))?;
    let speech_map: SpeechMap = serde_json::from_str(&speech_json)
        .map_err(|e| anyhow::anyhow!("Invalid speech intervals: {e}"))?;

    println!(
        "Removing silence ({} sources, padding {:.2}s)...",
        speech_map.len(),
        padding
    );
    let before: usize = comp.tracks.iter().map(|t| t.elements.len()).sum();
    let changed = remove_silence(&mut comp, &speech_map, padding);
    let after: usize = comp.tracks.iter().map(|t| t.elements.len()).sum();

    if !changed {
        println!("Nothing to remove; composition unchanged.");
        return Ok(());
    }

    let target = output.unwrap_or(path);
    comp.save(&target)
        .map_err(|e| anyhow::anyhow!("Failed to save composition: {e}"))?;

    println!("  Elements: {} -> {}", before, after);
    println!("  New duration: {:.2}s", comp.duration());
    println!("  Saved to: {}", target.display());

    Ok(())
}
