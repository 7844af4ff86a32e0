//! Validate a composition document.

use std::path::PathBuf;

use cutreel_composition::Composition;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating: {}", path.display());

    // Load runs structural validation after parsing.
    let comp = Composition::load(&path)
        .map_err(|e| anyhow::anyhow!("Invalid composition: {e}"))?;

    let elements: usize = comp.tracks.iter().map(|t| t.elements.len()).sum();
    println!("  Version: {}", comp.version);
    println!("  Canvas: {}x{} @ {}fps", comp.width, comp.height, comp.fps);
    println!("  Tracks: {}", comp.tracks.len());
    println!("  Elements: {}", elements);
    println!("  Duration: {:.2}s", comp.duration());
    println!("\nComposition is valid.");

    Ok(())
}
