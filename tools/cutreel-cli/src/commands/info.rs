//! Show composition information.

use std::collections::BTreeSet;
use std::path::PathBuf;

use cutreel_composition::Composition;
use cutreel_playback::{PassthroughResolver, SourceResolver};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let comp = Composition::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load composition: {e}"))?;

    println!("Composition: {}", path.display());
    println!("  Version: {}", comp.version);
    println!("  Canvas: {}x{} @ {}fps", comp.width, comp.height, comp.fps);
    println!("  Background: {}", comp.background_color);
    println!("  Duration: {:.2}s", comp.duration());
    println!();

    println!("Tracks ({}):", comp.tracks.len());
    for track in &comp.tracks {
        let mut flags = Vec::new();
        if track.muted {
            flags.push("muted");
        }
        if track.locked {
            flags.push("locked");
        }
        if !track.visible {
            flags.push("hidden");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "  {} ({:?}, {} elements){}",
            track.name,
            track.kind,
            track.elements.len(),
            flags
        );
        for el in &track.elements {
            let source = el.source().unwrap_or("-");
            println!(
                "    {:<20} {:>7.2}s +{:.2}s  trim {:.2}s  {}",
                el.name, el.time, el.duration, el.trim_start, source
            );
        }
    }

    let resolver = PassthroughResolver;
    let sources: BTreeSet<_> = comp
        .tracks
        .iter()
        .flat_map(|t| t.elements.iter())
        .filter_map(|el| el.source())
        .collect();
    if !sources.is_empty() {
        println!();
        println!("Media sources ({}):", sources.len());
        for source in sources {
            println!("  {}", resolver.resolve(source));
        }
    }

    Ok(())
}
