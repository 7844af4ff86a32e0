//! Rasterize one frame of a composition to a binary PPM image.
//!
//! Media sources are not decoded here; video and image elements rely on
//! the compositor's fallback behavior, while text and shapes rasterize
//! fully. This is intended for layout debugging, not export.

use std::io::Write;
use std::path::PathBuf;

use cutreel_common::{CutreelError, CutreelResult};
use cutreel_composition::Composition;
use cutreel_render::{Compositor, Frame, FrameSource, Surface};

/// A frame source with nothing decoded.
struct NoMedia;

impl FrameSource for NoMedia {
    fn frame(&self, _source: &str) -> Option<Frame<'_>> {
        None
    }
}

pub fn run(path: PathBuf, time: f64, output: PathBuf) -> anyhow::Result<()> {
    if output.extension().and_then(|e| e.to_str()) != Some("ppm") {
        return Err(CutreelError::unsupported(format!(
            "Only .ppm output is supported, got {}",
            output.display()
        ))
        .into());
    }

    let comp = Composition::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load composition: {e}"))?;

    println!(
        "Rendering {}x{} frame at t={:.2}s...",
        comp.width, comp.height, time
    );
    let mut surface = Surface::new(comp.width, comp.height);
    Compositor::new().render_frame(&comp, time, &mut surface, &NoMedia);

    write_ppm(&surface, &output)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;
    println!("  Saved to: {}", output.display());

    Ok(())
}

fn write_ppm(surface: &Surface, path: &PathBuf) -> CutreelResult<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(out, "P6\n{} {}\n255", surface.width(), surface.height())?;
    for px in surface.data().chunks_exact(4) {
        out.write_all(&px[..3])?;
    }
    Ok(())
}
