//! The frame compositor: draws the active element set for one timeline
//! time onto a raster surface.

use cutreel_composition::{Composition, Element, ElementKind, ShapeKind};

use crate::color::{parse_hex, Rgba};
use crate::geometry::{calculate_fit, element_box};
use crate::surface::{Frame, Surface};
use crate::text::draw_text;

/// Supplies decoded media frames to the compositor.
///
/// Returning `None` means no frame is ready for that source yet; video
/// elements then fall back to the cached last-good frame instead of
/// leaving a black hole.
pub trait FrameSource {
    fn frame(&self, source: &str) -> Option<Frame<'_>>;
}

/// Per-session compositor state: just the last fully composited frame,
/// kept as a fallback while a video source has nothing decoded.
#[derive(Debug, Default)]
pub struct Compositor {
    cached_frame: Option<Surface>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite the frame at timeline time `t`.
    ///
    /// Tracks paint in reverse declared order so the first track lands
    /// topmost; invisible tracks are skipped. After compositing, the
    /// finished frame is cached for fallback use.
    pub fn render_frame(
        &mut self,
        composition: &Composition,
        t: f64,
        surface: &mut Surface,
        frames: &impl FrameSource,
    ) {
        let background = parse_hex(&composition.background_color).unwrap_or_else(|e| {
            tracing::warn!("bad background color: {e}");
            Rgba::BLACK
        });
        surface.clear(background);

        for track in composition.tracks.iter().rev() {
            if !track.visible {
                continue;
            }
            for el in &track.elements {
                if !el.is_active(t) {
                    continue;
                }
                self.draw_element(el, surface, frames);
            }
        }

        self.cache_frame(surface);
    }

    /// Drop the cached fallback frame.
    pub fn invalidate_cache(&mut self) {
        self.cached_frame = None;
    }

    fn draw_element(&self, el: &Element, surface: &mut Surface, frames: &impl FrameSource) {
        let opacity = el.opacity.clamp(0.0, 1.0);
        let w = surface.width() as f64;
        let h = surface.height() as f64;

        match &el.kind {
            ElementKind::Video { source } => {
                let Some(source) = source else { return };
                match frames.frame(source) {
                    Some(frame) => {
                        let fit =
                            calculate_fit(frame.width as f64, frame.height as f64, w, h, el);
                        surface.draw_image(&frame, fit.dx, fit.dy, fit.dw, fit.dh, opacity);
                    }
                    None => {
                        // No decoded frame yet; redraw the last complete
                        // frame to avoid a black flash.
                        if let Some(cached) = &self.cached_frame {
                            surface.draw_image(&cached.as_frame(), 0.0, 0.0, w, h, opacity);
                        }
                    }
                }
            }
            ElementKind::Image { source } => {
                let Some(source) = source else { return };
                if let Some(frame) = frames.frame(source) {
                    let fit = calculate_fit(frame.width as f64, frame.height as f64, w, h, el);
                    surface.draw_image(&frame, fit.dx, fit.dy, fit.dw, fit.dh, opacity);
                }
            }
            ElementKind::Text {
                text,
                font_size,
                font_weight,
                color,
                align,
                stroke_color,
                stroke_width,
                ..
            } => {
                let fill = parse_hex(color).unwrap_or(Rgba::WHITE);
                let stroke = stroke_color
                    .as_deref()
                    .and_then(|c| parse_hex(c).ok())
                    .map(|c| (c, if *stroke_width > 0.0 { *stroke_width } else { 2.0 }));
                let x = el.x.resolve(w);
                let y = el.y.resolve(h);
                draw_text(
                    surface,
                    text,
                    x,
                    y,
                    *font_size,
                    *font_weight,
                    fill,
                    *align,
                    stroke,
                    opacity,
                );
            }
            ElementKind::Shape { shape, color } => {
                let fill = parse_hex(color).unwrap_or(Rgba::WHITE);
                let (x, y, bw, bh) = element_box(el, w, h);
                match shape {
                    ShapeKind::Circle => {
                        surface.fill_circle(x, y, bw.min(bh) / 2.0, fill, opacity);
                    }
                    ShapeKind::Rectangle => {
                        surface.fill_rect(x - bw / 2.0, y - bh / 2.0, bw, bh, fill, opacity);
                    }
                }
            }
            ElementKind::Audio { .. } => {}
        }
    }

    /// Keep a copy of the finished frame, reusing the buffer when the
    /// surface size is unchanged.
    fn cache_frame(&mut self, surface: &Surface) {
        match &mut self.cached_frame {
            Some(cached)
                if cached.width() == surface.width() && cached.height() == surface.height() =>
            {
                *cached = surface.clone();
            }
            _ => self.cached_frame = Some(surface.clone()),
        }
    }
}
