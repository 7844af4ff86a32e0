//! The raster surface: an owned RGBA8 pixel buffer with the drawing
//! primitives the compositor needs.

use crate::color::Rgba;

/// Borrowed view of decoded RGBA8 pixel data.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, `width * height * 4` bytes.
    pub data: &'a [u8],
}

impl<'a> Frame<'a> {
    fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = ((y * self.width + x) * 4) as usize;
        Rgba {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        }
    }
}

/// Owned RGBA8 raster surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = ((y * self.width + x) * 4) as usize;
        Rgba {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        }
    }

    /// View the surface contents as a frame, for cached-frame redraws.
    pub fn as_frame(&self) -> Frame<'_> {
        Frame {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        for px in self.data.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = color.a;
        }
    }

    /// Source-over blend of one pixel at the given alpha, in [0, 1].
    /// Out-of-bounds coordinates are clipped.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba, alpha: f64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let alpha = alpha * (color.a as f64 / 255.0);
        if alpha <= 0.0 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        let blend = |dst: u8, src: u8| -> u8 {
            (dst as f64 * (1.0 - alpha) + src as f64 * alpha).round() as u8
        };
        self.data[i] = blend(self.data[i], color.r);
        self.data[i + 1] = blend(self.data[i + 1], color.g);
        self.data[i + 2] = blend(self.data[i + 2], color.b);
        self.data[i + 3] = self.data[i + 3].max((alpha * 255.0).round() as u8);
    }

    /// Fill an axis-aligned rectangle given by its top-left corner.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba, opacity: f64) {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let x1 = (x + w).ceil() as i64;
        let y1 = (y + h).ceil() as i64;
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color, opacity);
            }
        }
    }

    /// Fill a circle centered at `(cx, cy)`.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba, opacity: f64) {
        let r2 = radius * radius;
        let x0 = (cx - radius).floor() as i64;
        let y0 = (cy - radius).floor() as i64;
        let x1 = (cx + radius).ceil() as i64;
        let y1 = (cy + radius).ceil() as i64;
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(px, py, color, opacity);
                }
            }
        }
    }

    /// Draw a frame scaled into the destination rectangle, nearest
    /// neighbor. Destination pixels outside the surface are clipped.
    pub fn draw_image(&mut self, frame: &Frame<'_>, dx: f64, dy: f64, dw: f64, dh: f64, opacity: f64) {
        if dw <= 0.0 || dh <= 0.0 || frame.width == 0 || frame.height == 0 {
            return;
        }
        let x0 = dx.floor() as i64;
        let y0 = dy.floor() as i64;
        let x1 = (dx + dw).ceil() as i64;
        let y1 = (dy + dh).ceil() as i64;
        for py in y0.max(0)..y1.min(self.height as i64) {
            for px in x0.max(0)..x1.min(self.width as i64) {
                let u = ((px as f64 + 0.5 - dx) / dw * frame.width as f64) as i64;
                let v = ((py as f64 + 0.5 - dy) / dh * frame.height as f64) as i64;
                let u = u.clamp(0, frame.width as i64 - 1) as u32;
                let v = v.clamp(0, frame.height as i64 - 1) as u32;
                self.blend_pixel(px, py, frame.pixel(u, v), opacity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sets_every_pixel() {
        let mut surface = Surface::new(4, 4);
        surface.clear(Rgba::opaque(10, 20, 30));
        assert_eq!(surface.pixel(0, 0), Rgba::opaque(10, 20, 30));
        assert_eq!(surface.pixel(3, 3), Rgba::opaque(10, 20, 30));
    }

    #[test]
    fn fill_rect_is_clipped_to_the_surface() {
        let mut surface = Surface::new(4, 4);
        surface.clear(Rgba::BLACK);
        surface.fill_rect(-2.0, -2.0, 4.0, 4.0, Rgba::WHITE, 1.0);
        assert_eq!(surface.pixel(1, 1), Rgba::WHITE);
        assert_eq!(surface.pixel(2, 2), Rgba::BLACK);
    }

    #[test]
    fn half_opacity_blends_toward_the_source() {
        let mut surface = Surface::new(1, 1);
        surface.clear(Rgba::BLACK);
        surface.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::opaque(200, 100, 0), 0.5);
        let px = surface.pixel(0, 0);
        assert_eq!((px.r, px.g, px.b), (100, 50, 0));
    }

    #[test]
    fn circle_stays_inside_its_bounding_box() {
        let mut surface = Surface::new(10, 10);
        surface.clear(Rgba::BLACK);
        surface.fill_circle(5.0, 5.0, 3.0, Rgba::WHITE, 1.0);
        assert_eq!(surface.pixel(5, 5), Rgba::WHITE);
        // Corner of the bounding box is outside the circle.
        assert_eq!(surface.pixel(2, 2), Rgba::BLACK);
    }

    #[test]
    fn draw_image_scales_with_nearest_neighbor() {
        // 2x1 source: left red, right blue, scaled to 4x2.
        let data = [255, 0, 0, 255, 0, 0, 255, 255];
        let frame = Frame {
            width: 2,
            height: 1,
            data: &data,
        };
        let mut surface = Surface::new(4, 2);
        surface.clear(Rgba::BLACK);
        surface.draw_image(&frame, 0.0, 0.0, 4.0, 2.0, 1.0);
        assert_eq!(surface.pixel(0, 0), Rgba::opaque(255, 0, 0));
        assert_eq!(surface.pixel(1, 1), Rgba::opaque(255, 0, 0));
        assert_eq!(surface.pixel(2, 0), Rgba::opaque(0, 0, 255));
        assert_eq!(surface.pixel(3, 1), Rgba::opaque(0, 0, 255));
    }
}
