//! Box resolution and aspect-preserving fit math.

use cutreel_composition::{Element, Fit};

/// Destination rectangle for drawing media onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBox {
    pub dx: f64,
    pub dy: f64,
    pub dw: f64,
    pub dh: f64,
}

/// Resolve an element's target box against the canvas: center position and
/// size in absolute pixels.
pub fn element_box(el: &Element, canvas_w: f64, canvas_h: f64) -> (f64, f64, f64, f64) {
    let x = el.x.resolve(canvas_w);
    let y = el.y.resolve(canvas_h);
    let w = el.width.resolve_size(canvas_w);
    let h = el.height.resolve_size(canvas_h);
    (x, y, w, h)
}

/// Compute the destination rectangle for media with natural size
/// `src_w` x `src_h` drawn into the element's target box.
///
/// `Cover` scales the media to fill the box (overflow is cropped by the
/// box being centered), `Contain` scales it to fit entirely inside. The
/// result is centered on the element's resolved position.
pub fn calculate_fit(
    src_w: f64,
    src_h: f64,
    canvas_w: f64,
    canvas_h: f64,
    el: &Element,
) -> FitBox {
    let (target_x, target_y, target_w, target_h) = element_box(el, canvas_w, canvas_h);

    let src_ratio = src_w / src_h;
    let target_ratio = target_w / target_h;

    let (dw, dh) = match el.fit {
        Fit::Cover => {
            if src_ratio > target_ratio {
                (target_h * src_ratio, target_h)
            } else {
                (target_w, target_w / src_ratio)
            }
        }
        Fit::Contain => {
            if src_ratio > target_ratio {
                (target_w, target_w / src_ratio)
            } else {
                (target_h * src_ratio, target_h)
            }
        }
    };

    FitBox {
        dx: target_x - dw / 2.0,
        dy: target_y - dh / 2.0,
        dw,
        dh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutreel_composition::{Dim, ElementKind};

    fn full_frame_video() -> Element {
        Element::new(
            "clip",
            ElementKind::Video {
                source: Some("media://a.mp4".to_string()),
            },
            1080,
            1920,
        )
    }

    #[test]
    fn cover_fills_a_wider_box_by_height_overflow() {
        // 16:9 source into a full-canvas 9:16 portrait box.
        let el = full_frame_video();
        let fit = calculate_fit(1920.0, 1080.0, 1080.0, 1920.0, &el);
        assert_eq!(fit.dh, 1920.0);
        assert!((fit.dw - 1920.0 * (1920.0 / 1080.0)).abs() < 1e-9);
        // Centered: equal overflow on both sides.
        assert!((fit.dx + fit.dw / 2.0 - 540.0).abs() < 1e-9);
        assert_eq!(fit.dy, 0.0);
    }

    #[test]
    fn contain_letterboxes_inside_the_box() {
        let mut el = full_frame_video();
        el.fit = Fit::Contain;
        let fit = calculate_fit(1920.0, 1080.0, 1080.0, 1920.0, &el);
        assert_eq!(fit.dw, 1080.0);
        assert!((fit.dh - 1080.0 / (1920.0 / 1080.0)).abs() < 1e-9);
        // Vertically centered within the portrait canvas.
        assert!((fit.dy + fit.dh / 2.0 - 960.0).abs() < 1e-9);
    }

    #[test]
    fn square_source_in_square_box_is_exact_either_way() {
        let mut el = full_frame_video();
        el.x = Dim::Px(200.0);
        el.y = Dim::Px(200.0);
        el.width = Dim::Px(100.0);
        el.height = Dim::Px(100.0);
        for fit_mode in [Fit::Cover, Fit::Contain] {
            el.fit = fit_mode;
            let fit = calculate_fit(512.0, 512.0, 1080.0, 1920.0, &el);
            assert_eq!((fit.dx, fit.dy, fit.dw, fit.dh), (150.0, 150.0, 100.0, 100.0));
        }
    }

    #[test]
    fn zero_size_dims_fall_back_to_the_canvas() {
        let mut el = full_frame_video();
        el.width = Dim::Px(0.0);
        el.height = Dim::Px(0.0);
        let (_, _, w, h) = element_box(&el, 1080.0, 1920.0);
        assert_eq!((w, h), (1080.0, 1920.0));
    }
}
