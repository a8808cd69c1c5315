//! Mapping between canvas-local screen pixels and source-image pixels.
//!
//! The rendered image is centred in the canvas, shifted by the pan offset and
//! scaled to `image_size`. Display, hit-testing and export all go through
//! [`CanvasMapping`] so the three can never disagree about where a pixel is.

use crate::geometry::{IVec2, Vec2};

/// Snapshot of the fields a mapping needs, taken from a panel's viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMapping {
    top_left: Vec2,
    bottom_right: Vec2,
    source_size: Vec2,
}

impl CanvasMapping {
    /// `image_size` must be non-zero on both axes; the viewport's zoom floor
    /// guarantees this for every panel.
    pub fn new(image_size: Vec2, image_offset: Vec2, display_size: Vec2, source_size: IVec2) -> Self {
        let src_half = image_size / 2.0;
        let dst_half = display_size / 2.0;
        let top_left = dst_half - src_half + image_offset;
        Self {
            top_left,
            bottom_right: top_left + image_size,
            source_size: source_size.as_vec2(),
        }
    }

    /// Screen-space top-left corner of the rendered image.
    pub fn top_left(&self) -> Vec2 {
        self.top_left
    }

    pub fn bottom_right(&self) -> Vec2 {
        self.bottom_right
    }

    pub fn image_extent(&self) -> Vec2 {
        self.bottom_right - self.top_left
    }

    /// Position of `canvas_point` as a fraction of the rendered image
    /// rectangle. Not clamped: points outside the image fall outside `[0, 1]`.
    pub fn relative(&self, canvas_point: Vec2) -> Vec2 {
        (canvas_point - self.top_left) / self.image_extent()
    }

    pub fn canvas_to_image(&self, canvas_point: Vec2) -> Vec2 {
        self.relative(canvas_point) * self.source_size
    }

    pub fn image_to_canvas(&self, image_point: Vec2) -> Vec2 {
        (image_point / self.source_size) * self.image_extent() + self.top_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ivec2, vec2};

    fn assert_close(a: Vec2, b: Vec2, tol: f32) {
        assert!(
            (a.x - b.x).abs() <= tol && (a.y - b.y).abs() <= tol,
            "{a:?} != {b:?} (tol {tol})"
        );
    }

    #[test]
    fn unzoomed_centred_image_maps_canvas_centre_to_image_centre() {
        let m = CanvasMapping::new(vec2(100.0, 50.0), Vec2::ZERO, vec2(200.0, 100.0), ivec2(100, 50));
        assert_eq!(m.top_left(), vec2(50.0, 25.0));
        assert_eq!(m.bottom_right(), vec2(150.0, 75.0));
        assert_close(m.canvas_to_image(vec2(100.0, 50.0)), vec2(50.0, 25.0), 1e-5);
    }

    #[test]
    fn zoomed_and_panned_mapping_scales_and_shifts() {
        // 2x zoom, panned 10px right and 4px up.
        let m = CanvasMapping::new(vec2(200.0, 100.0), vec2(10.0, -4.0), vec2(200.0, 100.0), ivec2(100, 50));
        assert_eq!(m.top_left(), vec2(10.0, -4.0));
        assert_close(m.canvas_to_image(vec2(30.0, 16.0)), vec2(10.0, 10.0), 1e-5);
        assert_close(m.image_to_canvas(vec2(10.0, 10.0)), vec2(30.0, 16.0), 1e-5);
    }

    #[test]
    fn relative_position_is_not_clamped() {
        let m = CanvasMapping::new(vec2(100.0, 100.0), Vec2::ZERO, vec2(100.0, 100.0), ivec2(10, 10));
        let r = m.relative(vec2(-50.0, 150.0));
        assert_close(r, vec2(-0.5, 1.5), 1e-6);
    }

    #[test]
    fn round_trip_holds_across_canvas() {
        let states = [
            (vec2(640.0, 480.0), vec2(0.0, 0.0), vec2(800.0, 600.0), ivec2(640, 480)),
            (vec2(37.3, 12.9), vec2(-120.5, 33.25), vec2(300.0, 200.0), ivec2(1920, 1080)),
            (vec2(9000.0, 4500.0), vec2(2500.0, -900.0), vec2(1.0, 1.0), ivec2(3, 7)),
        ];
        for (image_size, offset, display, source) in states {
            let m = CanvasMapping::new(image_size, offset, display, source);
            for i in 0..=10 {
                for j in 0..=10 {
                    let p = vec2(display.x * i as f32 / 10.0, display.y * j as f32 / 10.0);
                    let back = m.image_to_canvas(m.canvas_to_image(p));
                    assert_close(back, p, 1e-3);
                }
            }
        }
    }
}
