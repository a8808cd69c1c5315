//! Rectangular selection in source-image pixel space.

use crate::geometry::{IVec2, Vec2, ivec2};

/// Half-open pixel rectangle `[min, max)` in source-image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub min: IVec2,
    pub max: IVec2,
}

impl PixelRect {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    pub fn full(source_size: IVec2) -> Self {
        Self::new(IVec2::ZERO, source_size)
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }
}

/// Two raw corners of a user-dragged selection. The corners are stored as
/// dragged; only [`Selection::rect`] orders and clamps them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    start: Option<IVec2>,
    end: Option<IVec2>,
}

impl Selection {
    pub fn start(&self) -> Option<IVec2> {
        self.start
    }

    pub fn end(&self) -> Option<IVec2> {
        self.end
    }

    pub fn is_set(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Anchors a new selection at `image_point`. Both corners start at the
    /// same pixel so a click without movement selects exactly that pixel.
    pub fn begin(&mut self, image_point: Vec2, source_size: IVec2) {
        let p = clamp_to_source(image_point, source_size);
        self.start = Some(p);
        self.end = Some(p);
    }

    /// Moves the free corner while a selection drag is in progress.
    pub fn drag_to(&mut self, image_point: Vec2, source_size: IVec2) {
        if self.start.is_none() {
            return;
        }
        self.end = Some(clamp_to_source(image_point, source_size));
    }

    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Ordered, clamped rectangle covering both corners, inclusive of the
    /// pixel under the max corner. `None` until both corners are set.
    pub fn rect(&self, source_size: IVec2) -> Option<PixelRect> {
        let (a, b) = (self.start?, self.end?);
        Some(normalized_rect(a, b, source_size))
    }
}

/// Orders two corners, adds one pixel to the max corner and clamps both
/// into the source bounds so `min < max` holds on each axis.
pub fn normalized_rect(a: IVec2, b: IVec2, source_size: IVec2) -> PixelRect {
    let size = source_size.max(IVec2::ONE);
    let min = a.min(b).clamp(IVec2::ZERO, size - IVec2::ONE);
    let max = (a.max(b) + IVec2::ONE).clamp(IVec2::ZERO, size);
    PixelRect::new(min, max.max(min + IVec2::ONE))
}

fn clamp_to_source(image_point: Vec2, source_size: IVec2) -> IVec2 {
    image_point
        .floor_to_ivec()
        .clamp(IVec2::ZERO, ivec2(source_size.x.max(0), source_size.y.max(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vec2;

    const SOURCE: IVec2 = ivec2(100, 100);

    #[test]
    fn click_without_movement_selects_one_pixel() {
        let mut sel = Selection::default();
        sel.begin(vec2(10.4, 10.9), SOURCE);
        assert_eq!(sel.start(), sel.end());
        assert_eq!(sel.rect(SOURCE), Some(PixelRect::new(ivec2(10, 10), ivec2(11, 11))));
    }

    #[test]
    fn inverted_drag_is_normalized() {
        let mut sel = Selection::default();
        sel.begin(vec2(60.0, 5.0), SOURCE);
        sel.drag_to(vec2(20.0, 40.0), SOURCE);
        assert_eq!(sel.start(), Some(ivec2(60, 5)));
        assert_eq!(sel.rect(SOURCE), Some(PixelRect::new(ivec2(20, 5), ivec2(61, 41))));
    }

    #[test]
    fn corners_are_clamped_to_source_bounds() {
        let mut sel = Selection::default();
        sel.begin(vec2(-30.0, 250.0), SOURCE);
        assert_eq!(sel.start(), Some(ivec2(0, 100)));
        sel.drag_to(vec2(500.0, -1.0), SOURCE);
        assert_eq!(sel.end(), Some(ivec2(100, 0)));
    }

    #[test]
    fn corner_on_far_edge_still_yields_non_empty_rect() {
        let r = normalized_rect(ivec2(100, 100), ivec2(100, 100), SOURCE);
        assert_eq!(r, PixelRect::new(ivec2(99, 99), ivec2(100, 100)));
    }

    #[test]
    fn normalized_rect_invariants_hold_for_any_corners() {
        let coords = [-5, 0, 1, 49, 50, 99, 100, 130];
        for &ax in &coords {
            for &ay in &coords {
                for &bx in &coords {
                    for &by in &coords {
                        let r = normalized_rect(ivec2(ax, ay), ivec2(bx, by), ivec2(100, 80));
                        assert!(0 <= r.min.x && r.min.x < r.max.x && r.max.x <= 100, "{r:?}");
                        assert!(0 <= r.min.y && r.min.y < r.max.y && r.max.y <= 80, "{r:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn clear_empties_selection() {
        let mut sel = Selection::default();
        sel.begin(vec2(1.0, 1.0), SOURCE);
        sel.clear();
        assert!(!sel.is_set());
        assert_eq!(sel.rect(SOURCE), None);
    }

    #[test]
    fn drag_without_anchor_is_ignored() {
        let mut sel = Selection::default();
        sel.drag_to(vec2(5.0, 5.0), SOURCE);
        assert_eq!(sel.end(), None);
    }
}
