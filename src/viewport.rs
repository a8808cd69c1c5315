use crate::geometry::{IVec2, Vec2};
use crate::mapping::CanvasMapping;

/// Default ratio applied per wheel notch.
pub const DEFAULT_ZOOM_SENSITIVITY: f32 = 1.1;
/// Smallest on-screen extent, in pixels, either image axis may shrink to.
pub const MIN_IMAGE_EXTENT: f32 = 1.0;
/// Largest scale relative to the source size.
pub const MAX_ZOOM: f32 = 256.0;

/// Pan offset, on-screen image size and canvas size of one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    source_size: IVec2,
    display_size: Vec2,
    image_size: Vec2,
    image_offset: Vec2,
    should_redraw: bool,
}

impl Viewport {
    /// Starts at 1:1 scale, centred, with a canvas of `display_size`.
    pub fn new(source_size: IVec2, display_size: Vec2) -> Self {
        Self {
            source_size,
            display_size: clamp_display(display_size),
            image_size: source_size.as_vec2().max(Vec2::splat(MIN_IMAGE_EXTENT)),
            image_offset: Vec2::ZERO,
            should_redraw: true,
        }
    }

    pub fn source_size(&self) -> IVec2 {
        self.source_size
    }

    pub fn display_size(&self) -> Vec2 {
        self.display_size
    }

    pub fn image_size(&self) -> Vec2 {
        self.image_size
    }

    pub fn image_offset(&self) -> Vec2 {
        self.image_offset
    }

    /// Current scale of the rendered image relative to the source.
    pub fn zoom(&self) -> f32 {
        self.image_size.x / self.source_size.x.max(1) as f32
    }

    pub fn mapping(&self) -> CanvasMapping {
        CanvasMapping::new(self.image_size, self.image_offset, self.display_size, self.source_size)
    }

    pub fn needs_redraw(&self) -> bool {
        self.should_redraw
    }

    pub fn request_redraw(&mut self) {
        self.should_redraw = true;
    }

    pub fn mark_drawn(&mut self) {
        self.should_redraw = false;
    }

    /// Records the canvas size reported by the host layout. Returns the new
    /// integer size when it changed, so the caller can reallocate the
    /// backing render target. The pan offset is left untouched.
    pub fn sync_display_size(&mut self, reported: Vec2) -> Option<IVec2> {
        let size = clamp_display(reported);
        if size == self.display_size {
            return None;
        }
        self.display_size = size;
        self.should_redraw = true;
        Some(size.floor_to_ivec())
    }

    /// Screen-space pan: one pixel of pointer travel is one pixel of offset.
    pub fn pan(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.image_offset += delta;
        self.should_redraw = true;
    }

    /// Zooms by `sensitivity ^ wheel_delta` around `cursor`, keeping the
    /// canvas point under the cursor fixed. The factor is clamped so the
    /// image never shrinks below [`MIN_IMAGE_EXTENT`] or grows past
    /// [`MAX_ZOOM`].
    pub fn zoom_at(&mut self, cursor: Vec2, wheel_delta: f32, sensitivity: f32) {
        if wheel_delta == 0.0 {
            return;
        }
        let requested = sensitivity.powf(wheel_delta);
        if requested.is_nan() {
            return;
        }
        let factor = self.clamp_zoom_factor(requested);

        let relative = self.mapping().relative(cursor);
        self.image_size *= factor;

        let desired_top_left = cursor - relative * self.image_size;
        self.image_offset = desired_top_left + self.image_size / 2.0 - self.display_size / 2.0;
        self.should_redraw = true;
    }

    /// Back to 1:1 scale, centred.
    pub fn reset(&mut self) {
        self.image_size = self.source_size.as_vec2().max(Vec2::splat(MIN_IMAGE_EXTENT));
        self.image_offset = Vec2::ZERO;
        self.should_redraw = true;
    }

    fn clamp_zoom_factor(&self, requested: f32) -> f32 {
        let floor = MIN_IMAGE_EXTENT / self.image_size.min_elem();
        let ceiling = MAX_ZOOM * self.source_size.x.max(1) as f32 / self.image_size.x;
        requested.max(floor).min(ceiling.max(floor))
    }
}

fn clamp_display(size: Vec2) -> Vec2 {
    if !size.is_finite() {
        return Vec2::ONE;
    }
    size.max(Vec2::ONE)
}
