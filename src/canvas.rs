//! Display side of a panel: the seam to the rendering backend and the egui
//! implementation of it.

use crate::geometry::{IVec2, Vec2};
use crate::panel::{ChannelMask, FrameResponse, ImagePanel, PanelInput};

const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 0, 255);

/// Resources a backend keeps per panel, sized to the panel's canvas.
pub trait CanvasBackend {
    /// The canvas changed size; reallocate anything sized to it.
    fn resize(&mut self, size: IVec2);

    /// The panel's view changed; rebuild what gets shown for it.
    fn refresh(&mut self, panel: &ImagePanel);
}

/// Runs one frame for a panel: feeds input to its state machines, forwards
/// any resize request and refreshes the backend only when the panel is dirty.
pub fn drive_frame<C: CanvasBackend>(
    panel: &mut ImagePanel,
    canvas: &mut C,
    input: &PanelInput,
) -> FrameResponse {
    let response = panel.update(input);
    if let Some(size) = response.resize_canvas {
        canvas.resize(size);
    }
    if panel.needs_redraw() {
        canvas.refresh(panel);
        panel.mark_drawn();
    }
    response
}

/// Builds the on-screen texture contents for `pixels` under `mask`.
pub fn masked_color_image(pixels: &image::RgbaImage, mask: ChannelMask) -> egui::ColorImage {
    let size = [pixels.width() as usize, pixels.height() as usize];
    if mask.is_identity() {
        return egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_raw());
    }
    let masked: Vec<u8> = pixels.pixels().flat_map(|p| mask.apply(p.0)).collect();
    egui::ColorImage::from_rgba_unmultiplied(size, &masked)
}

/// egui-backed canvas: one texture per panel plus the cached screen rect of
/// the rendered image.
pub struct EguiCanvas {
    ctx: egui::Context,
    name: String,
    texture: Option<egui::TextureHandle>,
    shown_channels: Option<ChannelMask>,
    size: IVec2,
    image_rect: egui::Rect,
}

impl EguiCanvas {
    /// `size` is the canvas size the panel was created with; later changes
    /// arrive through [`CanvasBackend::resize`].
    pub fn new(ctx: &egui::Context, name: impl Into<String>, size: IVec2) -> Self {
        Self {
            ctx: ctx.clone(),
            name: name.into(),
            texture: None,
            shown_channels: None,
            size: size.max(IVec2::ONE),
            image_rect: egui::Rect::NOTHING,
        }
    }

    /// Screen rect of the render target when its top-left sits at `origin`.
    pub fn target_rect(&self, origin: egui::Pos2) -> egui::Rect {
        egui::Rect::from_min_size(origin, egui::vec2(self.size.x as f32, self.size.y as f32))
    }

    /// Paints the image, its border and the selection overlay into the
    /// render target anchored at `canvas_rect.min`, clipped to both.
    pub fn paint(&self, ui: &egui::Ui, canvas_rect: egui::Rect, panel: &ImagePanel) {
        let painter = ui.painter_at(canvas_rect.intersect(self.target_rect(canvas_rect.min)));
        let origin = canvas_rect.min.to_vec2();
        let image_rect = self.image_rect.translate(origin);

        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        painter.rect_stroke(
            image_rect,
            0.0,
            ui.visuals().widgets.noninteractive.bg_stroke,
            egui::StrokeKind::Outside,
        );

        if let Some(rect) = panel.selection_rect() {
            let mapping = panel.mapping();
            let min = to_pos(mapping.image_to_canvas(rect.min.as_vec2())) + origin;
            let max = to_pos(mapping.image_to_canvas(rect.max.as_vec2())) + origin;
            painter.rect_stroke(
                egui::Rect::from_min_max(min, max),
                0.0,
                egui::Stroke::new(1.0, SELECTION_COLOR),
                egui::StrokeKind::Middle,
            );
        }
    }
}

impl CanvasBackend for EguiCanvas {
    fn resize(&mut self, size: IVec2) {
        tracing::debug!("{}: render target now {}x{}", self.name, size.x, size.y);
        self.size = size;
    }

    fn refresh(&mut self, panel: &ImagePanel) {
        let channels = panel.channels();
        if self.texture.is_none() || self.shown_channels != Some(channels) {
            let image = masked_color_image(panel.pixels(), channels);
            self.texture = Some(self.ctx.load_texture(
                self.name.clone(),
                image,
                egui::TextureOptions::NEAREST,
            ));
            self.shown_channels = Some(channels);
        }
        let mapping = panel.mapping();
        self.image_rect =
            egui::Rect::from_min_max(to_pos(mapping.top_left()), to_pos(mapping.bottom_right()));
        self.ctx.request_repaint();
    }
}

fn to_pos(v: Vec2) -> egui::Pos2 {
    egui::pos2(v.x, v.y)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::geometry::{ivec2, vec2};
    use crate::panel::{ButtonEdges, DragState};

    #[derive(Default)]
    struct RecordingCanvas {
        resizes: Vec<IVec2>,
        refreshes: usize,
    }

    impl CanvasBackend for RecordingCanvas {
        fn resize(&mut self, size: IVec2) {
            self.resizes.push(size);
        }

        fn refresh(&mut self, _panel: &ImagePanel) {
            self.refreshes += 1;
        }
    }

    fn panel() -> ImagePanel {
        ImagePanel::new(
            PathBuf::from("/tmp/canvas.png"),
            RgbaImage::from_pixel(50, 40, Rgba([1, 2, 3, 255])),
            vec2(100.0, 100.0),
            1.1,
        )
    }

    fn input(display: Vec2) -> PanelInput {
        PanelInput {
            display_size: display,
            pointer: Some(vec2(50.0, 50.0)),
            hovered: true,
            ..PanelInput::default()
        }
    }

    #[test]
    fn first_frame_refreshes_then_stays_quiet() {
        let mut p = panel();
        let mut canvas = RecordingCanvas::default();
        drive_frame(&mut p, &mut canvas, &input(vec2(100.0, 100.0)));
        drive_frame(&mut p, &mut canvas, &input(vec2(100.0, 100.0)));
        assert_eq!(canvas.refreshes, 1);
        assert!(canvas.resizes.is_empty());
        assert!(!p.needs_redraw());
    }

    #[test]
    fn resize_is_forwarded_to_backend() {
        let mut p = panel();
        let mut canvas = RecordingCanvas::default();
        drive_frame(&mut p, &mut canvas, &input(vec2(100.0, 100.0)));
        let response = drive_frame(&mut p, &mut canvas, &input(vec2(240.0, 0.0)));
        assert_eq!(response.resize_canvas, Some(ivec2(240, 1)));
        assert_eq!(canvas.resizes, vec![ivec2(240, 1)]);
        assert_eq!(canvas.refreshes, 2);
    }

    #[test]
    fn selection_alone_does_not_refresh_backend() {
        let mut p = panel();
        let mut canvas = RecordingCanvas::default();
        drive_frame(&mut p, &mut canvas, &input(vec2(100.0, 100.0)));
        let press = PanelInput {
            primary: ButtonEdges { pressed: true, released: false },
            ..input(vec2(100.0, 100.0))
        };
        drive_frame(&mut p, &mut canvas, &press);
        assert_eq!(p.drag_state(), DragState::Selecting);
        assert_eq!(canvas.refreshes, 1);
    }

    #[test]
    fn wheel_zoom_refreshes_backend() {
        let mut p = panel();
        let mut canvas = RecordingCanvas::default();
        drive_frame(&mut p, &mut canvas, &input(vec2(100.0, 100.0)));
        drive_frame(&mut p, &mut canvas, &PanelInput { wheel: 1.0, ..input(vec2(100.0, 100.0)) });
        assert_eq!(canvas.refreshes, 2);
    }

    #[test]
    fn egui_canvas_tracks_resized_target() {
        let ctx = egui::Context::default();
        let mut p = panel();
        let mut canvas = EguiCanvas::new(&ctx, "target", p.viewport().display_size().floor_to_ivec());
        drive_frame(&mut p, &mut canvas, &input(vec2(100.0, 100.0)));
        assert_eq!(
            canvas.target_rect(egui::Pos2::ZERO),
            egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(100.0, 100.0))
        );
        drive_frame(&mut p, &mut canvas, &input(vec2(320.5, 180.0)));

        let origin = egui::pos2(10.0, 20.0);
        assert_eq!(
            canvas.target_rect(origin),
            egui::Rect::from_min_size(origin, egui::vec2(320.0, 180.0))
        );
    }

    #[test]
    fn masked_image_hides_channels() {
        let pixels = RgbaImage::from_pixel(2, 1, Rgba([200, 100, 50, 128]));
        let mask = ChannelMask { g: false, b: false, ..ChannelMask::default() };
        let image = masked_color_image(&pixels, mask);
        assert_eq!(image.size, [2, 1]);
        assert_eq!(image.pixels[0], egui::Color32::from_rgba_unmultiplied(200, 0, 0, 128));
    }
}
