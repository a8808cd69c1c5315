//! Per-image interaction state and the per-frame input reducer.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::export::{self, ExportError, ExportOptions};
use crate::geometry::{IVec2, Vec2, ivec2};
use crate::mapping::CanvasMapping;
use crate::selection::{PixelRect, Selection};
use crate::viewport::Viewport;

/// Which pointer drag, if any, this panel currently owns. A drag belongs to
/// the panel it started in and keeps going if the pointer leaves the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Panning,
    Selecting,
}

/// Press/release edges of one pointer button during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonEdges {
    pub pressed: bool,
    pub released: bool,
}

/// Everything the host polls once per frame for one panel's canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanelInput {
    /// Size of the canvas region the layout gave this panel.
    pub display_size: Vec2,
    /// Pointer position relative to the canvas origin, if the pointer is
    /// anywhere over the window.
    pub pointer: Option<Vec2>,
    /// Pointer is over this panel's canvas and not covered by another layer.
    pub hovered: bool,
    pub primary: ButtonEdges,
    pub secondary: ButtonEdges,
    /// Screen-space pointer travel since the previous frame.
    pub pointer_delta: Vec2,
    /// Wheel travel in notches; positive zooms in.
    pub wheel: f32,
    pub cancel: bool,
}

/// Side effects the host must carry out after [`ImagePanel::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameResponse {
    /// The canvas changed size; reallocate the backing render target.
    pub resize_canvas: Option<IVec2>,
}

/// Which colour channels are shown on screen. Export ignores the mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
    pub a: bool,
}

impl Default for ChannelMask {
    fn default() -> Self {
        Self {
            r: true,
            g: true,
            b: true,
            a: true,
        }
    }
}

impl ChannelMask {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Zeroes hidden colour channels; hidden alpha renders opaque.
    pub fn apply(&self, rgba: [u8; 4]) -> [u8; 4] {
        [
            if self.r { rgba[0] } else { 0 },
            if self.g { rgba[1] } else { 0 },
            if self.b { rgba[2] } else { 0 },
            if self.a { rgba[3] } else { 255 },
        ]
    }
}

/// One open image: its decoded pixels plus view and selection state.
pub struct ImagePanel {
    path: PathBuf,
    file_name: String,
    pixels: RgbaImage,
    viewport: Viewport,
    selection: Selection,
    drag: DragState,
    channels: ChannelMask,
    zoom_sensitivity: f32,
}

impl ImagePanel {
    pub fn new(path: PathBuf, pixels: RgbaImage, display_size: Vec2, zoom_sensitivity: f32) -> Self {
        let source_size = ivec2(pixels.width() as i32, pixels.height() as i32);
        Self {
            file_name: crate::loader::file_name(&path),
            path,
            pixels,
            viewport: Viewport::new(source_size, display_size),
            selection: Selection::default(),
            drag: DragState::Idle,
            channels: ChannelMask::default(),
            zoom_sensitivity,
        }
    }

    /// Decodes `path` and builds a panel for it. Fails without side effects
    /// when the file cannot be decoded.
    pub fn open(path: &Path, display_size: Vec2, zoom_sensitivity: f32) -> anyhow::Result<Self> {
        let pixels = crate::loader::open_rgba(path)?;
        Ok(Self::new(path.to_path_buf(), pixels, display_size, zoom_sensitivity))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn source_size(&self) -> IVec2 {
        self.viewport.source_size()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_rect(&self) -> Option<PixelRect> {
        self.selection.rect(self.source_size())
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn mapping(&self) -> CanvasMapping {
        self.viewport.mapping()
    }

    pub fn channels(&self) -> ChannelMask {
        self.channels
    }

    pub fn set_channels(&mut self, channels: ChannelMask) {
        if channels != self.channels {
            self.channels = channels;
            self.viewport.request_redraw();
        }
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn needs_redraw(&self) -> bool {
        self.viewport.needs_redraw()
    }

    pub fn mark_drawn(&mut self) {
        self.viewport.mark_drawn();
    }

    /// Applies one frame of input: canvas resize, then pan, then selection,
    /// then wheel zoom, then cancel.
    pub fn update(&mut self, input: &PanelInput) -> FrameResponse {
        let resize_canvas = self.viewport.sync_display_size(input.display_size);
        if let Some(size) = resize_canvas {
            tracing::debug!("{}: canvas resized to {}x{}", self.file_name, size.x, size.y);
        }

        self.update_pan(input);
        self.update_selection(input);

        if input.hovered && input.wheel != 0.0 {
            if let Some(cursor) = input.pointer {
                self.viewport.zoom_at(cursor, input.wheel, self.zoom_sensitivity);
            }
        }

        if input.cancel && (self.selection.is_set() || self.drag == DragState::Selecting) {
            self.selection.clear();
            if self.drag == DragState::Selecting {
                self.drag = DragState::Idle;
            }
        }

        FrameResponse { resize_canvas }
    }

    /// Pointer travel counts only from the frame after the press.
    fn update_pan(&mut self, input: &PanelInput) {
        if self.drag == DragState::Panning {
            self.viewport.pan(input.pointer_delta);
        }
        if input.secondary.pressed && input.hovered && self.drag == DragState::Idle {
            self.drag = DragState::Panning;
        }
        if input.secondary.released && self.drag == DragState::Panning {
            self.drag = DragState::Idle;
        }
    }

    fn update_selection(&mut self, input: &PanelInput) {
        let source = self.source_size();
        if input.primary.pressed && input.hovered && self.drag == DragState::Idle {
            if let Some(cursor) = input.pointer {
                self.selection.begin(self.mapping().canvas_to_image(cursor), source);
                self.drag = DragState::Selecting;
            }
        }
        if self.drag == DragState::Selecting {
            if let Some(cursor) = input.pointer {
                self.selection.drag_to(self.mapping().canvas_to_image(cursor), source);
            }
        }
        if input.primary.released && self.drag == DragState::Selecting {
            self.drag = DragState::Idle;
        }
    }

    pub fn export_selection(&self, path: &Path, options: &ExportOptions) -> Result<PixelRect, ExportError> {
        export::export_selection(&self.pixels, &self.selection, path, options)
    }

    pub fn export_whole(&self, path: &Path, options: &ExportOptions) -> Result<PixelRect, ExportError> {
        export::export_whole(&self.pixels, path, options)
    }
}
