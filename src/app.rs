use std::path::PathBuf;

use crate::canvas::{EguiCanvas, drive_frame};
use crate::config::AppConfig;
use crate::export::{ExportFormat, ExportOptions, build_output_path};
use crate::geometry::{Vec2, vec2};
use crate::manager::{PanelId, PanelManager};
use crate::panel::{ButtonEdges, ChannelMask, ImagePanel, PanelInput};

/// Canvas size a panel assumes until the layout reports its real size.
const INITIAL_CANVAS: Vec2 = vec2(512.0, 512.0);
/// Share of the window width given to the controls panel.
const CONTROLS_RATIO: f32 = 0.25;
/// egui reports pixel-precise wheels in points; this many make one notch.
const POINTS_PER_NOTCH: f32 = 50.0;
const NOTCHES_PER_PAGE: f32 = 10.0;

#[derive(Clone, Copy, PartialEq, Eq)]
enum ExportScope {
    Selection,
    Whole,
}

impl ExportScope {
    fn suffix(self) -> &'static str {
        match self {
            ExportScope::Selection => "selection",
            ExportScope::Whole => "full",
        }
    }
}

pub struct RegionViewApp {
    panels: PanelManager<EguiCanvas>,
    pending_open: Vec<PathBuf>,
    pending_close: Vec<PanelId>,
    force_focus: Option<PanelId>,
    zoom_sensitivity: f32,
    open_path: String,
    export_dir: String,
    export_format: ExportFormat,
    status: String,
    config: AppConfig,
}

impl RegionViewApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        zoom_sensitivity: f32,
        initial_paths: Vec<PathBuf>,
    ) -> Self {
        let open_path = config
            .open_dir
            .as_ref()
            .map(|d| format!("{}/", d.display()))
            .unwrap_or_default();
        Self {
            panels: PanelManager::new(),
            pending_open: initial_paths,
            pending_close: Vec::new(),
            force_focus: None,
            zoom_sensitivity,
            open_path,
            export_dir: config.export_dir().display().to_string(),
            export_format: ExportFormat::Png,
            status: String::new(),
            config,
        }
    }

    fn open_image(&mut self, ctx: &egui::Context, path: PathBuf) {
        if !crate::loader::is_supported_image(&path) {
            tracing::debug!("{} has an unfamiliar extension, trying anyway", path.display());
        }
        match ImagePanel::open(&path, INITIAL_CANVAS, self.zoom_sensitivity) {
            Ok(panel) => {
                let target = panel.viewport().display_size().floor_to_ivec();
                let canvas = EguiCanvas::new(ctx, panel.file_name(), target);
                let size = panel.source_size();
                let id = self.panels.add_panel(panel, canvas);
                self.force_focus = Some(id);
                self.status = format!("Opened {} ({}x{})", path.display(), size.x, size.y);
                if let Some(parent) = path.parent() {
                    self.config.open_dir = Some(parent.to_path_buf());
                }
            }
            Err(err) => {
                tracing::warn!("failed to open {}: {:#}", path.display(), err);
                self.status = format!("Could not open {}: {:#}", path.display(), err);
            }
        }
    }

    fn export_focused(&mut self, scope: ExportScope) {
        let Some(open) = self.panels.focused() else {
            self.status = "No image open".to_string();
            return;
        };
        let dir = expand_home_prefix(&self.export_dir);
        if dir.as_os_str().is_empty() {
            self.status = "Export directory is empty".to_string();
            return;
        }
        if let Err(err) = std::fs::create_dir_all(&dir) {
            self.status = format!("Cannot create {}: {}", dir.display(), err);
            return;
        }

        let stem = open
            .panel
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let path = build_output_path(&dir, stem, scope.suffix(), self.export_format);
        let options = ExportOptions {
            format: self.export_format,
            png_compression: self.config.png_compression(),
        };
        let result = match scope {
            ExportScope::Selection => open.panel.export_selection(&path, &options),
            ExportScope::Whole => open.panel.export_whole(&path, &options),
        };
        self.status = match result {
            Ok(rect) => format!(
                "Saved {}x{} to {}",
                rect.width(),
                rect.height(),
                path.display()
            ),
            Err(err) => format!("Export failed: {}", err),
        };
        self.config.export_dir = Some(dir);
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Open").strong());
        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.open_path)
                    .desired_width(ui.available_width() - 60.0)
                    .hint_text("path to an image")
                    .font(egui::TextStyle::Monospace),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if (ui.button("Open").clicked() || submitted) && !self.open_path.trim().is_empty() {
                self.pending_open.push(expand_home_prefix(self.open_path.trim()));
            }
        });
        ui.label(egui::RichText::new("Files can also be dropped onto the window.").weak());
        ui.separator();

        let Some(open) = self.panels.focused_mut() else {
            ui.label("No image open");
            show_status(ui, &self.status);
            return;
        };

        let panel = &mut open.panel;
        ui.label(egui::RichText::new(panel.file_name()).strong().size(13.0));
        let size = panel.source_size();
        let viewport = panel.viewport();
        egui::Grid::new("panel_info_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label(egui::RichText::new("Size").weak());
                ui.label(format!("{} x {}", size.x, size.y));
                ui.end_row();
                ui.label(egui::RichText::new("Zoom").weak());
                ui.label(format!("{:.0}%", viewport.zoom() * 100.0));
                ui.end_row();
                ui.label(egui::RichText::new("Offset").weak());
                let offset = viewport.image_offset();
                ui.label(format!("{:.0}, {:.0}", offset.x, offset.y));
                ui.end_row();
                ui.label(egui::RichText::new("Selection").weak());
                match panel.selection_rect() {
                    Some(rect) => ui.label(format!(
                        "{}, {} .. {}, {} ({} x {})",
                        rect.min.x,
                        rect.min.y,
                        rect.max.x,
                        rect.max.y,
                        rect.width(),
                        rect.height()
                    )),
                    None => ui.label("none"),
                };
                ui.end_row();
            });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui.button("Reset view").clicked() {
                panel.reset_view();
            }
        });

        ui.add_space(4.0);
        ui.label(egui::RichText::new("Channels").strong());
        let mut channels: ChannelMask = panel.channels();
        ui.horizontal(|ui| {
            ui.checkbox(&mut channels.r, "R");
            ui.checkbox(&mut channels.g, "G");
            ui.checkbox(&mut channels.b, "B");
            ui.checkbox(&mut channels.a, "A");
        });
        panel.set_channels(channels);

        ui.separator();
        ui.label(egui::RichText::new("Export").strong());
        ui.label("Directory");
        ui.add(
            egui::TextEdit::singleline(&mut self.export_dir)
                .desired_width(ui.available_width())
                .font(egui::TextStyle::Monospace),
        );
        egui::ComboBox::from_label("Format")
            .selected_text(self.export_format.label())
            .show_ui(ui, |ui| {
                for fmt in ExportFormat::ALL {
                    ui.selectable_value(&mut self.export_format, fmt, fmt.label());
                }
            });
        if !self.export_format.is_supported() {
            ui.label(
                egui::RichText::new(format!("{} export is not available yet", self.export_format.label()))
                    .weak(),
            );
        }

        let has_selection = panel.selection().is_set();
        let mut requested = None;
        ui.horizontal(|ui| {
            if ui
                .add_enabled(has_selection, egui::Button::new("Export selection"))
                .clicked()
            {
                requested = Some(ExportScope::Selection);
            }
            if ui.button("Export image").clicked() {
                requested = Some(ExportScope::Whole);
            }
        });
        if let Some(scope) = requested {
            self.export_focused(scope);
        }

        show_status(ui, &self.status);
    }
}

fn show_status(ui: &mut egui::Ui, status: &str) {
    if !status.is_empty() {
        ui.separator();
        ui.label(status);
    }
}

/// Sums this frame's wheel events into notches; positive scrolls up.
fn wheel_notches(events: &[egui::Event]) -> f32 {
    events
        .iter()
        .map(|event| match event {
            egui::Event::MouseWheel { unit, delta, .. } => match unit {
                egui::MouseWheelUnit::Line => delta.y,
                egui::MouseWheelUnit::Point => delta.y / POINTS_PER_NOTCH,
                egui::MouseWheelUnit::Page => delta.y * NOTCHES_PER_PAGE,
            },
            _ => 0.0,
        })
        .sum()
}

fn panel_input(
    input: &egui::InputState,
    canvas_rect: egui::Rect,
    hovered: bool,
    cancel: bool,
) -> PanelInput {
    let pointer = &input.pointer;
    PanelInput {
        display_size: canvas_rect.size().into(),
        pointer: pointer.latest_pos().map(|p| (p - canvas_rect.min).into()),
        hovered,
        primary: button_edges(pointer, egui::PointerButton::Primary),
        secondary: button_edges(pointer, egui::PointerButton::Secondary),
        pointer_delta: pointer.delta().into(),
        wheel: wheel_notches(&input.events),
        cancel,
    }
}

fn button_edges(pointer: &egui::PointerState, button: egui::PointerButton) -> ButtonEdges {
    ButtonEdges {
        pressed: pointer.button_pressed(button),
        released: pointer.button_released(button),
    }
}

fn next_panel_spawn_pos(index: u32, viewport_rect: Option<egui::Rect>) -> egui::Pos2 {
    const BASE_X: f32 = 24.0;
    const BASE_Y: f32 = 48.0;
    const STEP: f32 = 32.0;

    let step = (index % 10) as f32;
    let raw_x = BASE_X + STEP * step;
    let raw_y = BASE_Y + STEP * step;

    if let Some(rect) = viewport_rect {
        let max_x = (rect.right() - 220.0).max(rect.left() + 8.0);
        let max_y = (rect.bottom() - 160.0).max(rect.top() + 8.0);
        egui::pos2(raw_x.min(max_x), raw_y.min(max_y))
    } else {
        egui::pos2(raw_x, raw_y)
    }
}

fn expand_home_prefix(raw: &str) -> PathBuf {
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

fn panel_window_id(id: PanelId) -> egui::Id {
    egui::Id::new(("image_panel", id.get()))
}

impl eframe::App for RegionViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let viewport_rect = ctx.input(|i| i.viewport().inner_rect);

        // Track window size for saving on exit
        if let Some(rect) = viewport_rect {
            self.config.window_width = Some(rect.width());
            self.config.window_height = Some(rect.height());
        }

        // Panels closed last frame release their pixels and textures here
        for id in std::mem::take(&mut self.pending_close) {
            self.panels.remove_panel(id);
        }

        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        self.pending_open.extend(dropped);
        for path in std::mem::take(&mut self.pending_open) {
            self.open_image(ctx, path);
        }

        egui::TopBottomPanel::top("main_menu").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let focused = self.panels.focused_id().is_some();
                if ui
                    .add_enabled(focused, egui::Button::new("Export Selection"))
                    .clicked()
                {
                    self.export_focused(ExportScope::Selection);
                }
                if ui.add_enabled(focused, egui::Button::new("Export Image")).clicked() {
                    self.export_focused(ExportScope::Whole);
                }
                ui.separator();
                ui.label(format!("{} open", self.panels.len()));
            });
        });

        let controls_width = viewport_rect
            .map(|r| (r.width() * CONTROLS_RATIO).max(240.0))
            .unwrap_or(320.0);
        egui::SidePanel::right("controls")
            .default_width(controls_width)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("controls_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| self.show_controls(ui));
            });

        // Empty central panel as background (required by egui)
        egui::CentralPanel::default().show(ctx, |_ui| {});

        if let Some(id) = self.force_focus.take() {
            ctx.move_to_top(egui::LayerId::new(egui::Order::Middle, panel_window_id(id)));
        }

        let focused_id = self.panels.focused_id();
        let cancel = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        let mut newly_active: Option<PanelId> = None;
        for open in self.panels.iter_mut() {
            let id = open.id;
            let mut is_open = true;
            let resp = egui::Window::new(open.panel.file_name())
                .id(panel_window_id(id))
                .open(&mut is_open)
                .default_size([640.0, 480.0])
                .default_pos(next_panel_spawn_pos(id.get(), viewport_rect))
                .frame(egui::Frame::window(&ctx.style()).inner_margin(egui::Margin::ZERO))
                .show(ctx, |ui| {
                    let size = ui.available_size().max(egui::vec2(1.0, 1.0));
                    let (canvas_rect, response) =
                        ui.allocate_exact_size(size, egui::Sense::click_and_drag());
                    let hovered = response.hovered();
                    let cancel = cancel && focused_id == Some(id);
                    let input = ui.input(|i| panel_input(i, canvas_rect, hovered, cancel));
                    drive_frame(&mut open.panel, &mut open.canvas, &input);
                    open.canvas.paint(ui, canvas_rect, &open.panel);
                });

            // Detect clicks inside this panel's window to make it active
            if let Some(inner) = resp {
                let clicked_inside = inner.response.contains_pointer()
                    && ctx.input(|i| i.pointer.any_pressed());
                if clicked_inside {
                    newly_active = Some(id);
                }
            }
            if !is_open {
                self.pending_close.push(id);
            }
        }
        if let Some(id) = newly_active {
            self.panels.bring_to_front(id);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let dir = expand_home_prefix(&self.export_dir);
        if !dir.as_os_str().is_empty() {
            self.config.export_dir = Some(dir);
        }
        self.config.save();
    }
}
