use std::path::PathBuf;

use eframe::egui;
use path_maker::palette::{NamedColor, palette};
use path_maker::{EditSession, OverlayOptions, Style};
use tracing::info;

use super::canvas::{CanvasState, render_canvas, to_color32};

/// Starter shapes offered in the toolbar
const PRESETS: &[(&str, &str)] = &[
    ("Left bevel 12x22", "M 0,21.5 C 4,21.5 4,0 12,0.5"),
    (
        "Fat X 8x8",
        "M 2,0 L 0,2 L 2,4 L 0,6 L 2,8 L 4,6 L 6,8 L 8,6 L 6,4 L 8,2 L 6,0 L 4,2 Z",
    ),
    (
        "Fat X 10x10",
        "M 2,0 L 0,2 L 3,5 L 0,8 L 2,10 L 5,7 L 8,10 L 10,8 L 7,5 L 10,2 L 8,0 L 5,3 Z",
    ),
    (
        "Thin X 6x6",
        "M 1,0 L 0,1 L 2,3 L 0,5 L 1,6 L 3,4 L 5,6 L 6,5 L 4,3 L 6,1 L 5,0 L 3,2 Z",
    ),
    (
        "Thin X 8x8",
        "M 0,1 L 3,4 L 0,7 L 1,8 L 4,5 L 7,8 L 8,7 L 5,4 L 8,1 L 7,0 L 4,3 L 1,0 Z",
    ),
];

pub struct PathMakerApp {
    session: EditSession,
    canvas_state: CanvasState,
    /// Contents of the path text box; only parsed on Update
    path_text: String,
    file: Option<PathBuf>,
    palette: Vec<NamedColor>,
    status_message: String,
}

impl Default for PathMakerApp {
    fn default() -> Self {
        let canvas_state = CanvasState::new();
        let mut session = EditSession::new(OverlayOptions::default());
        session.set_scale(f64::from(canvas_state.zoom));
        Self {
            session,
            canvas_state,
            path_text: String::new(),
            file: None,
            palette: palette(),
            status_message: String::from("Ready - type path data or open a path file"),
        }
    }
}

impl PathMakerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, input: Option<String>) -> Self {
        let mut app = Self::default();
        if let Some(input) = input {
            let file = PathBuf::from(&input);
            if file.is_file() {
                app.load_file(file);
            } else {
                app.path_text = input;
                app.update_path();
            }
        }
        app
    }

    fn load_file(&mut self, file: PathBuf) {
        let options = *self.session.options();
        match EditSession::open(&file, options) {
            Ok(session) => {
                self.path_text = session.text().to_string();
                self.session = session;
                self.status_message = format!(
                    "Loaded: {} ({} control points)",
                    file.display(),
                    self.session.overlay().handles().len()
                );
                info!(file = %file.display(), "opened path file");
                self.file = Some(file);
            }
            Err(e) => {
                self.status_message = format!("Error loading file: {}", e);
            }
        }
    }

    fn open_file(&mut self) {
        if let Some(file) = rfd::FileDialog::new()
            .add_filter("Path files", &["xml", "path"])
            .pick_file()
        {
            self.load_file(file);
        }
    }

    fn save_to(&mut self, file: PathBuf) {
        match self.session.save(&file) {
            Ok(()) => {
                self.status_message = format!("Saved: {}", file.display());
                info!(file = %file.display(), "saved path file");
                self.file = Some(file);
            }
            Err(e) => {
                self.status_message = format!("Error saving file: {}", e);
            }
        }
    }

    fn save_file(&mut self) {
        match self.file.clone() {
            Some(file) => self.save_to(file),
            None => self.save_file_as(),
        }
    }

    fn save_file_as(&mut self) {
        if let Some(file) = rfd::FileDialog::new()
            .add_filter("Path files", &["xml", "path"])
            .set_file_name("path.xml")
            .save_file()
        {
            self.save_to(file);
        }
    }

    fn update_path(&mut self) {
        match self.session.load_text(&self.path_text) {
            Ok(()) => {
                self.status_message = format!(
                    "{} figure(s), {} control points",
                    self.session.path().figures.len(),
                    self.session.overlay().handles().len()
                );
            }
            Err(e) => {
                self.status_message = e.to_string();
            }
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open").on_hover_text("Ctrl+O").clicked() {
                self.open_file();
            }
            if ui.button("Save").on_hover_text("Ctrl+S").clicked() {
                self.save_file();
            }
            if ui.button("Save As").clicked() {
                self.save_file_as();
            }

            ui.separator();

            egui::ComboBox::from_id_salt("presets")
                .selected_text("Presets")
                .show_ui(ui, |ui| {
                    for (name, data) in PRESETS {
                        if ui.selectable_label(false, *name).clicked() {
                            self.path_text = data.to_string();
                            self.update_path();
                        }
                    }
                });

            ui.separator();

            ui.label(format!("Zoom: {:.0}%", self.canvas_state.zoom * 100.0));

            if ui.button("Reset View").clicked() {
                self.canvas_state = CanvasState::new();
                self.session.set_scale(f64::from(self.canvas_state.zoom));
            }
        });
    }

    fn color_combo(ui: &mut egui::Ui, label: &str, value: &mut String, palette: &[NamedColor]) {
        egui::ComboBox::from_label(label)
            .selected_text(value.as_str())
            .show_ui(ui, |ui| {
                for nc in palette {
                    let swatch = egui::RichText::new("■").color(to_color32(nc.color));
                    ui.horizontal(|ui| {
                        ui.label(swatch);
                        ui.selectable_value(value, nc.name.clone(), nc.name.as_str());
                    });
                }
            });
    }

    fn render_side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Path data");
        ui.separator();

        ui.add(
            egui::TextEdit::multiline(&mut self.path_text)
                .code_editor()
                .desired_rows(6)
                .desired_width(f32::INFINITY),
        );
        if ui.button("Update").clicked() {
            self.update_path();
        }

        ui.separator();
        ui.heading("Style");

        let mut style: Style = self.session.style().clone();
        Self::color_combo(ui, "Stroke", &mut style.stroke, &self.palette);
        Self::color_combo(ui, "Fill", &mut style.fill, &self.palette);
        ui.horizontal(|ui| {
            ui.label("Thickness");
            ui.add(
                egui::DragValue::new(&mut style.stroke_thickness)
                    .speed(0.1)
                    .range(0.0..=100.0),
            );
        });
        self.session.set_style(style);

        ui.separator();
        ui.heading("Properties");

        let overlay = self.session.overlay();
        ui.label(format!("Figures: {}", self.session.path().figures.len()));
        ui.label(format!("Control points: {}", overlay.handles().len()));
        ui.label(format!("Control lines: {}", overlay.lines().len()));
        if let Some(r) = self.session.bounds() {
            ui.label(format!(
                "Bounds: ({:.1}, {:.1}) - ({:.1}, {:.1})",
                r.x0, r.y0, r.x1, r.y1
            ));
            ui.label(format!("Size: {:.1} x {:.1}", r.width(), r.height()));
        }
    }
}

impl eframe::App for PathMakerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut do_open = false;
        let mut do_save = false;

        ctx.input(|i| {
            if i.key_pressed(egui::Key::O) && i.modifiers.command {
                do_open = true;
            }
            if i.key_pressed(egui::Key::S) && i.modifiers.command {
                do_save = true;
            }
        });

        if do_open {
            self.open_file();
        }
        if do_save {
            self.save_file();
        }

        let title = format!(
            "PathMaker - {}{}",
            self.file
                .as_ref()
                .and_then(|f| f.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "untitled".to_string()),
            if self.session.is_dirty() { " *" } else { "" }
        );
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Box size: {:.2}", self.session.overlay().box_side()));
                });
            });
        });

        egui::SidePanel::left("path_panel")
            .default_width(280.0)
            .show(ctx, |ui| {
                self.render_side_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(text) = render_canvas(ui, &mut self.session, &mut self.canvas_state) {
                self.path_text = text;
            }
        });
    }
}
