use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2};
use kurbo::PathEl;
use path_maker::palette::Color;
use path_maker::path::figure_to_bez_path;
use path_maker::{DragTarget, EditSession, Figure, Point};

const FLATTEN_TOLERANCE: f64 = 0.1;
const BOX_COLOR: Color32 = Color32::from_rgb(255, 100, 100);
const ACTIVE_BOX_COLOR: Color32 = Color32::from_rgb(0, 150, 255);
const CONTROL_LINE_COLOR: Color32 = Color32::from_rgb(100, 100, 255);
const FILL_ALPHA: u8 = 50;

#[derive(Debug)]
pub struct CanvasState {
    pub pan: Vec2,
    pub zoom: f32,
    /// Offset from the pointer to the grabbed point, in path units
    grab_offset: Point,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasState {
    pub fn new() -> Self {
        Self {
            pan: Vec2::new(50.0, 50.0),
            zoom: 4.0,
            grab_offset: Point::ZERO,
        }
    }

    pub fn screen_to_canvas(&self, screen_pos: Pos2, canvas_rect: Rect) -> Point {
        let local = screen_pos - canvas_rect.min.to_vec2();
        Point::new(
            f64::from((local.x - self.pan.x) / self.zoom),
            f64::from((local.y - self.pan.y) / self.zoom),
        )
    }

    pub fn canvas_to_screen(&self, canvas_pos: Point, canvas_rect: Rect) -> Pos2 {
        Pos2::new(
            canvas_pos.x as f32 * self.zoom + self.pan.x + canvas_rect.min.x,
            canvas_pos.y as f32 * self.zoom + self.pan.y + canvas_rect.min.y,
        )
    }
}

pub fn to_color32(c: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Draw the path and its overlay and route pointer input into the session.
/// Returns the published text when a drag was committed this frame.
pub fn render_canvas(
    ui: &mut egui::Ui,
    session: &mut EditSession,
    state: &mut CanvasState,
) -> Option<String> {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let canvas_rect = response.rect;

    painter.rect_filled(canvas_rect, 0.0, Color32::WHITE);

    let space_held = ui.input(|i| i.key_down(egui::Key::Space));

    if response.hovered() {
        let scroll_delta = ui.input(|i| i.raw_scroll_delta);

        if scroll_delta.y != 0.0 {
            let zoom_factor = 1.0 + scroll_delta.y * 0.002;
            let old_zoom = state.zoom;
            state.zoom = (state.zoom * zoom_factor).clamp(0.1, 50.0);

            // Zoom toward mouse position
            if let Some(mouse_pos) = response.hover_pos() {
                let local = mouse_pos - canvas_rect.min.to_vec2();
                state.pan.x = local.x - (local.x - state.pan.x) * (state.zoom / old_zoom);
                state.pan.y = local.y - (local.y - state.pan.y) * (state.zoom / old_zoom);
            }
            session.set_scale(f64::from(state.zoom));
        }
    }

    let is_panning = response.dragged_by(egui::PointerButton::Middle)
        || response.dragged_by(egui::PointerButton::Secondary)
        || (space_held && response.dragged_by(egui::PointerButton::Primary));

    if is_panning {
        state.pan += response.drag_delta();
    }

    let committed = if is_panning {
        None
    } else {
        handle_drag(session, state, &response, canvas_rect)
    };

    render_path(&painter, session, state, canvas_rect);
    render_overlay(&painter, session, state, canvas_rect);

    committed
}

fn handle_drag(
    session: &mut EditSession,
    state: &mut CanvasState,
    response: &egui::Response,
    canvas_rect: Rect,
) -> Option<String> {
    let pointer = response
        .interact_pointer_pos()
        .map(|pos| state.screen_to_canvas(pos, canvas_rect));

    if response.drag_started_by(egui::PointerButton::Primary)
        && let Some(p) = pointer
        && let Some(target) = session.hit_test(p)
    {
        if let DragTarget::Handle(id) = target
            && let Some(b) = session.overlay().overlay_box(id)
        {
            state.grab_offset = b.center - p;
        }
        if let Err(e) = session.begin_drag(target) {
            tracing::warn!("{}", e);
        }
    }

    if response.dragged_by(egui::PointerButton::Primary)
        && let Some(target) = session.active_drag()
    {
        let result = match target {
            DragTarget::Handle(id) => match pointer {
                Some(p) => session.apply_drag(id, p + state.grab_offset).map(|_| ()),
                None => Ok(()),
            },
            DragTarget::Figure(idx) => {
                let delta = response.drag_delta();
                session.drag_figure(
                    idx,
                    f64::from(delta.x / state.zoom),
                    f64::from(delta.y / state.zoom),
                )
            }
        };
        if let Err(e) = result {
            tracing::warn!("{}", e);
        }
    }

    if response.drag_stopped() && session.active_drag().is_some() {
        return Some(session.commit_drag());
    }
    None
}

/// Flattened screen-space polylines of one figure
fn figure_polylines(figure: &Figure, state: &CanvasState, canvas_rect: Rect) -> Vec<Vec<Pos2>> {
    let bez = figure_to_bez_path(figure);
    let mut lines: Vec<Vec<Pos2>> = Vec::new();
    let mut start = None;

    kurbo::flatten(bez.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            let p = state.canvas_to_screen(p.into(), canvas_rect);
            start = Some(p);
            lines.push(vec![p]);
        }
        PathEl::LineTo(p) => {
            let p = state.canvas_to_screen(p.into(), canvas_rect);
            if let Some(line) = lines.last_mut() {
                line.push(p);
            }
        }
        PathEl::ClosePath => {
            if let (Some(line), Some(s)) = (lines.last_mut(), start) {
                line.push(s);
            }
        }
        _ => {}
    });
    lines
}

fn render_path(
    painter: &egui::Painter,
    session: &EditSession,
    state: &CanvasState,
    canvas_rect: Rect,
) {
    let style = session.style();
    let stroke = Stroke::new(
        style.stroke_thickness as f32 * state.zoom,
        to_color32(style.stroke_color()),
    );
    let fill = style.fill_color();

    for figure in &session.path().figures {
        let lines = figure_polylines(figure, state, canvas_rect);

        // egui tessellates convex fills only; concave figures stay unfilled
        if figure.closed
            && !fill.is_transparent()
            && let Some(outline) = lines.first()
            && is_convex(outline)
        {
            let mut points = outline.clone();
            points.pop();
            let c = Color32::from_rgba_unmultiplied(fill.r, fill.g, fill.b, FILL_ALPHA);
            painter.add(egui::Shape::convex_polygon(points, c, Stroke::NONE));
        }

        for line in lines {
            painter.add(egui::Shape::line(line, stroke));
        }
    }
}

/// Whether a closed outline (last point repeating the first) turns the
/// same way at every corner
fn is_convex(outline: &[Pos2]) -> bool {
    let n = outline.len().saturating_sub(1);
    if n < 3 {
        return false;
    }
    let mut sign = 0.0_f32;
    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        let c = outline[(i + 2) % n];
        let cross = (b - a).x * (c - b).y - (b - a).y * (c - b).x;
        if cross.abs() <= f32::EPSILON {
            continue;
        }
        if sign != 0.0 && cross.signum() != sign {
            return false;
        }
        sign = cross.signum();
    }
    sign != 0.0
}

fn render_overlay(
    painter: &egui::Painter,
    session: &EditSession,
    state: &CanvasState,
    canvas_rect: Rect,
) {
    let overlay = session.overlay();
    let line_stroke = Stroke::new(1.0, CONTROL_LINE_COLOR);

    for line in overlay.lines() {
        let from = state.canvas_to_screen(line.from, canvas_rect);
        let to = state.canvas_to_screen(line.to, canvas_rect);
        painter.line_segment([from, to], line_stroke);
    }

    let active = match session.active_drag() {
        Some(DragTarget::Handle(id)) => Some(id),
        _ => None,
    };
    for b in overlay.boxes() {
        let [top_left, _, bottom_right, _] = b.corners();
        let rect = Rect::from_min_max(
            state.canvas_to_screen(top_left, canvas_rect),
            state.canvas_to_screen(bottom_right, canvas_rect),
        );
        let color = if active == Some(b.handle) {
            ACTIVE_BOX_COLOR
        } else {
            BOX_COLOR
        };
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, color));
    }
}
