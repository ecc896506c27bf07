use egui::{
    Align2, CornerRadius, FontId, Id, Key, PointerButton, Pos2, Rect, Response, Sense,
    Shape, Stroke, StrokeKind, Ui, Vec2, Widget,
};

use super::graph::{ConnectDraft, GraphCanvas};
use super::shape::{self, ARROW_SIZE, EDGE_HIT_DISTANCE};
use super::viewport::Viewport;
use crate::settings::{SettingsInteraction, SettingsNavigation};
use crate::ui_consts::CANVAS_HEIGHT;

const LABEL_MAX_CHARS: usize = 22;

/// Widget drawing a [`GraphCanvas`] and applying user edits to it.
///
/// Drag a node to move it, shift-drag from one node to another to connect
/// them, click to select (ctrl/cmd for several), Delete or Backspace to
/// remove the selection. Dragging the background pans, ctrl-scroll or pinch zooms.
pub struct CanvasView<'a> {
    g: &'a mut GraphCanvas,
    id: Id,
    settings_interaction: SettingsInteraction,
    settings_navigation: SettingsNavigation,
}

impl<'a> CanvasView<'a> {
    pub fn new(g: &'a mut GraphCanvas) -> Self {
        Self {
            g,
            id: Id::new("graph_studio_canvas"),
            settings_interaction: SettingsInteraction::default(),
            settings_navigation: SettingsNavigation::default(),
        }
    }

    /// Canvases with different ids keep separate zoom and pan.
    pub fn with_id(mut self, id: impl std::hash::Hash) -> Self {
        self.id = Id::new(id);
        self
    }

    pub fn with_interactions(mut self, settings_interaction: &SettingsInteraction) -> Self {
        self.settings_interaction = *settings_interaction;
        self
    }

    pub fn with_navigations(mut self, settings_navigation: &SettingsNavigation) -> Self {
        self.settings_navigation = *settings_navigation;
        self
    }

    fn handle_fit_to_screen(&self, local_rect: Rect, view: &mut Viewport) {
        if view.first_frame || self.settings_navigation.fit_to_screen_enabled {
            view.fit(
                local_rect,
                self.g.bounds(),
                self.settings_navigation.fit_to_screen_padding,
            );
        }
    }

    fn handle_hover(&mut self, resp: &Response, view: &Viewport) {
        let hovered = if self.settings_interaction.hover_enabled {
            resp.hover_pos()
                .and_then(|p| self.g.node_at(view.local_to_canvas(local_pos(resp, p))))
        } else {
            None
        };
        self.g.set_hovered_node(hovered);
    }

    /// Node dragging and shift-drag connecting. Returns true while either is active.
    fn handle_node_drag(&mut self, ui: &Ui, resp: &Response, view: &Viewport) -> bool {
        let eff = self.settings_interaction;
        let pointer_canvas = resp
            .interact_pointer_pos()
            .or_else(|| resp.hover_pos())
            .map(|p| view.local_to_canvas(local_pos(resp, p)));

        if resp.drag_started_by(PointerButton::Primary) {
            let start = resp
                .interact_pointer_pos()
                .map(|p| view.local_to_canvas(local_pos(resp, p)));
            if let Some(idx) = start.and_then(|p| self.g.node_at(p)) {
                let shift = ui.input(|i| i.modifiers.shift);
                if shift && eff.connecting_enabled {
                    self.g.set_connect_draft(Some(ConnectDraft {
                        from: idx,
                        to: start.unwrap_or_default(),
                    }));
                } else if eff.dragging_enabled {
                    self.g.set_dragged_node(Some(idx));
                }
            }
        }

        if let Some(draft) = self.g.connect_draft() {
            if let Some(to) = pointer_canvas {
                self.g.set_connect_draft(Some(ConnectDraft { to, ..draft }));
            }
            if resp.drag_stopped() {
                if let Some(target) = pointer_canvas.and_then(|p| self.g.node_at(p)) {
                    self.g.connect(draft.from, target);
                }
                self.g.set_connect_draft(None);
            }
            return true;
        }

        if let Some(idx) = self.g.dragged_node() {
            let delta = resp.drag_delta();
            if delta != Vec2::ZERO {
                self.g.move_node(idx, delta / view.zoom);
            }
            if resp.drag_stopped() || !resp.dragged() {
                self.g.set_dragged_node(None);
            }
            return true;
        }
        false
    }

    fn handle_navigation(&self, ui: &Ui, resp: &Response, view: &mut Viewport, busy: bool) {
        if !self.settings_navigation.zoom_and_pan_enabled {
            return;
        }

        if resp.hovered() {
            let (zoom_delta, hover) = ui.input(|i| (i.zoom_delta(), i.pointer.hover_pos()));
            if zoom_delta != 1.0 {
                let step = self.settings_navigation.zoom_speed * (zoom_delta - 1.0).signum();
                let local_rect = Rect::from_min_size(Pos2::ZERO, resp.rect.size());
                view.zoom_by(local_rect, step, hover.map(|p| local_pos(resp, p)));
            }
        }

        if !busy
            && (resp.dragged_by(PointerButton::Primary) || resp.dragged_by(PointerButton::Middle))
        {
            view.pan += resp.drag_delta();
        }
    }

    fn handle_click(&mut self, ui: &Ui, resp: &Response, view: &Viewport) {
        let eff = self.settings_interaction;
        if !resp.clicked() || !eff.selection_enabled {
            return;
        }
        let Some(pos) = resp.interact_pointer_pos() else {
            return;
        };
        let pos = view.local_to_canvas(local_pos(resp, pos));
        let multi = eff.selection_multi_enabled && ui.input(|i| i.modifiers.command);

        if let Some(idx) = self.g.node_at(pos) {
            let selected = self.g.node(idx).is_some_and(|n| n.selected);
            if !multi {
                self.g.deselect_all();
            }
            self.g.set_node_selected(idx, !selected);
            return;
        }
        if let Some(idx) = self.g.edge_at(pos, EDGE_HIT_DISTANCE / view.zoom) {
            let selected = self.g.edge(idx).is_some_and(|e| e.selected);
            if !multi {
                self.g.deselect_all();
            }
            self.g.set_edge_selected(idx, !selected);
            return;
        }
        self.g.deselect_all();
    }

    fn handle_delete(&mut self, ui: &Ui, resp: &Response) {
        if !self.settings_interaction.deleting_enabled
            || !resp.hovered()
            || ui.ctx().wants_keyboard_input()
        {
            return;
        }
        let pressed = ui.input(|i| i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace));
        if pressed && self.g.has_selection() {
            let removed = self.g.remove_selected();
            log::debug!("canvas: removed {removed} selected elements");
        }
    }

    fn draw(&self, ui: &Ui, painter: &egui::Painter, rect: Rect, view: &Viewport) {
        let visuals = ui.visuals();
        painter.rect_filled(rect, CornerRadius::same(4), visuals.extreme_bg_color);

        let to_screen = |p: Pos2| rect.left_top() + view.canvas_to_local(p).to_vec2();
        let edge_color = visuals.widgets.noninteractive.fg_stroke.color;
        let accent = visuals.selection.bg_fill;

        for (idx, e) in self.g.edges_iter() {
            let Some((s, t)) = self.g.edge_endpoints(idx) else {
                continue;
            };
            let (Some(s), Some(t)) = (self.g.node(s), self.g.node(t)) else {
                continue;
            };
            let (a, b) = shape::edge_segment(s.location, t.location);
            let (a, b) = (to_screen(a), to_screen(b));
            let color = if e.selected { accent } else { edge_color };
            let width = if e.selected { 2.5 } else { 1.5 };
            let tip = shape::arrow_tip(a, b, ARROW_SIZE * view.zoom.max(0.5));
            let dir = (b - a).normalized();
            painter.line_segment([a, b - dir * ARROW_SIZE * 0.5], Stroke::new(width, color));
            painter.add(Shape::convex_polygon(tip.to_vec(), color, Stroke::NONE));
        }

        if let Some(draft) = self.g.connect_draft() {
            if let Some(from) = self.g.node(draft.from) {
                let a = to_screen(shape::closest_boundary_point(from.location, draft.to));
                painter.add(Shape::dashed_line(
                    &[a, to_screen(draft.to)],
                    Stroke::new(1.5, accent),
                    6.0,
                    4.0,
                ));
            }
        }

        let font_size = (13.0 * view.zoom).clamp(6.0, 26.0);
        for (idx, n) in self.g.nodes_iter() {
            let r = shape::node_rect(n.location);
            let r = Rect::from_min_max(to_screen(r.min), to_screen(r.max));
            let hovered = self.g.hovered_node() == Some(idx);
            let stroke = if n.selected || n.dragged {
                Stroke::new(2.0, accent)
            } else if hovered {
                visuals.widgets.hovered.fg_stroke
            } else {
                visuals.widgets.noninteractive.bg_stroke
            };
            painter.rect(
                r,
                CornerRadius::same(6),
                visuals.widgets.inactive.bg_fill,
                stroke,
                StrokeKind::Inside,
            );

            let text_color = visuals.text_color();
            let label = elide(&n.label, LABEL_MAX_CHARS);
            match &n.data.subtitle {
                Some(sub) => {
                    painter.text(
                        r.center() - Vec2::new(0.0, font_size * 0.55),
                        Align2::CENTER_CENTER,
                        label,
                        FontId::proportional(font_size),
                        text_color,
                    );
                    painter.text(
                        r.center() + Vec2::new(0.0, font_size * 0.6),
                        Align2::CENTER_CENTER,
                        sub,
                        FontId::proportional(font_size * 0.75),
                        visuals.weak_text_color(),
                    );
                }
                None => {
                    painter.text(
                        r.center(),
                        Align2::CENTER_CENTER,
                        label,
                        FontId::proportional(font_size),
                        text_color,
                    );
                }
            }
        }
    }
}

impl Widget for CanvasView<'_> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let size = Vec2::new(ui.available_width(), CANVAS_HEIGHT);
        let (resp, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let mut view = Viewport::load(ui, self.id);
        let local_rect = Rect::from_min_size(Pos2::ZERO, resp.rect.size());

        self.handle_fit_to_screen(local_rect, &mut view);
        self.handle_hover(&resp, &view);
        // node drag runs first so the background does not pan on the first frame of a drag
        let busy = self.handle_node_drag(ui, &resp, &view);
        self.handle_navigation(ui, &resp, &mut view, busy);
        self.handle_click(ui, &resp, &view);
        self.handle_delete(ui, &resp);

        self.draw(ui, &painter, resp.rect, &view);
        view.save(ui, self.id);

        if self.g.dragged_node().is_some() || self.g.connect_draft().is_some() {
            ui.ctx().request_repaint();
        }
        resp
    }
}

fn local_pos(resp: &Response, p: Pos2) -> Pos2 {
    (p - resp.rect.left_top()).to_pos2()
}

fn elide(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_labels_are_elided() {
        assert_eq!(elide("short.csv", 22), "short.csv");
        let long = "a-very-long-file-name-that-overflows.xlsx";
        let out = elide(long, 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with('…'));
    }
}
