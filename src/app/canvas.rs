use eframe::egui::{
    self, Align2, Color32, FontId, Key, PointerButton, Pos2, Rect, Sense, Stroke, Ui, vec2,
};
use log::warn;

use cumulus::engine::{NodeKind, Presentation, ShapeMode};
use cumulus::tree::store::save_tree;
use cumulus::util::short_label;

use super::ViewModel;
use super::measure::{MeasuredSizes, content_text, layout_content};
use super::render_utils::{
    blend_color, circle_visible, draw_background, puff_color, screen_to_world, world_to_screen,
};

const HIT_PADDING_PX: f32 = 4.0;
const LABEL_MAX_CHARS: usize = 22;

impl ViewModel {
    fn handle_canvas_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 4.0);
        self.pan = pointer - rect.center() - (world_before.to_vec2() * self.zoom);
    }

    fn handle_canvas_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    fn node_under(&self, rect: Rect, screen: Pos2) -> Option<String> {
        let world = screen_to_world(rect, self.pan, self.zoom, screen);
        self.engine
            .find_node_at(world, HIT_PADDING_PX / self.zoom)
            .map(str::to_owned)
    }

    fn handle_canvas_pointer(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
            && let Some(id) = self.node_under(rect, origin)
        {
            let world = screen_to_world(rect, self.pan, self.zoom, origin);
            self.engine.start_drag(&id, world);
        }

        if response.dragged_by(PointerButton::Primary)
            && self.engine.dragged_id().is_some()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.engine
                .update_drag(screen_to_world(rect, self.pan, self.zoom, pointer));
        }

        if response.drag_stopped() && let Some(id) = self.engine.dragged_id().map(str::to_owned) {
            self.engine.end_drag();
            self.persist_group_position(&id);
        }

        if response.clicked_by(PointerButton::Primary) {
            match response
                .interact_pointer_pos()
                .and_then(|pointer| self.node_under(rect, pointer))
            {
                Some(id) => self.focus(&id),
                None => self.engine.exit_focus(),
            }
        }

        if ui.input(|input| input.key_pressed(Key::Escape)) {
            self.engine.exit_focus();
        }
    }

    fn persist_group_position(&mut self, id: &str) {
        let Some(node) = self.engine.node(id).filter(|node| node.kind == NodeKind::Group) else {
            return;
        };
        let position = [node.position.x, node.position.y];
        if !self.tree.set_group_position(id, position) {
            return;
        }
        let Some(path) = &self.tree_path else {
            return;
        };
        self.status = match save_tree(path, &self.tree) {
            Ok(()) => None,
            Err(error) => {
                warn!("could not persist group position: {error:#}");
                Some(format!("Saving failed: {error:#}"))
            }
        };
    }

    pub(in crate::app) fn focus(&mut self, id: &str) {
        if self.engine.focused_id() == Some(id) {
            return;
        }
        if !self.engine.enter_focus(id) {
            self.status = Some(format!("`{id}` is no longer in the tree"));
        }
    }

    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.tree_dirty {
            self.engine.sync_tree(&self.tree, rect.size());
            self.tree_dirty = false;
        }
        if !self.view_centered {
            self.pan = -rect.size() * 0.5 * self.zoom;
            self.view_centered = true;
        }
        self.engine.set_viewport(rect.size());

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_canvas_zoom(ui, rect, &response);
        self.handle_canvas_pan(&response);
        self.handle_canvas_pointer(ui, rect, &response);

        let frame_delta_seconds = if self.live_physics {
            ui.ctx()
                .input(|input| input.stable_dt)
                .clamp(1.0 / 240.0, 1.0 / 20.0)
        } else {
            0.0
        };
        let sizes = MeasuredSizes::measure(&painter, &self.engine, &self.tree);
        let max_velocity = self.engine.tick(frame_delta_seconds, &sizes);
        if self.live_physics
            && (max_velocity > 0.01 || !self.engine.is_settled() || response.dragged())
        {
            ui.ctx().request_repaint();
        }

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| self.node_under(rect, pointer));
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.engine.dragged_id().is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::PointingHand
                };
            });
        }

        let pan = self.pan;
        let zoom = self.zoom;
        let focus_active = self.engine.focused_id().is_some();
        let outline = Color32::from_rgba_unmultiplied(10, 12, 18, 150);

        for frame in self.engine.frame() {
            let center = world_to_screen(rect, pan, zoom, frame.position);
            let extent = frame.coverage_radius.max(frame.radius) * zoom * 1.4;
            if !circle_visible(rect, center, extent) {
                continue;
            }

            let is_hovered = hovered.as_deref() == Some(frame.id);
            let base = puff_color(frame.kind, frame.presentation, focus_active);
            let fill = if is_hovered {
                blend_color(base, Color32::from_rgb(255, 184, 120), 0.45)
            } else {
                base
            };

            // outline pass first so overlapping puffs merge into one silhouette
            for puff in frame.puffs {
                painter.circle_filled(center + puff.offset * zoom, puff.radius * zoom + 1.5, outline);
            }
            for puff in frame.puffs {
                painter.circle_filled(center + puff.offset * zoom, puff.radius * zoom, fill);
            }

            let mode = match frame.presentation {
                Presentation::Standalone => Some(ShapeMode::Standalone),
                Presentation::Member => Some(ShapeMode::Member),
                Presentation::Resting => None,
            };
            let content = mode.and_then(|mode| {
                content_text(&self.tree, frame.id, mode).map(|text| (mode, text))
            });
            match content {
                Some((mode, text)) => {
                    let galley = layout_content(&painter, text, mode, zoom);
                    let origin = center - galley.size() * 0.5;
                    painter.galley(origin, galley, Color32::from_gray(24));
                }
                None if is_hovered || zoom > 0.7 || frame.kind == NodeKind::Group => {
                    painter.text(
                        center,
                        Align2::CENTER_CENTER,
                        short_label(frame.title, LABEL_MAX_CHARS),
                        FontId::proportional((12.0 * zoom.sqrt()).clamp(9.0, 18.0)),
                        Color32::from_gray(30),
                    );
                }
                None => {}
            }

            if self.engine.dragged_id() == Some(frame.id) {
                painter.circle_stroke(
                    center,
                    frame.radius * zoom + 6.0,
                    Stroke::new(1.5, Color32::from_rgba_unmultiplied(255, 206, 120, 160)),
                );
            }
        }

        if let Some(id) = &hovered
            && let Some(title) = self.tree.title_of(id)
        {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                title,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
