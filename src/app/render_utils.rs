use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use cumulus::engine::{NodeKind, Presentation};

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(22, 27, 36));

    let step = (64.0 * zoom.clamp(0.6, 1.8)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(70, 84, 104, 50));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// World space is the engine's; `pan` is measured from the canvas centre.
pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Pos2) -> Pos2 {
    rect.center() + pan + world.to_vec2() * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Pos2 {
    ((screen - rect.center() - pan) / zoom).to_pos2()
}

pub(super) fn kind_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Group => Color32::from_rgb(104, 160, 232),
        NodeKind::Item => Color32::from_rgb(226, 232, 242),
        NodeKind::SubItem => Color32::from_rgb(178, 214, 196),
    }
}

/// Fill for a node's puffs. Nodes outside the focus set fade back.
pub(super) fn puff_color(kind: NodeKind, presentation: Presentation, focus_active: bool) -> Color32 {
    let base = kind_color(kind);
    match presentation {
        Presentation::Standalone => blend_color(base, Color32::WHITE, 0.35),
        Presentation::Member => blend_color(base, Color32::WHITE, 0.15),
        Presentation::Resting if focus_active => blend_color(base, Color32::from_rgb(22, 27, 36), 0.6),
        Presentation::Resting => base,
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn screen_transform_round_trips() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        let pan = vec2(-120.0, 40.0);
        let world = Pos2::new(310.0, -72.0);
        let screen = world_to_screen(rect, pan, 1.7, world);
        let back = screen_to_world(rect, pan, 1.7, screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn background_nodes_dim_in_focus_mode() {
        let plain = puff_color(NodeKind::Item, Presentation::Resting, false);
        let dimmed = puff_color(NodeKind::Item, Presentation::Resting, true);
        assert!(dimmed.r() < plain.r());
    }
}
