use eframe::egui::{Pos2, Vec2};

/// The single node currently held by the pointer.
#[derive(Clone, Debug)]
pub struct DragState {
    pub node_id: String,
    pub pointer: Pos2,
    pub previous_pointer: Pos2,
    /// Exponentially smoothed pointer velocity, in units per update.
    pub velocity: Vec2,
    smoothing: f32,
}

impl DragState {
    pub fn start(node_id: &str, pointer: Pos2, smoothing: f32) -> Self {
        Self {
            node_id: node_id.to_owned(),
            pointer,
            previous_pointer: pointer,
            velocity: Vec2::ZERO,
            smoothing: smoothing.clamp(0.0, 1.0),
        }
    }

    pub fn update(&mut self, pointer: Pos2) {
        if !pointer.x.is_finite() || !pointer.y.is_finite() {
            return;
        }
        let raw = pointer - self.pointer;
        self.velocity = self.velocity * (1.0 - self.smoothing) + raw * self.smoothing;
        self.previous_pointer = self.pointer;
        self.pointer = pointer;
    }
}
