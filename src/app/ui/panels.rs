use std::collections::VecDeque;
use std::path::PathBuf;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use cumulus::engine::{Engine, EngineConfig};
use cumulus::tree::EntityTree;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(
        tree: EntityTree,
        tree_path: Option<PathBuf>,
        config: EngineConfig,
    ) -> Self {
        Self {
            engine: Engine::new(config),
            tree,
            tree_path,
            tree_dirty: true,
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            view_centered: false,
            live_physics: true,
            status: None,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("cumulus");
                    ui.separator();
                    match &self.tree_path {
                        Some(path) => ui.label(format!("tree: {}", path.display())),
                        None => ui.label("tree: demo"),
                    };
                    ui.label(format!("entities: {}", self.tree.entity_count()));
                    let reload_button = ui
                        .add_enabled(self.tree_path.is_some(), egui::Button::new("Reload tree"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Re-center").clicked() {
                        self.view_centered = false;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.engine_status_text());
                        if let Some(status) = &self.status {
                            ui.colored_label(ui.visuals().warn_fg_color, status);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui));
    }
}
