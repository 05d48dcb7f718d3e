use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use cumulus::engine::{Engine, EngineConfig};
use cumulus::tree::EntityTree;
use cumulus::tree::store::{demo_tree, load_tree};

mod canvas;
mod measure;
mod render_utils;
mod ui;

pub struct CumulusApp {
    tree_path: Option<PathBuf>,
    config: EngineConfig,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<EntityTree, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: Engine,
    tree: EntityTree,
    tree_path: Option<PathBuf>,
    tree_dirty: bool,
    search: String,
    pan: Vec2,
    zoom: f32,
    view_centered: bool,
    live_physics: bool,
    status: Option<String>,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

impl CumulusApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        tree_path: Option<PathBuf>,
        config: EngineConfig,
    ) -> Self {
        let state = Self::start_load(tree_path.clone());
        Self {
            tree_path,
            config,
            state,
        }
    }

    fn spawn_load(tree_path: Option<PathBuf>) -> Receiver<Result<EntityTree, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = match tree_path {
                Some(path) => load_tree(&path).map_err(|error| format!("{error:#}")),
                None => Ok(demo_tree()),
            };
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(tree_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(tree_path),
        }
    }
}

impl eframe::App for CumulusApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(tree) => AppState::Ready(Box::new(ViewModel::new(
                            tree,
                            self.tree_path.clone(),
                            self.config.clone(),
                        ))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading entity tree...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the entity tree");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.tree_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                model.show(ctx, &mut reload_requested);
                if reload_requested {
                    transition = Some(Self::start_load(self.tree_path.clone()));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
