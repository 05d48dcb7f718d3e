use eframe::egui::{self, Key, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use cumulus::engine::config::{INTENSITY_RANGE, PhysicsConfig};
use cumulus::tree::EntityTree;
use cumulus::util::short_label;

use super::super::ViewModel;

const MAX_SEARCH_RESULTS: usize = 8;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Entity ids whose title matches `query`, best first.
fn search_entities(tree: &EntityTree, query: &str, limit: usize) -> Vec<(String, String)> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let entities = tree.groups.iter().flat_map(|group| {
        std::iter::once((&group.id, &group.title)).chain(group.items.iter().flat_map(|item| {
            std::iter::once((&item.id, &item.title)).chain(
                item.sub_items
                    .iter()
                    .map(|sub_item| (&sub_item.id, &sub_item.title)),
            )
        }))
    });

    let mut scored = entities
        .filter_map(|(id, title)| {
            fuzzy_match_score(&matcher, title, query).map(|score| (score, id, title))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, id, title)| (id.clone(), title.clone()))
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Canvas Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search")
            .on_hover_text("Fuzzy-match titles; Enter focuses the best match.");
        let search_response = ui.text_edit_singleline(&mut self.search);
        let submitted =
            search_response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));

        let results = search_entities(&self.tree, &self.search, MAX_SEARCH_RESULTS);
        let mut focus_target = submitted
            .then(|| results.first().map(|(id, _)| id.clone()))
            .flatten();
        for (id, title) in &results {
            if ui.link(short_label(title, 36)).on_hover_text(id.as_str()).clicked() {
                focus_target = Some(id.clone());
            }
        }
        if !self.search.trim().is_empty() && results.is_empty() {
            ui.label("No matches.");
        }

        ui.separator();
        ui.label(egui::RichText::new("Focus").strong());
        match self.engine.focused_id().map(str::to_owned) {
            Some(focused_id) => {
                let title = self.tree.title_of(&focused_id).unwrap_or(&focused_id);
                ui.label(short_label(title, 36));
                let parent_id = self
                    .engine
                    .node(&focused_id)
                    .and_then(|node| node.parent_id.clone());
                ui.horizontal(|ui| {
                    if let Some(parent_id) = parent_id
                        && ui.button("Up one level").clicked()
                    {
                        focus_target = Some(parent_id);
                    }
                    if ui.button("Exit focus").clicked() {
                        self.engine.exit_focus();
                    }
                });
            }
            None => {
                ui.label("Click a node to focus it. Esc or a click on empty space leaves focus.");
            }
        }

        if let Some(id) = focus_target {
            self.focus(&id);
        }

        ui.separator();
        ui.label(egui::RichText::new("Physics").strong());
        ui.checkbox(&mut self.live_physics, "Live simulation")
            .on_hover_text("Pause freezes physics and shape morphing.");

        let physics = &mut self.engine.config_mut().physics;
        ui.add(egui::Slider::new(&mut physics.intensity, INTENSITY_RANGE).text("Intensity"))
            .on_hover_text("Global time scale of the simulation.");
        ui.add(
            egui::Slider::new(&mut physics.repulsion_strength, 0.0..=3.0).text("Repulsion"),
        )
        .on_hover_text("How hard overlapping nodes push apart.");
        ui.add(
            egui::Slider::new(&mut physics.spring_strength, 0.0..=0.05)
                .text("Orbit spring"),
        )
        .on_hover_text("Pull of items toward their group's orbit.");
        ui.add(egui::Slider::new(&mut physics.push_strength, 0.0..=2.0).text("Drag push"))
            .on_hover_text("Push applied to neighbours of a dragged node.");
        ui.add(egui::Slider::new(&mut physics.damping, 0.5..=0.99).text("Damping"))
            .on_hover_text("Velocity kept per frame.");
        ui.add(egui::Slider::new(&mut physics.max_speed, 1.0..=40.0).text("Max speed"));

        if ui.button("Reset physics").clicked() {
            *physics = PhysicsConfig::default();
        }
    }
}
