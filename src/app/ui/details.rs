use eframe::egui::{self, RichText, Ui};

use cumulus::tree::EntityRef;
use cumulus::util::short_label;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Focus Details");
        ui.add_space(6.0);

        let Some(focused_id) = self.engine.focused_id().map(str::to_owned) else {
            ui.label("Nothing focused.");
            return;
        };

        let Some(entity) = self.tree.find(&focused_id) else {
            ui.label("Focused node no longer exists in the tree.");
            return;
        };

        ui.label(RichText::new(entity.title()).strong());
        ui.small(focused_id.as_str());
        ui.add_space(6.0);

        let kind = match entity {
            EntityRef::Group(_) => "group",
            EntityRef::Item(_) => "item",
            EntityRef::SubItem(_) => "step",
        };
        ui.label(format!("Kind: {kind}"));
        ui.label(format!("Importance: {}", entity.importance()));
        if let Some(due_date) = entity.due_date() {
            ui.label(format!("Due: {due_date}"));
        }
        match entity {
            EntityRef::Item(item) => {
                ui.label(format!("Completed: {}", item.completed));
            }
            EntityRef::SubItem(sub_item) => {
                ui.label(format!("Completed: {}", sub_item.completed));
            }
            EntityRef::Group(_) => {}
        }

        if let Some(layout) = self.engine.focus_layout() {
            ui.label(format!("Orbit radius: {:.0}", layout.orbit_radius));
        }

        ui.separator();
        ui.label(RichText::new("On the ring").strong());
        let children = self
            .engine
            .focus_layout()
            .map(|layout| layout.children.clone())
            .unwrap_or_default();
        if children.is_empty() {
            ui.label("No children.");
            return;
        }

        let mut next_focus = None;
        egui::ScrollArea::vertical()
            .id_salt("focus_children_scroll")
            .max_height(360.0)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for child_id in &children {
                    let title = self.tree.title_of(child_id).unwrap_or(child_id);
                    if ui
                        .link(short_label(title, 40))
                        .on_hover_text(child_id.as_str())
                        .clicked()
                    {
                        next_focus = Some(child_id.clone());
                    }
                }
            });

        if let Some(id) = next_focus {
            self.focus(&id);
        }
    }
}
