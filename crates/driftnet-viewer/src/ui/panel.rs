use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};
use driftnet_core::info::EntitySummary;
use driftnet_core::style::kind_color;
use driftnet_core::{EntityKind, Explorer};

use crate::app::resources::{LoadStatus, ViewerState};
use crate::ui::actions::{apply, UiAction};
use crate::ui::{egui_color, PANEL_W};

pub fn ui_panel(mut contexts: EguiContexts, mut st: ResMut<ViewerState>) {
    let mut actions = Vec::new();
    let st_ref = &mut *st;

    egui::SidePanel::left("left")
        .default_width(PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("driftnet");
            match &st_ref.status {
                LoadStatus::Loading => {
                    ui.label("Loading graph data...");
                    return;
                }
                LoadStatus::Failed(msg) => {
                    ui.colored_label(egui::Color32::LIGHT_RED, "Could not load graph data");
                    ui.label(msg);
                    return;
                }
                LoadStatus::Ready => {}
            }
            let Some(ex) = st_ref.explorer.as_ref() else {
                return;
            };

            ui.label(format!(
                "entities: {} of {}",
                ex.working().entity_count(),
                ex.store().len()
            ));
            ui.label(format!(
                "relationships: {} of {}",
                ex.working().relationship_count(),
                ex.store().relationship_count()
            ));
            ui.label(format!(
                "visible: {} / {}",
                ex.visible().entity_count(),
                ex.visible().relationship_count()
            ));
            ui.separator();

            ui.label("Search:");
            ui.horizontal(|ui| {
                let resp = ui.text_edit_singleline(&mut st_ref.ui.search_term);
                let submitted =
                    resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Find").clicked() || submitted {
                    actions.push(UiAction::Search(st_ref.ui.search_term.clone()));
                }
            });
            if let Some(notice) = &st_ref.ui.notice {
                ui.colored_label(egui::Color32::YELLOW, notice);
            }

            ui.add_space(8.0);
            ui.label("Types:");
            for kind in EntityKind::ALL {
                let mut on = ex.filter().is_enabled(kind);
                let text = egui::RichText::new(kind.label()).color(egui_color(kind_color(kind)));
                if ui.checkbox(&mut on, text).changed() {
                    actions.push(UiAction::SetFilter(kind, on));
                }
            }

            ui.add_space(8.0);
            ui.label("Seeds:");
            for seed in st_ref.cfg.seeds.iter() {
                ui.horizontal(|ui| {
                    let known = ex.store().get(seed).is_some();
                    if ui.add_enabled(known, egui::Button::new(seed)).clicked() {
                        actions.push(UiAction::Focus(seed.clone()));
                    }
                    if ui.small_button("x").on_hover_text("remove seed").clicked() {
                        actions.push(UiAction::RemoveSeed(seed.clone()));
                    }
                });
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Clear selection").clicked() {
                    actions.push(UiAction::Clear);
                }
                if let Some(ix) = ex.highlight().selected() {
                    if ui.button("Add as seed").clicked() {
                        actions.push(UiAction::AddSeed(ex.store().entity(ix).id.to_string()));
                    }
                }
            });

            ui.horizontal(|ui| {
                let mut edges = st_ref.ui.show_edges;
                if ui.checkbox(&mut edges, "Edges").changed() {
                    actions.push(UiAction::ShowEdges(edges));
                }
                let mut projection = st_ref.ui.show_projection;
                if ui.checkbox(&mut projection, "Projection").changed() {
                    actions.push(UiAction::ShowProjection(projection));
                }
            });
            if ui.button("Save settings").clicked() {
                actions.push(UiAction::SaveSettings);
            }

            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| match ex.selection_summary() {
                Some(summary) => info_panel(ui, ex, &summary),
                None => {
                    ui.label("Click a node to see its details.");
                }
            });
        });

    for action in actions {
        apply(&mut st, action);
    }
}

fn info_panel(ui: &mut egui::Ui, ex: &Explorer, s: &EntitySummary) {
    ui.heading(&s.id);
    if ex.is_seed(s.entity) {
        ui.small("Seed entity");
    }
    ui.label(format!("Type: {}", s.kind_label()));
    ui.label(format!("Country: {}", s.country_label()));
    ui.label(format!(
        "Connections: {} ({} shown)",
        s.connections, s.rendered_connections
    ));

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label("Risk score:");
        ui.colored_label(
            egui_color(s.category.color()),
            egui::RichText::new(format!("{:.1}/10", s.risk.total)).strong(),
        );
        ui.label(s.category.label());
    });
    ui.label(s.advisory());
    egui::CollapsingHeader::new("Score breakdown")
        .default_open(false)
        .show(ui, |ui| {
            egui::Grid::new("risk_terms").striped(true).show(ui, |ui| {
                for (name, value) in [
                    ("connectivity", s.risk.degree),
                    ("type", s.risk.kind),
                    ("vessel links", s.risk.vessel),
                    ("organization links", s.risk.organization),
                    ("suspicion bonus", s.risk.bonus),
                ] {
                    ui.label(name);
                    ui.label(format!("{value:.2}"));
                    ui.end_row();
                }
            });
        });

    ui.add_space(6.0);
    ui.label("Connection types:");
    let mean = ex.mean_distribution();
    egui::Grid::new("distribution").striped(true).show(ui, |ui| {
        ui.label("");
        ui.label("this entity");
        ui.label("dataset mean");
        ui.end_row();
        for (kind, count) in s.profile.iter() {
            ui.colored_label(egui_color(kind_color(kind)), kind.label());
            ui.label(count.to_string());
            ui.label(format!("{:.2}", mean.mean(kind)));
            ui.end_row();
        }
    });
    ui.label(format!(
        "Average connections per node: {:.2}",
        mean.total()
    ));
}
