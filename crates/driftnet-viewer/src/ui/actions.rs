use driftnet_core::{EntityIx, EntityKind, SearchOutcome, ViewEvent};

use crate::app::resources::{ViewTarget, ViewerState};
use crate::util::config;

/// Everything the panels can ask of the explorer. Widgets only build these;
/// [`apply`] is the one place that mutates state in response.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Search(String),
    SetFilter(EntityKind, bool),
    Focus(String),
    Select(EntityIx),
    ClickProjection(driftnet_core::Vec2),
    Clear,
    AddSeed(String),
    RemoveSeed(String),
    ShowEdges(bool),
    ShowProjection(bool),
    SaveSettings,
}

pub fn apply(st: &mut ViewerState, action: UiAction) {
    match action {
        UiAction::ShowEdges(on) => {
            st.ui.show_edges = on;
            st.cfg.show_edges = on;
        }
        UiAction::ShowProjection(on) => {
            st.ui.show_projection = on;
            st.cfg.show_projection = on;
        }
        UiAction::SaveSettings => match config::save(&st.cfg) {
            Ok(()) => st.ui.notice = Some("Settings saved".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to save viewer config");
                st.ui.notice = Some(format!("Could not save settings: {e}"));
            }
        },
        UiAction::AddSeed(id) => {
            if id.trim().is_empty() || st.cfg.seeds.iter().any(|s| *s == id) {
                return;
            }
            st.cfg.seeds.push(id);
            resample(st);
        }
        UiAction::RemoveSeed(id) => {
            let before = st.cfg.seeds.len();
            st.cfg.seeds.retain(|s| *s != id);
            if st.cfg.seeds.len() != before {
                resample(st);
            }
        }
        other => {
            let Some(ex) = st.explorer.as_mut() else {
                return;
            };
            match other {
                UiAction::Search(term) => {
                    if let SearchOutcome::Found(_) = ex.search(&term) {
                        st.ui.notice = None;
                    }
                }
                UiAction::SetFilter(kind, enabled) => {
                    ex.set_filter(kind, enabled);
                }
                UiAction::Focus(id) => {
                    if !ex.focus(&id) {
                        st.ui.notice = Some(format!("{id} is not in the dataset"));
                    }
                }
                UiAction::Select(ix) => ex.select_entity(ix),
                UiAction::ClickProjection(p) => {
                    ex.click_projection(p);
                }
                UiAction::Clear => ex.clear(),
                _ => {}
            }
        }
    }
}

fn resample(st: &mut ViewerState) {
    if let Some(ex) = st.explorer.as_mut() {
        ex.resample(st.cfg.seeds.clone());
        tracing::info!(
            seeds = st.cfg.seeds.len(),
            entities = ex.working().entity_count(),
            "resampled working subgraph"
        );
    }
}

/// Moves pending engine notifications into UI state.
pub fn drain_view_events(st: &mut ViewerState) {
    let Some(ex) = st.explorer.as_mut() else {
        return;
    };
    for event in ex.drain_events() {
        match event {
            ViewEvent::Restyle => {}
            ViewEvent::VisibilityChanged | ViewEvent::Resampled => {
                st.ui.rebuild_markers = true;
            }
            ViewEvent::Recenter { target, scale, .. } => {
                st.ui.view_target = Some(ViewTarget {
                    center: target,
                    zoom: scale,
                });
            }
            ViewEvent::NotFound { term } => {
                st.ui.notice = Some(format!("No rendered entity matches \"{term}\""));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::ViewerConfig;
    use driftnet_core::{parse_graph, parse_projection, Explorer};

    const DOC: &str = r#"{
        "nodes": [
            {"id": "Kraken Marine", "type": "organization"},
            {"id": "Saltwind", "type": "vessel"},
            {"id": "Ana Ruiz", "type": "person"},
            {"id": "Port Kel", "type": "location"}
        ],
        "links": [
            {"source": "Kraken Marine", "target": "Saltwind"},
            {"source": "Ana Ruiz", "target": "Kraken Marine"},
            {"source": "Port Kel", "target": "Ana Ruiz"}
        ]
    }"#;

    fn state(seeds: &[&str]) -> ViewerState {
        let mut cfg = ViewerConfig::default();
        cfg.seeds = seeds.iter().map(|s| s.to_string()).collect();
        let mut st = ViewerState::new(cfg);
        let store = parse_graph(DOC).expect("graph");
        st.explorer = Some(Explorer::new(
            store,
            parse_projection(r#"{"Saltwind": [0, 1]}"#),
            st.cfg.seeds.clone(),
            st.cfg.engine(),
            800.0,
            600.0,
        ));
        st
    }

    fn explorer(st: &ViewerState) -> &Explorer {
        st.explorer.as_ref().expect("loaded")
    }

    #[test]
    fn search_hit_selects_and_requests_recenter() {
        let mut st = state(&["Kraken Marine"]);
        st.ui.notice = Some("stale".into());
        apply(&mut st, UiAction::Search("  saltWIND ".into()));
        drain_view_events(&mut st);

        let saltwind = explorer(&st).store().get("Saltwind");
        assert_eq!(explorer(&st).highlight().selected(), saltwind);
        assert_eq!(st.ui.notice, None);
        let target = st.ui.view_target.expect("recenter requested");
        assert_eq!(target.zoom, 1.5);
    }

    #[test]
    fn search_miss_sets_notice_and_keeps_selection() {
        let mut st = state(&["Kraken Marine"]);
        apply(&mut st, UiAction::Search("Saltwind".into()));
        drain_view_events(&mut st);
        let before = explorer(&st).highlight().clone();

        apply(&mut st, UiAction::Search("nobody".into()));
        drain_view_events(&mut st);
        assert_eq!(explorer(&st).highlight(), &before);
        assert!(st.ui.notice.as_deref().is_some_and(|n| n.contains("nobody")));
    }

    #[test]
    fn filter_change_requests_marker_rebuild() {
        let mut st = state(&["Kraken Marine"]);
        st.ui.rebuild_markers = false;
        apply(&mut st, UiAction::SetFilter(EntityKind::Vessel, false));
        drain_view_events(&mut st);
        assert!(st.ui.rebuild_markers);
        assert!(!explorer(&st).filter().is_enabled(EntityKind::Vessel));
    }

    #[test]
    fn seeds_can_be_added_and_removed() {
        let mut st = state(&["Saltwind"]);
        let before = explorer(&st).generation();

        apply(&mut st, UiAction::AddSeed("Port Kel".into()));
        assert_eq!(st.cfg.seeds, vec!["Saltwind", "Port Kel"]);
        assert_eq!(explorer(&st).generation(), before + 1);

        apply(&mut st, UiAction::AddSeed("Port Kel".into()));
        assert_eq!(explorer(&st).generation(), before + 1);

        apply(&mut st, UiAction::RemoveSeed("Saltwind".into()));
        assert_eq!(explorer(&st).seeds(), ["Port Kel".to_string()]);
    }

    #[test]
    fn focus_on_unknown_id_reports_it() {
        let mut st = state(&["Saltwind"]);
        apply(&mut st, UiAction::Focus("ghost".into()));
        assert_eq!(st.ui.notice.as_deref(), Some("ghost is not in the dataset"));
        assert!(!explorer(&st).highlight().is_active());
    }

    #[test]
    fn actions_before_load_are_ignored() {
        let mut st = ViewerState::new(ViewerConfig::default());
        apply(&mut st, UiAction::Search("x".into()));
        apply(&mut st, UiAction::Clear);
        drain_view_events(&mut st);
        assert!(st.explorer.is_none());

        apply(&mut st, UiAction::ShowEdges(false));
        assert!(!st.ui.show_edges && !st.cfg.show_edges);
    }
}
