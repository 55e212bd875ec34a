use anyhow::Result;
use driftnet_core::Explorer;
use std::fmt::Write as _;

use crate::loader;
use crate::util::config::ViewerConfig;

const CANVAS: (f32, f32) = (960.0, 720.0);

/// Loads the data, settles the layout for `ticks` steps and prints a
/// per-seed risk summary without opening a window.
pub fn run(cfg: &ViewerConfig, ticks: usize) -> Result<()> {
    let (store, projection) = loader::load_now(&cfg.graph_path, &cfg.projection_path)?;
    let mut ex = Explorer::new(
        store,
        projection,
        cfg.seeds.clone(),
        cfg.engine(),
        CANVAS.0,
        CANVAS.1,
    );
    let dt = cfg.layout.tick_interval;
    for _ in 0..ticks {
        ex.advance(dt);
    }
    tracing::info!(
        ticks = ex.layout().ticks(),
        alpha = ex.layout().alpha(),
        "layout settled"
    );
    print!("{}", render_report(&ex));
    Ok(())
}

pub fn render_report(ex: &Explorer) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "working subgraph: {} entities, {} relationships",
        ex.working().entity_count(),
        ex.working().relationship_count()
    );
    let _ = writeln!(out, "projected points: {}", ex.projection().points().len());
    for seed in ex.seeds() {
        match ex.store().get(seed).and_then(|ix| ex.summary(ix)) {
            Some(s) => {
                let _ = writeln!(
                    out,
                    "{}: {} risk {:.1} ({}), {} connections",
                    s.id,
                    s.kind_label(),
                    s.risk.total,
                    s.category.label(),
                    s.connections
                );
            }
            None => {
                let _ = writeln!(out, "{seed}: not in dataset");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftnet_core::{EngineConfig, ProjectionMap, StoreBuilder};
    use driftnet_core::EntityKind::*;

    #[test]
    fn report_lists_every_seed() {
        let store = StoreBuilder::new()
            .entity("Saltwind", Vessel)
            .entity("Kraken Marine", Organization)
            .entity("Ana Ruiz", Person)
            .link("Kraken Marine", "Saltwind")
            .link("Ana Ruiz", "Kraken Marine")
            .build();
        let ex = Explorer::new(
            store,
            ProjectionMap::default(),
            vec!["Kraken Marine".into(), "ghost".into()],
            EngineConfig::default(),
            CANVAS.0,
            CANVAS.1,
        );

        let report = render_report(&ex);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "working subgraph: 3 entities, 2 relationships");
        assert_eq!(lines[1], "projected points: 0");
        assert!(lines[2].starts_with("Kraken Marine: Organization risk "));
        assert!(lines[2].ends_with("2 connections"));
        assert_eq!(lines[3], "ghost: not in dataset");
    }
}
