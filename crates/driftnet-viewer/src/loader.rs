use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use driftnet_core::{parse_graph, parse_projection, EntityStore, ProjectionMap};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum LoadEvent {
    Loaded {
        store: EntityStore,
        projection: ProjectionMap,
    },
    Failed(String),
}

/// Reads both documents off the render thread and reports once.
pub fn spawn_loader(graph: PathBuf, projection: PathBuf, tx: Sender<LoadEvent>) {
    std::thread::spawn(move || {
        let event = match tokio::runtime::Runtime::new() {
            Ok(rt) => match rt.block_on(load(&graph, &projection)) {
                Ok((store, projection)) => LoadEvent::Loaded { store, projection },
                Err(e) => LoadEvent::Failed(format!("{e:#}")),
            },
            Err(e) => LoadEvent::Failed(format!("failed to start loader runtime: {e}")),
        };
        if let LoadEvent::Failed(msg) = &event {
            tracing::error!(error = %msg, "graph data load failed");
        }
        let _ = tx.send(event);
    });
}

/// Blocking variant for the headless report.
pub fn load_now(graph: &Path, projection: &Path) -> Result<(EntityStore, ProjectionMap)> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start loader runtime")?;
    rt.block_on(load(graph, projection))
}

async fn load(graph: &Path, projection: &Path) -> Result<(EntityStore, ProjectionMap)> {
    let (graph_text, projection_text) = tokio::join!(
        tokio::fs::read_to_string(graph),
        tokio::fs::read_to_string(projection)
    );

    let graph_text =
        graph_text.with_context(|| format!("failed to read graph data {}", graph.display()))?;
    let store = parse_graph(&graph_text)
        .with_context(|| format!("failed to parse graph data {}", graph.display()))?;

    let projection = match projection_text {
        Ok(text) => parse_projection(&text),
        Err(e) => {
            tracing::warn!(path = %projection.display(), error = %e, "projection data unavailable");
            ProjectionMap::default()
        }
    };
    Ok((store, projection))
}
