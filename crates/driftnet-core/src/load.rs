use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::GraphDoc;
use crate::projection::ProjectionMap;
use crate::store::EntityStore;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed graph document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("graph document has no entity list")]
    MissingEntities,
}

pub fn parse_graph(text: &str) -> Result<EntityStore, LoadError> {
    let doc: GraphDoc = serde_json::from_str(text)?;
    if doc.nodes.is_none() {
        return Err(LoadError::MissingEntities);
    }
    if doc.links.is_none() && doc.edges.is_none() {
        tracing::warn!("graph document has neither `links` nor `edges`; loading entities only");
    }

    let store = EntityStore::link(doc);
    tracing::info!(
        entities = store.len(),
        relationships = store.relationship_count(),
        dropped = store.dropped_relationships(),
        directed = store.is_directed(),
        "graph document linked"
    );
    Ok(store)
}

pub fn load_graph(path: &Path) -> Result<EntityStore, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_graph(&text)
}

/// Never fails: anything unusable degrades to an empty map.
pub fn parse_projection(text: &str) -> ProjectionMap {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "projection document is not valid JSON; projection disabled");
            return ProjectionMap::default();
        }
    };
    let Value::Object(entries) = value else {
        tracing::warn!("projection document is not an object; projection disabled");
        return ProjectionMap::default();
    };

    let mut map = ProjectionMap::default();
    let mut skipped = 0usize;
    for (id, coords) in entries {
        match coordinate_pair(&coords) {
            Some((x, y)) => map.insert(id, x, y),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "malformed projection entries skipped");
    }
    tracing::info!(points = map.len(), "projection coordinates loaded");
    map
}

pub fn load_projection(path: &Path) -> ProjectionMap {
    match fs::read_to_string(path) {
        Ok(text) => parse_projection(&text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "projection data unavailable");
            ProjectionMap::default()
        }
    }
}

fn coordinate_pair(value: &Value) -> Option<(f32, f32)> {
    let arr = value.as_array()?;
    if arr.len() < 2 {
        return None;
    }
    let x = arr[0].as_f64()?;
    let y = arr[1].as_f64()?;
    (x.is_finite() && y.is_finite()).then_some((x as f32, y as f32))
}
