use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{Entity, EntityKind};
use crate::sampler::WorkingSubgraph;
use crate::store::{EntityIx, EntityStore, RelIx};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    flags: [bool; 6],
}

impl Default for FilterState {
    fn default() -> Self {
        Self { flags: [true; 6] }
    }
}

impl FilterState {
    /// Returns true when the flag actually changed.
    pub fn set(&mut self, kind: EntityKind, enabled: bool) -> bool {
        let slot = &mut self.flags[kind.slot()];
        let changed = *slot != enabled;
        *slot = enabled;
        changed
    }

    pub fn is_enabled(&self, kind: EntityKind) -> bool {
        self.flags[kind.slot()]
    }

    pub fn entity_visible(&self, entity: &Entity) -> bool {
        self.is_enabled(entity.kind)
    }
}

/// Visible portion of the working subgraph under a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    entities: BTreeSet<EntityIx>,
    relationships: BTreeSet<RelIx>,
}

impl VisibleSet {
    pub fn compute(store: &EntityStore, working: &WorkingSubgraph, filter: &FilterState) -> Self {
        let entities: BTreeSet<EntityIx> = working
            .entities()
            .filter(|ix| filter.entity_visible(store.entity(*ix)))
            .collect();
        let relationships = working
            .relationships()
            .filter(|rx| {
                let rel = store.relationship(*rx);
                entities.contains(&rel.source) && entities.contains(&rel.target)
            })
            .collect();
        Self {
            entities,
            relationships,
        }
    }

    pub fn entity(&self, ix: EntityIx) -> bool {
        self.entities.contains(&ix)
    }

    pub fn relationship(&self, rx: RelIx) -> bool {
        self.relationships.contains(&rx)
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityIx> + '_ {
        self.entities.iter().copied()
    }

    pub fn relationships(&self) -> impl Iterator<Item = RelIx> + '_ {
        self.relationships.iter().copied()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind::*;
    use crate::sampler::{sample, SamplerConfig};
    use crate::store::StoreBuilder;

    #[test]
    fn set_reports_changes() {
        let mut f = FilterState::default();
        assert!(!f.set(Vessel, true));
        assert!(f.set(Vessel, false));
        assert!(!f.is_enabled(Vessel));
        assert!(f.is_enabled(Person));
    }

    #[test]
    fn hidden_kind_hides_touching_relationships() {
        let store = StoreBuilder::new()
            .entity("org", Organization)
            .entity("boat", Vessel)
            .entity("who", Person)
            .link("org", "boat")
            .link("org", "who")
            .build();
        let working = sample(&store, &["org"], &SamplerConfig::default());
        let mut filter = FilterState::default();
        filter.set(Vessel, false);

        let vis = VisibleSet::compute(&store, &working, &filter);
        assert!(!vis.entity(store.get("boat").unwrap()));
        assert!(vis.entity(store.get("org").unwrap()));
        assert_eq!(vis.relationship_count(), 1);
        for rx in vis.relationships() {
            assert!(!store.relationship(rx).touches(store.get("boat").unwrap()));
        }

        // Recomputing is idempotent.
        assert_eq!(vis, VisibleSet::compute(&store, &working, &filter));
    }
}
