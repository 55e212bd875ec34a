use std::collections::BTreeSet;

use crate::sampler::WorkingSubgraph;
use crate::store::{EntityIx, EntityStore, RelIx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selected(EntityIx),
}

/// Current selection and the neighborhood it lights up.
///
/// Invariants: `selected` is `None` exactly when both sets are empty, and the
/// node set always contains the selected entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    selected: Option<EntityIx>,
    nodes: BTreeSet<EntityIx>,
    relationships: BTreeSet<RelIx>,
}

impl HighlightState {
    /// Replaces any previous selection. Only relationships present in the
    /// working subgraph are considered.
    pub fn select(&mut self, store: &EntityStore, working: &WorkingSubgraph, ix: EntityIx) {
        self.clear();
        self.selected = Some(ix);
        self.nodes.insert(ix);
        for rx in working.relationships_of(store, ix) {
            let rel = store.relationship(rx);
            self.relationships.insert(rx);
            self.nodes.insert(rel.source);
            self.nodes.insert(rel.target);
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.nodes.clear();
        self.relationships.clear();
    }

    pub fn phase(&self) -> Phase {
        match self.selected {
            Some(ix) => Phase::Selected(ix),
            None => Phase::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<EntityIx> {
        self.selected
    }

    pub fn contains_entity(&self, ix: EntityIx) -> bool {
        self.nodes.contains(&ix)
    }

    pub fn contains_relationship(&self, rx: RelIx) -> bool {
        self.relationships.contains(&rx)
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityIx> + '_ {
        self.nodes.iter().copied()
    }

    pub fn relationships(&self) -> impl Iterator<Item = RelIx> + '_ {
        self.relationships.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind::*;
    use crate::sampler::{sample, SamplerConfig};
    use crate::store::StoreBuilder;

    #[test]
    fn select_lights_up_rendered_neighborhood_only() {
        let store = StoreBuilder::new()
            .entity("A", Organization)
            .entity("B", Vessel)
            .entity("C", Person)
            .entity("D", Location)
            .link("A", "B")
            .link("B", "C")
            .link("C", "D")
            .build();
        let working = sample(&store, &["A"], &SamplerConfig::default());
        let c = store.get("C").unwrap();

        let mut hl = HighlightState::default();
        hl.select(&store, &working, c);
        assert_eq!(hl.phase(), Phase::Selected(c));
        // C-D lives in the store but was never sampled.
        assert_eq!(hl.relationships().count(), 1);
        assert!(hl.contains_entity(store.get("B").unwrap()));
        assert!(!hl.contains_entity(store.get("D").unwrap()));
    }

    #[test]
    fn isolated_selection_contains_itself() {
        let store = StoreBuilder::new().entity("lonely", Vessel).build();
        let working = sample(&store, &["lonely"], &SamplerConfig::default());
        let ix = store.get("lonely").unwrap();
        let mut hl = HighlightState::default();
        hl.select(&store, &working, ix);
        assert_eq!(hl.entities().collect::<Vec<_>>(), vec![ix]);
        assert_eq!(hl.relationships().count(), 0);
    }

    #[test]
    fn reselect_replaces_and_clear_resets() {
        let store = StoreBuilder::new()
            .entity("A", Organization)
            .entity("B", Vessel)
            .entity("C", Person)
            .link("A", "B")
            .build();
        let working = sample(&store, &["A", "C"], &SamplerConfig::default());
        let mut hl = HighlightState::default();
        hl.select(&store, &working, store.get("A").unwrap());
        hl.select(&store, &working, store.get("C").unwrap());
        assert_eq!(hl.entities().count(), 1);
        assert_eq!(hl.relationships().count(), 0);

        hl.clear();
        assert_eq!(hl.phase(), Phase::Idle);
        assert_eq!(hl, HighlightState::default());
    }
}
