use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::store::{EntityIx, EntityStore, RelIx};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// A second expansion pass runs while the first pass holds fewer entities than this.
    pub second_hop_threshold: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            second_hop_threshold: 50,
        }
    }
}

/// The renderable slice of the store. Relationships can only enter together
/// with both of their endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSubgraph {
    entities: BTreeSet<EntityIx>,
    relationships: BTreeSet<RelIx>,
}

impl WorkingSubgraph {
    pub fn insert_entity(&mut self, ix: EntityIx) -> bool {
        self.entities.insert(ix)
    }

    pub fn insert_relationship(&mut self, store: &EntityStore, rx: RelIx) -> bool {
        let rel = store.relationship(rx);
        self.entities.insert(rel.source);
        self.entities.insert(rel.target);
        self.relationships.insert(rx)
    }

    pub fn contains_entity(&self, ix: EntityIx) -> bool {
        self.entities.contains(&ix)
    }

    pub fn contains_relationship(&self, rx: RelIx) -> bool {
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

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity_ids<'a>(&self, store: &'a EntityStore) -> BTreeSet<&'a str> {
        self.entities
            .iter()
            .map(|ix| store.entity(*ix).id.as_str())
            .collect()
    }

    /// Relationships of `ix` that are part of this subgraph.
    pub fn relationships_of<'a>(
        &'a self,
        store: &'a EntityStore,
        ix: EntityIx,
    ) -> impl Iterator<Item = RelIx> + 'a {
        store
            .relationships_of(ix)
            .iter()
            .copied()
            .filter(move |rx| self.relationships.contains(rx))
    }
}

pub fn sample<S: AsRef<str>>(store: &EntityStore, seeds: &[S], cfg: &SamplerConfig) -> WorkingSubgraph {
    let mut working = WorkingSubgraph::default();

    let resolved: Vec<EntityIx> = seeds
        .iter()
        .filter_map(|id| store.get(id.as_ref()))
        .collect();
    for ix in &resolved {
        working.insert_entity(*ix);
    }

    expand(store, &resolved, &mut working);
    let first_pass = working.entity_count();

    if first_pass < cfg.second_hop_threshold {
        let frontier: Vec<EntityIx> = working.entities().collect();
        expand(store, &frontier, &mut working);
    }

    tracing::debug!(
        seeds = seeds.len(),
        resolved = resolved.len(),
        first_pass,
        entities = working.entity_count(),
        relationships = working.relationship_count(),
        "neighborhood sampled"
    );
    working
}

fn expand(store: &EntityStore, from: &[EntityIx], working: &mut WorkingSubgraph) {
    for ix in from {
        for rx in store.relationships_of(*ix) {
            working.insert_relationship(store, *rx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind::*;
    use crate::store::StoreBuilder;

    fn chain() -> EntityStore {
        StoreBuilder::new()
            .entity("A", Organization)
            .entity("B", Vessel)
            .entity("C", Person)
            .entity("D", Location)
            .link("A", "B")
            .link("B", "C")
            .link("C", "D")
            .build()
    }

    #[test]
    fn two_hop_fallback_below_threshold() {
        let store = chain();
        let working = sample(&store, &["A"], &SamplerConfig::default());
        assert_eq!(
            working.entity_ids(&store),
            BTreeSet::from(["A", "B", "C"])
        );
        assert_eq!(working.relationship_count(), 2);
    }

    #[test]
    fn first_pass_only_when_threshold_reached() {
        let store = chain();
        let cfg = SamplerConfig {
            second_hop_threshold: 2,
        };
        let working = sample(&store, &["A"], &cfg);
        assert_eq!(working.entity_ids(&store), BTreeSet::from(["A", "B"]));
        assert_eq!(working.relationship_count(), 1);
    }

    #[test]
    fn unknown_seeds_are_skipped() {
        let store = chain();
        let working = sample(&store, &["nope", "D"], &SamplerConfig::default());
        assert_eq!(working.entity_ids(&store), BTreeSet::from(["B", "C", "D"]));

        let empty = sample(&store, &["nope"], &SamplerConfig::default());
        assert!(empty.is_empty());
    }

    #[test]
    fn isolated_seed_is_still_included() {
        let store = StoreBuilder::new().entity("lonely", Vessel).build();
        let working = sample(&store, &["lonely"], &SamplerConfig::default());
        assert_eq!(working.entity_count(), 1);
        assert_eq!(working.relationship_count(), 0);
    }

    #[test]
    fn no_dangling_relationships() {
        let store = StoreBuilder::new()
            .entity("A", Vessel)
            .entity("B", Vessel)
            .entity("C", Vessel)
            .entity("D", Vessel)
            .link("A", "B")
            .link("B", "C")
            .link("C", "A")
            .link("D", "C")
            .link("A", "A")
            .build();
        let working = sample(&store, &["A"], &SamplerConfig::default());
        for rx in working.relationships() {
            let rel = store.relationship(rx);
            assert!(working.contains_entity(rel.source));
            assert!(working.contains_entity(rel.target));
        }
        assert_eq!(working.relationship_count(), 5);
    }

    #[test]
    fn seed_order_does_not_matter() {
        let store = chain();
        let cfg = SamplerConfig::default();
        assert_eq!(sample(&store, &["A", "D"], &cfg), sample(&store, &["D", "A"], &cfg));
    }
}
