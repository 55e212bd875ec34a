use serde_json::Map;
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::model::{Endpoint, Entity, EntityId, EntityKind, GraphDoc, RawRelationship};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityIx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelIx(pub usize);

/// A relationship with both endpoints resolved to store slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relationship {
    pub source: EntityIx,
    pub target: EntityIx,
    pub weight: f64,
}

impl Relationship {
    pub fn touches(&self, ix: EntityIx) -> bool {
        self.source == ix || self.target == ix
    }

    /// Endpoint opposite to `ix`; a self-loop returns `ix` itself.
    pub fn other(&self, ix: EntityIx) -> Option<EntityIx> {
        if self.source == ix {
            Some(self.target)
        } else if self.target == ix {
            Some(self.source)
        } else {
            None
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn stroke_width(&self) -> f32 {
        self.weight.sqrt() as f32
    }
}

/// Immutable, fully linked entity graph. Built once per load; every
/// relationship endpoint is resolved here so later passes never look up
/// identifiers again.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
    index: HashMap<EntityId, EntityIx>,
    relationships: Vec<Relationship>,
    adjacency: Vec<SmallVec<[RelIx; 4]>>,
    dropped: usize,
    directed: bool,
}

impl EntityStore {
    pub fn link(doc: GraphDoc) -> Self {
        let GraphDoc {
            nodes,
            links,
            edges,
            directed,
        } = doc;

        let mut builder = StoreBuilder::default();
        for raw in nodes.unwrap_or_default() {
            let kind = raw
                .kind
                .as_deref()
                .map(EntityKind::parse)
                .unwrap_or_default();
            builder.push_entity(Entity {
                id: raw.id.into_id(),
                kind,
                country: raw.country,
                attributes: raw.extra,
            });
        }

        for RawRelationship {
            source,
            target,
            weight,
        } in links.or(edges).unwrap_or_default()
        {
            builder.push_relationship(source, target, weight);
        }

        let mut store = builder.build();
        store.directed = directed;
        store
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn dropped_relationships(&self) -> usize {
        self.dropped
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn get(&self, id: &str) -> Option<EntityIx> {
        self.index.get(id).copied()
    }

    pub fn entity(&self, ix: EntityIx) -> &Entity {
        &self.entities[ix.0]
    }

    pub fn try_entity(&self, ix: EntityIx) -> Option<&Entity> {
        self.entities.get(ix.0)
    }

    pub fn relationship(&self, rx: RelIx) -> &Relationship {
        &self.relationships[rx.0]
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityIx, &Entity)> + '_ {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityIx(i), e))
    }

    pub fn relationships(&self) -> impl Iterator<Item = (RelIx, &Relationship)> + '_ {
        self.relationships
            .iter()
            .enumerate()
            .map(|(i, r)| (RelIx(i), r))
    }

    pub fn relationships_of(&self, ix: EntityIx) -> &[RelIx] {
        self.adjacency
            .get(ix.0)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn degree(&self, ix: EntityIx) -> usize {
        self.relationships_of(ix).len()
    }

    pub fn neighbors(&self, ix: EntityIx) -> impl Iterator<Item = EntityIx> + '_ {
        self.relationships_of(ix)
            .iter()
            .filter_map(move |rx| self.relationship(*rx).other(ix))
    }
}

/// Assembles an [`EntityStore`] with the same linking rules the document
/// loader uses.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    entities: Vec<Entity>,
    index: HashMap<EntityId, EntityIx>,
    /// Slot of every pushed entity in push order, duplicates included, so
    /// positional endpoints follow the document's own numbering.
    positions: Vec<EntityIx>,
    pending: Vec<(Endpoint, Endpoint, Option<f64>)>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, id: &str, kind: EntityKind) -> Self {
        self.push_entity(Entity {
            id: EntityId::from(id),
            kind,
            country: None,
            attributes: Map::new(),
        });
        self
    }

    pub fn entity_in(mut self, id: &str, kind: EntityKind, country: &str) -> Self {
        self.push_entity(Entity {
            id: EntityId::from(id),
            kind,
            country: Some(country.to_string()),
            attributes: Map::new(),
        });
        self
    }

    pub fn link(mut self, source: &str, target: &str) -> Self {
        self.push_relationship(source.into(), target.into(), None);
        self
    }

    pub fn weighted(mut self, source: &str, target: &str, weight: f64) -> Self {
        self.push_relationship(source.into(), target.into(), Some(weight));
        self
    }

    /// Returns false when the identifier was already taken; the first entity wins.
    pub fn push_entity(&mut self, entity: Entity) -> bool {
        if let Some(first) = self.index.get(&entity.id).copied() {
            tracing::debug!(id = %entity.id, "duplicate entity id ignored");
            self.positions.push(first);
            return false;
        }
        let ix = EntityIx(self.entities.len());
        self.index.insert(entity.id.clone(), ix);
        self.positions.push(ix);
        self.entities.push(entity);
        true
    }

    pub fn push_relationship(&mut self, source: Endpoint, target: Endpoint, weight: Option<f64>) {
        self.pending.push((source, target, weight));
    }

    pub fn build(self) -> EntityStore {
        let StoreBuilder {
            entities,
            index,
            positions,
            pending,
        } = self;

        let mut relationships = Vec::with_capacity(pending.len());
        let mut adjacency: Vec<SmallVec<[RelIx; 4]>> = vec![SmallVec::new(); entities.len()];
        let mut dropped = 0usize;

        for (source, target, weight) in pending {
            let (Some(s), Some(t)) = (
                resolve(&index, &positions, &source),
                resolve(&index, &positions, &target),
            ) else {
                dropped += 1;
                continue;
            };
            let rx = RelIx(relationships.len());
            relationships.push(Relationship {
                source: s,
                target: t,
                weight: normalize_weight(weight),
            });
            adjacency[s.0].push(rx);
            if t != s {
                adjacency[t.0].push(rx);
            }
        }

        if dropped > 0 {
            tracing::warn!(dropped, "relationships with unresolved endpoints dropped");
        }

        EntityStore {
            entities,
            index,
            relationships,
            adjacency,
            dropped,
            directed: false,
        }
    }
}

fn resolve(
    index: &HashMap<EntityId, EntityIx>,
    positions: &[EntityIx],
    endpoint: &Endpoint,
) -> Option<EntityIx> {
    match endpoint {
        Endpoint::Id(id) => index.get(id.as_str()).copied(),
        Endpoint::Index(n) => index.get(n.to_string().as_str()).copied().or_else(|| {
            let i = usize::try_from(*n).ok()?;
            positions.get(i).copied()
        }),
        Endpoint::Other(_) => None,
    }
}

// Missing, zero, negative and non-finite weights all fall back to 1.
fn normalize_weight(weight: Option<f64>) -> f64 {
    match weight {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind::*;

    #[test]
    fn links_resolve_to_slots_and_build_adjacency() {
        let store = StoreBuilder::new()
            .entity("A", Vessel)
            .entity("B", Organization)
            .entity("C", Person)
            .link("A", "B")
            .link("B", "C")
            .build();

        let a = store.get("A").unwrap();
        let b = store.get("B").unwrap();
        assert_eq!(store.relationship_count(), 2);
        assert_eq!(store.degree(b), 2);
        assert_eq!(store.neighbors(a).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn unresolved_endpoints_are_dropped_and_counted() {
        let store = StoreBuilder::new()
            .entity("A", Vessel)
            .link("A", "ghost")
            .link("nobody", "A")
            .build();
        assert_eq!(store.relationship_count(), 0);
        assert_eq!(store.dropped_relationships(), 2);
        assert_eq!(store.degree(store.get("A").unwrap()), 0);
    }

    #[test]
    fn numeric_endpoint_prefers_identifier_then_index() {
        let mut b = StoreBuilder::new().entity("x", Person).entity("0", Vessel);
        b.push_relationship(Endpoint::Index(0), Endpoint::Index(1), None);
        let store = b.build();
        let rel = store.relationship(RelIx(0));
        // "0" names the second entity; index 1 falls back to position.
        assert_eq!(rel.source, store.get("0").unwrap());
        assert_eq!(rel.target, EntityIx(1));
    }

    #[test]
    fn duplicate_ids_keep_first_entity() {
        let store = StoreBuilder::new()
            .entity("A", Vessel)
            .entity("A", Person)
            .build();
        assert_eq!(store.len(), 1);
        assert_eq!(store.entity(store.get("A").unwrap()).kind, Vessel);
    }

    #[test]
    fn positional_endpoints_count_dropped_duplicates() {
        let mut b = StoreBuilder::new()
            .entity("A", Vessel)
            .entity("A", Person)
            .entity("B", Organization)
            .entity("C", Location);
        // Document positions: 0 = A, 1 = A (duplicate), 2 = B, 3 = C.
        b.push_relationship(Endpoint::Index(2), Endpoint::Index(3), None);
        b.push_relationship(Endpoint::Index(1), Endpoint::Index(2), None);
        b.push_relationship(Endpoint::Index(4), Endpoint::Index(0), None);
        let store = b.build();

        assert_eq!(store.relationship_count(), 2);
        assert_eq!(store.dropped_relationships(), 1);
        let (a, bb, c) = (
            store.get("A").unwrap(),
            store.get("B").unwrap(),
            store.get("C").unwrap(),
        );
        let first = store.relationship(RelIx(0));
        assert_eq!((first.source, first.target), (bb, c));
        let second = store.relationship(RelIx(1));
        assert_eq!((second.source, second.target), (a, bb));
    }

    #[test]
    fn weights_default_to_one() {
        let store = StoreBuilder::new()
            .entity("A", Vessel)
            .entity("B", Vessel)
            .link("A", "B")
            .weighted("A", "B", 0.0)
            .weighted("A", "B", f64::NAN)
            .weighted("A", "B", 4.0)
            .build();
        let weights: Vec<f64> = store.relationships().map(|(_, r)| r.weight).collect();
        assert_eq!(weights, vec![1.0, 1.0, 1.0, 4.0]);
        assert_eq!(store.relationship(RelIx(3)).stroke_width(), 2.0);
    }

    #[test]
    fn self_loop_is_listed_once() {
        let store = StoreBuilder::new().entity("A", Vessel).link("A", "A").build();
        let a = store.get("A").unwrap();
        assert_eq!(store.degree(a), 1);
        assert_eq!(store.relationship(RelIx(0)).other(a), Some(a));
    }
}
