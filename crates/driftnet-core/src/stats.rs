use crate::model::EntityKind;
use crate::store::{EntityIx, EntityStore};

/// Neighbor counts per kind for one entity, over the full dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionProfile {
    counts: [usize; 6],
}

impl ConnectionProfile {
    pub fn of(store: &EntityStore, ix: EntityIx) -> Self {
        let mut profile = Self::default();
        for other in store.neighbors(ix) {
            profile.counts[store.entity(other).kind.slot()] += 1;
        }
        profile
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.counts[kind.slot()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, usize)> + '_ {
        EntityKind::ALL.into_iter().map(|k| (k, self.count(k)))
    }
}

/// Dataset-wide mean neighbors per entity, split by neighbor kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeanDistribution {
    per_kind: [f64; 6],
}

impl MeanDistribution {
    pub fn mean(&self, kind: EntityKind) -> f64 {
        self.per_kind[kind.slot()]
    }

    /// Average connections per entity.
    pub fn total(&self) -> f64 {
        self.per_kind.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, f64)> + '_ {
        EntityKind::ALL.into_iter().map(|k| (k, self.mean(k)))
    }
}

pub fn mean_distribution(store: &EntityStore) -> MeanDistribution {
    let mut dist = MeanDistribution::default();
    if store.is_empty() {
        return dist;
    }
    let mut endpoints = [0usize; 6];
    for (_, rel) in store.relationships() {
        endpoints[store.entity(rel.source).kind.slot()] += 1;
        endpoints[store.entity(rel.target).kind.slot()] += 1;
    }
    let n = store.len() as f64;
    for (slot, count) in endpoints.iter().enumerate() {
        dist.per_kind[slot] = *count as f64 / n;
    }
    dist
}
