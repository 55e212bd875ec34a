use crate::model::EntityKind;
use crate::risk::{assess, RiskBreakdown, RiskCategory, RiskConfig};
use crate::sampler::WorkingSubgraph;
use crate::stats::ConnectionProfile;
use crate::store::{EntityIx, EntityStore};

const UNKNOWN_COUNTRY: &str = "Unknown";

/// Everything the info panel shows for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
    pub entity: EntityIx,
    pub id: String,
    pub kind: EntityKind,
    pub country: Option<String>,
    /// Relationships in the full dataset.
    pub connections: usize,
    /// Relationships in the working subgraph.
    pub rendered_connections: usize,
    pub risk: RiskBreakdown,
    pub category: RiskCategory,
    pub profile: ConnectionProfile,
}

impl EntitySummary {
    pub fn build(
        store: &EntityStore,
        working: &WorkingSubgraph,
        ix: EntityIx,
        cfg: &RiskConfig,
    ) -> Self {
        let entity = store.entity(ix);
        let risk = assess(store, ix, cfg);
        Self {
            entity: ix,
            id: entity.id.to_string(),
            kind: entity.kind,
            country: entity.country.clone(),
            connections: store.degree(ix),
            rendered_connections: working.relationships_of(store, ix).count(),
            category: risk.category(),
            risk,
            profile: ConnectionProfile::of(store, ix),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn country_label(&self) -> &str {
        self.country.as_deref().unwrap_or(UNKNOWN_COUNTRY)
    }

    pub fn advisory(&self) -> &'static str {
        self.category.advisory()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverSummary {
    pub id: String,
    pub kind: EntityKind,
    pub country: Option<String>,
    pub connections: usize,
}

impl HoverSummary {
    pub fn of(store: &EntityStore, ix: EntityIx) -> Self {
        let entity = store.entity(ix);
        Self {
            id: entity.id.to_string(),
            kind: entity.kind,
            country: entity.country.clone(),
            connections: store.degree(ix),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("ID: {}", self.id),
            format!("Type: {}", self.kind.label()),
            format!(
                "Country: {}",
                self.country.as_deref().unwrap_or(UNKNOWN_COUNTRY)
            ),
            format!("Connections: {}", self.connections),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind::*;
    use crate::risk::RiskCategory;
    use crate::sampler::{sample, SamplerConfig};
    use crate::store::StoreBuilder;

    #[test]
    fn summary_separates_full_and_rendered_connections() {
        let store = StoreBuilder::new()
            .entity_in("V", Vessel, "Oceanus")
            .entity("O", Organization)
            .entity("P", Person)
            .entity("Q", Person)
            .link("V", "O")
            .link("O", "P")
            .link("P", "Q")
            .link("Q", "O")
            .build();
        let cfg = SamplerConfig {
            second_hop_threshold: 0,
        };
        let working = sample(&store, &["V"], &cfg);
        let o = store.get("O").unwrap();

        let s = EntitySummary::build(&store, &working, o, &RiskConfig::default());
        assert_eq!(s.connections, 3);
        assert_eq!(s.rendered_connections, 1);
        assert_eq!(s.kind_label(), "Organization");
        assert_eq!(s.country_label(), "Unknown");
        assert_eq!(s.profile.count(Person), 2);
        assert_eq!(s.category, RiskCategory::Low);
        assert_eq!(s.advisory(), "Low risk. No obvious suspicious activity.");
    }

    #[test]
    fn hover_lines() {
        let store = StoreBuilder::new()
            .entity_in("V", Vessel, "Oceanus")
            .build();
        let hover = HoverSummary::of(&store, store.get("V").unwrap());
        assert_eq!(
            hover.lines(),
            vec!["ID: V", "Type: Vessel", "Country: Oceanus", "Connections: 0"]
        );
    }
}
