use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::filter::{FilterState, VisibleSet};
use crate::highlight::HighlightState;
use crate::info::{EntitySummary, HoverSummary};
use crate::layout::{ForceLayout, LayoutConfig, SimNode};
use crate::model::EntityKind;
use crate::projection::{PlotArea, ProjectionMap, ProjectionView};
use crate::risk::RiskConfig;
use crate::sampler::{sample, SamplerConfig, WorkingSubgraph};
use crate::stats::{mean_distribution, MeanDistribution};
use crate::store::{EntityIx, EntityStore, RelIx};
use crate::style::{self, EdgeStyle, NodeStyle};

pub const RECENTER_SCALE: f32 = 1.5;
const PROJECTION_HIT_SLACK: f32 = 2.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sampler: SamplerConfig,
    pub layout: LayoutConfig,
    pub risk: RiskConfig,
    pub plot: PlotArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(EntityIx),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    Start,
    Move(Vec2),
    End,
}

/// Notifications for the rendering surface, drained once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Highlight changed; both views restyle.
    Restyle,
    /// The visible set changed under a filter or resample.
    VisibilityChanged,
    Recenter {
        entity: EntityIx,
        target: Vec2,
        scale: f32,
    },
    NotFound {
        term: String,
    },
    Resampled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSprite {
    pub entity: EntityIx,
    pub position: Vec2,
    pub style: NodeStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSegment {
    pub relationship: RelIx,
    pub from: Vec2,
    pub to: Vec2,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeSegment>,
}

/// Owns the loaded dataset and every piece of view state derived from it.
/// All controls are synchronous; the rendering surface reads positions and
/// styles back and drains [`ViewEvent`]s.
#[derive(Debug, Clone)]
pub struct Explorer {
    store: EntityStore,
    projection_map: ProjectionMap,
    cfg: EngineConfig,
    seeds: Vec<String>,
    seed_set: BTreeSet<EntityIx>,
    working: WorkingSubgraph,
    filter: FilterState,
    visible: VisibleSet,
    highlight: HighlightState,
    layout: ForceLayout,
    projection: ProjectionView,
    mean: MeanDistribution,
    events: Vec<ViewEvent>,
    generation: u64,
}

impl Explorer {
    pub fn new(
        store: EntityStore,
        projection_map: ProjectionMap,
        seeds: Vec<String>,
        cfg: EngineConfig,
        width: f32,
        height: f32,
    ) -> Self {
        let layout = ForceLayout::new(cfg.layout.clone(), width, height);
        let projection = ProjectionView::new(cfg.plot);
        let mean = mean_distribution(&store);
        let mut explorer = Self {
            store,
            projection_map,
            cfg,
            seeds: Vec::new(),
            seed_set: BTreeSet::new(),
            working: WorkingSubgraph::default(),
            filter: FilterState::default(),
            visible: VisibleSet::default(),
            highlight: HighlightState::default(),
            layout,
            projection,
            mean,
            events: Vec::new(),
            generation: 0,
        };
        explorer.apply_seeds(seeds);
        explorer.events.clear();
        tracing::info!(
            seeds = explorer.seed_set.len(),
            entities = explorer.working.entity_count(),
            relationships = explorer.working.relationship_count(),
            projected = explorer.projection.points().len(),
            "explorer ready"
        );
        explorer
    }

    fn apply_seeds(&mut self, seeds: Vec<String>) {
        let unresolved = seeds.iter().filter(|s| self.store.get(s).is_none()).count();
        if unresolved > 0 {
            tracing::debug!(unresolved, "seed identifiers not in dataset");
        }
        self.seed_set = seeds.iter().filter_map(|s| self.store.get(s)).collect();
        self.seeds = seeds;
        self.working = sample(&self.store, &self.seeds, &self.cfg.sampler);
        self.layout.load(&self.store, &self.working);

        // The rendered relationship set changed, so rebuild the neighborhood.
        if let Some(ix) = self.highlight.selected() {
            self.highlight.select(&self.store, &self.working, ix);
        }
        self.refresh_visibility();
    }

    fn refresh_visibility(&mut self) {
        self.visible = VisibleSet::compute(&self.store, &self.working, &self.filter);
        self.projection.recompute(
            &self.store,
            &self.projection_map,
            &self.visible,
            &self.highlight,
        );
    }

    fn restyle(&mut self) {
        self.projection.restyle(&self.highlight);
        self.events.push(ViewEvent::Restyle);
    }

    fn recenter(&mut self, ix: EntityIx) {
        if let Some(target) = self.layout.position(ix) {
            self.events.push(ViewEvent::Recenter {
                entity: ix,
                target,
                scale: RECENTER_SCALE,
            });
        }
    }

    // --- controls ---

    /// Selects `id` if the store knows it.
    pub fn select(&mut self, id: &str) -> bool {
        match self.store.get(id) {
            Some(ix) => {
                self.select_entity(ix);
                true
            }
            None => false,
        }
    }

    pub fn select_entity(&mut self, ix: EntityIx) {
        if self.store.try_entity(ix).is_none() {
            return;
        }
        self.highlight.select(&self.store, &self.working, ix);
        self.restyle();
    }

    /// Case-insensitive substring search over the working subgraph's
    /// identifiers; the first match in store order wins.
    pub fn search(&mut self, term: &str) -> SearchOutcome {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return SearchOutcome::NotFound;
        }
        let found = self.working.entities().find(|ix| {
            self.store
                .entity(*ix)
                .id
                .as_str()
                .to_lowercase()
                .contains(&needle)
        });
        match found {
            Some(ix) => {
                self.select_entity(ix);
                self.recenter(ix);
                SearchOutcome::Found(ix)
            }
            None => {
                tracing::info!(term = %term.trim(), "search found no rendered entity");
                self.events.push(ViewEvent::NotFound {
                    term: term.trim().to_string(),
                });
                SearchOutcome::NotFound
            }
        }
    }

    /// Returns true when the filter actually changed.
    pub fn set_filter(&mut self, kind: EntityKind, enabled: bool) -> bool {
        if !self.filter.set(kind, enabled) {
            return false;
        }
        self.refresh_visibility();
        self.events.push(ViewEvent::VisibilityChanged);
        true
    }

    pub fn clear(&mut self) {
        self.highlight.clear();
        self.restyle();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.layout.resize(width, height);
    }

    pub fn drag(&mut self, id: &str, phase: DragPhase) -> bool {
        match self.store.get(id) {
            Some(ix) => self.drag_entity(ix, phase),
            None => false,
        }
    }

    pub fn drag_entity(&mut self, ix: EntityIx, phase: DragPhase) -> bool {
        match phase {
            DragPhase::Start => self.layout.drag_start(ix),
            DragPhase::Move(p) => self.layout.drag_move(ix, p),
            DragPhase::End => self.layout.drag_end(ix),
        }
    }

    /// Clears any selection, then selects and recenters on `id`.
    pub fn focus(&mut self, id: &str) -> bool {
        let Some(ix) = self.store.get(id) else {
            return false;
        };
        self.highlight.clear();
        self.select_entity(ix);
        self.recenter(ix);
        true
    }

    /// Selects the projection point under `p` (plot space), if any.
    pub fn click_projection(&mut self, p: Vec2) -> Option<EntityIx> {
        let ix = self.projection.hit_test(p, PROJECTION_HIT_SLACK)?;
        self.select_entity(ix);
        Some(ix)
    }

    pub fn resample(&mut self, seeds: Vec<String>) {
        self.apply_seeds(seeds);
        self.generation += 1;
        self.events.push(ViewEvent::Resampled);
        self.events.push(ViewEvent::VisibilityChanged);
    }

    // --- outputs ---

    pub fn advance(&mut self, dt: f32) -> &[SimNode] {
        self.layout.advance(dt)
    }

    /// Topmost visible entity whose marker covers `p` (layout space).
    pub fn pick(&self, p: Vec2, slack: f32) -> Option<EntityIx> {
        self.visible
            .entities()
            .filter_map(|ix| {
                let pos = self.layout.position(ix)?;
                let reach = self.node_style(ix)?.radius + slack;
                let d = pos.distance(p);
                (d <= reach).then_some((ix, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(ix, _)| ix)
    }

    pub fn frame(&self) -> RenderFrame {
        let nodes = self
            .visible
            .entities()
            .filter_map(|ix| {
                Some(NodeSprite {
                    entity: ix,
                    position: self.layout.position(ix)?,
                    style: self.node_style(ix)?,
                })
            })
            .collect();
        let edges = self
            .visible
            .relationships()
            .filter_map(|rx| {
                let rel = self.store.relationship(rx);
                Some(EdgeSegment {
                    relationship: rx,
                    from: self.layout.position(rel.source)?,
                    to: self.layout.position(rel.target)?,
                    style: self.edge_style(rx),
                })
            })
            .collect();
        RenderFrame { nodes, edges }
    }

    /// `None` for an index this store never issued.
    pub fn node_style(&self, ix: EntityIx) -> Option<NodeStyle> {
        let entity = self.store.try_entity(ix)?;
        Some(style::node_style(
            entity.kind,
            self.is_seed(ix),
            ix,
            &self.highlight,
        ))
    }

    pub fn edge_style(&self, rx: RelIx) -> EdgeStyle {
        style::edge_style(self.store.relationship(rx), rx, &self.highlight)
    }

    pub fn summary(&self, ix: EntityIx) -> Option<EntitySummary> {
        self.store.try_entity(ix)?;
        Some(EntitySummary::build(
            &self.store,
            &self.working,
            ix,
            &self.cfg.risk,
        ))
    }

    pub fn selection_summary(&self) -> Option<EntitySummary> {
        self.highlight.selected().and_then(|ix| self.summary(ix))
    }

    pub fn hover(&self, ix: EntityIx) -> Option<HoverSummary> {
        self.store.try_entity(ix)?;
        Some(HoverSummary::of(&self.store, ix))
    }

    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn working(&self) -> &WorkingSubgraph {
        &self.working
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn layout(&self) -> &ForceLayout {
        &self.layout
    }

    pub fn projection(&self) -> &ProjectionView {
        &self.projection
    }

    pub fn mean_distribution(&self) -> &MeanDistribution {
        &self.mean
    }

    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    pub fn is_seed(&self, ix: EntityIx) -> bool {
        self.seed_set.contains(&ix)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Bumped on every resample so renderers can rebuild per-entity state.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind::*;
    use crate::store::StoreBuilder;

    fn explorer() -> Explorer {
        let store = StoreBuilder::new()
            .entity("Mar de la Vida OJSC", Organization)
            .entity("979893388", Vessel)
            .entity("Marine Sanctuary", Location)
            .link("Mar de la Vida OJSC", "979893388")
            .link("979893388", "Marine Sanctuary")
            .build();
        Explorer::new(
            store,
            ProjectionMap::default(),
            vec!["Mar de la Vida OJSC".into()],
            EngineConfig::default(),
            800.0,
            600.0,
        )
    }

    #[test]
    fn startup_queues_nothing() {
        let mut ex = explorer();
        assert!(ex.drain_events().is_empty());
        assert_eq!(ex.generation(), 0);
        assert_eq!(ex.working().entity_count(), 3);
    }

    #[test]
    fn search_selects_and_recenters() {
        let mut ex = explorer();
        let hit = ex.search("  MAR DE ");
        let ix = ex.store().get("Mar de la Vida OJSC").unwrap();
        assert_eq!(hit, SearchOutcome::Found(ix));
        let events = ex.drain_events();
        assert_eq!(events[0], ViewEvent::Restyle);
        assert!(matches!(
            events[1],
            ViewEvent::Recenter { entity, scale, .. } if entity == ix && scale == 1.5
        ));
    }

    #[test]
    fn blank_search_is_silent_and_miss_is_reported() {
        let mut ex = explorer();
        assert_eq!(ex.search("   "), SearchOutcome::NotFound);
        assert!(ex.drain_events().is_empty());

        ex.select("979893388");
        ex.drain_events();
        assert_eq!(ex.search("zzz"), SearchOutcome::NotFound);
        assert_eq!(
            ex.drain_events(),
            vec![ViewEvent::NotFound { term: "zzz".into() }]
        );
        // State unchanged by the miss.
        assert!(ex.highlight().is_active());
    }

    #[test]
    fn unchanged_filter_emits_nothing() {
        let mut ex = explorer();
        assert!(!ex.set_filter(Vessel, true));
        assert!(ex.set_filter(Vessel, false));
        assert_eq!(ex.drain_events(), vec![ViewEvent::VisibilityChanged]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut ex = explorer();
        assert!(!ex.select("nobody"));
        assert!(!ex.focus("nobody"));
        assert!(!ex.drag("nobody", DragPhase::Start));
        assert!(ex.drain_events().is_empty());
    }
}
