//! Secondary scatter view over precomputed 2-D coordinates.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::filter::VisibleSet;
use crate::highlight::HighlightState;
use crate::model::EntityKind;
use crate::store::{EntityIx, EntityStore};
use crate::style::{point_style, PointStyle};

pub const EMPTY_PLACEHOLDER: &str = "No nodes to display in current view";

/// Precomputed coordinates keyed by entity identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionMap {
    points: HashMap<String, Vec2>,
}

impl ProjectionMap {
    pub fn insert(&mut self, id: String, x: f32, y: f32) {
        self.points.insert(id, Vec2::new(x, y));
    }

    pub fn get(&self, id: &str) -> Option<Vec2> {
        self.points.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotArea {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl Default for PlotArea {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 300.0,
            margin_left: 40.0,
            margin_right: 20.0,
            margin_top: 20.0,
            margin_bottom: 40.0,
        }
    }
}

impl PlotArea {
    pub fn square(size: f32) -> Self {
        Self {
            width: size,
            height: size,
            ..Default::default()
        }
    }

    fn x_range(&self) -> (f32, f32) {
        (self.margin_left, self.width - self.margin_right)
    }

    // inverted: larger values sit higher on screen
    fn y_range(&self) -> (f32, f32) {
        (self.height - self.margin_bottom, self.margin_top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f32, f32),
    pub range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// Domain with `fraction` of its span added on both ends.
    fn padded(lo: f32, hi: f32, fraction: f32, range: (f32, f32)) -> Self {
        let pad = (hi - lo) * fraction;
        Self::new((lo - pad, hi + pad), range)
    }

    pub fn apply(&self, v: f32) -> f32 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 || !span.is_finite() {
            return (self.range.0 + self.range.1) * 0.5;
        }
        let t = (v - self.domain.0) / span;
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    /// Round tick values inside the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f32> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        let span = hi - lo;
        if count == 0 || span <= 0.0 || !span.is_finite() {
            return if lo.is_finite() { vec![lo] } else { Vec::new() };
        }

        let raw = span / count as f32;
        let power = 10f32.powf(raw.log10().floor());
        let error = raw / power;
        let factor = if error >= 50f32.sqrt() {
            10.0
        } else if error >= 10f32.sqrt() {
            5.0
        } else if error >= 2f32.sqrt() {
            2.0
        } else {
            1.0
        };
        let step = power * factor;

        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f32 * step).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub entity: EntityIx,
    pub kind: EntityKind,
    /// Coordinates as loaded.
    pub data: Vec2,
    /// Plot-space position, margins included.
    pub screen: Vec2,
    pub highlighted: bool,
    pub style: PointStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionRender<'a> {
    Disabled,
    Placeholder(&'static str),
    Plot {
        x_scale: LinearScale,
        y_scale: LinearScale,
        points: &'a [ProjectedPoint],
    },
}

#[derive(Debug, Clone)]
pub struct ProjectionView {
    area: PlotArea,
    enabled: bool,
    points: Vec<ProjectedPoint>,
    x_scale: LinearScale,
    y_scale: LinearScale,
}

impl ProjectionView {
    pub fn new(area: PlotArea) -> Self {
        Self {
            area,
            enabled: false,
            points: Vec::new(),
            x_scale: LinearScale::new((0.0, 1.0), area.x_range()),
            y_scale: LinearScale::new((0.0, 1.0), area.y_range()),
        }
    }

    pub fn area(&self) -> PlotArea {
        self.area
    }

    /// Collects one point per visible entity that has coordinates and refits
    /// both scales to the collected extent.
    pub fn recompute(
        &mut self,
        store: &EntityStore,
        map: &ProjectionMap,
        visible: &VisibleSet,
        highlight: &HighlightState,
    ) {
        self.enabled = !map.is_empty();
        self.points.clear();
        if !self.enabled {
            return;
        }

        for ix in visible.entities() {
            let entity = store.entity(ix);
            let Some(data) = map.get(entity.id.as_str()) else {
                continue;
            };
            self.points.push(ProjectedPoint {
                entity: ix,
                kind: entity.kind,
                data,
                screen: Vec2::ZERO,
                highlighted: false,
                style: point_style(entity.kind, ix, highlight),
            });
        }

        if let Some(first) = self.points.first() {
            let (mut lo, mut hi) = (first.data, first.data);
            for p in &self.points {
                lo = lo.min(p.data);
                hi = hi.max(p.data);
            }
            self.x_scale = LinearScale::padded(lo.x, hi.x, 0.1, self.area.x_range());
            self.y_scale = LinearScale::padded(lo.y, hi.y, 0.1, self.area.y_range());
        }
        for p in &mut self.points {
            p.screen = Vec2::new(self.x_scale.apply(p.data.x), self.y_scale.apply(p.data.y));
        }

        self.restyle(highlight);
    }

    /// Restyles and reorders without touching the point set; highlighted
    /// points end up last so they draw on top.
    pub fn restyle(&mut self, highlight: &HighlightState) {
        for p in &mut self.points {
            p.highlighted = highlight.contains_entity(p.entity);
            p.style = point_style(p.kind, p.entity, highlight);
        }
        self.points.sort_by_key(|p| (p.highlighted, p.entity));
    }

    pub fn render(&self) -> ProjectionRender<'_> {
        if !self.enabled {
            ProjectionRender::Disabled
        } else if self.points.is_empty() {
            ProjectionRender::Placeholder(EMPTY_PLACEHOLDER)
        } else {
            ProjectionRender::Plot {
                x_scale: self.x_scale,
                y_scale: self.y_scale,
                points: &self.points,
            }
        }
    }

    pub fn points(&self) -> &[ProjectedPoint] {
        &self.points
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Topmost point within its radius plus `slack` of `p` (plot space).
    pub fn hit_test(&self, p: Vec2, slack: f32) -> Option<EntityIx> {
        self.points
            .iter()
            .rev()
            .find(|pt| pt.screen.distance(p) <= pt.style.radius + slack)
            .map(|pt| pt.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterState;
    use crate::model::EntityKind::*;
    use crate::sampler::{sample, SamplerConfig, WorkingSubgraph};
    use crate::store::StoreBuilder;

    fn setup() -> (EntityStore, WorkingSubgraph, ProjectionMap) {
        let store = StoreBuilder::new()
            .entity("A", Vessel)
            .entity("B", Organization)
            .entity("C", Vessel)
            .entity("D", Person)
            .link("A", "B")
            .link("B", "C")
            .link("C", "D")
            .build();
        let working = sample(&store, &["B"], &SamplerConfig::default());
        let mut map = ProjectionMap::default();
        map.insert("A".into(), 0.0, 0.0);
        map.insert("B".into(), 10.0, 20.0);
        map.insert("C".into(), 5.0, 10.0);
        (store, working, map)
    }

    #[test]
    fn scale_padding_and_inverted_y() {
        let (store, working, map) = setup();
        let visible = VisibleSet::compute(&store, &working, &FilterState::default());
        let mut view = ProjectionView::new(PlotArea::default());
        view.recompute(&store, &map, &visible, &HighlightState::default());

        // D is visible but has no coordinates.
        assert_eq!(view.points().len(), 3);
        let ProjectionRender::Plot { x_scale, y_scale, .. } = view.render() else {
            panic!("expected plot");
        };
        assert_eq!(x_scale.domain, (-1.0, 11.0));
        assert_eq!(y_scale.domain, (-2.0, 22.0));
        assert_eq!(x_scale.apply(-1.0), 40.0);
        assert_eq!(x_scale.apply(11.0), 280.0);
        assert_eq!(y_scale.apply(-2.0), 260.0);
        assert_eq!(y_scale.apply(22.0), 20.0);
    }

    #[test]
    fn degenerate_extent_maps_to_middle() {
        let s = LinearScale::new((3.0, 3.0), (40.0, 280.0));
        assert_eq!(s.apply(3.0), 160.0);
        let s = LinearScale::padded(7.0, 7.0, 0.1, (0.0, 100.0));
        assert_eq!(s.apply(7.0), 50.0);
    }

    #[test]
    fn filtered_kind_leaves_plot_and_empty_plot_shows_placeholder() {
        let (store, working, map) = setup();
        let mut filter = FilterState::default();
        filter.set(Vessel, false);
        let mut view = ProjectionView::new(PlotArea::default());
        view.recompute(
            &store,
            &map,
            &VisibleSet::compute(&store, &working, &filter),
            &HighlightState::default(),
        );
        assert!(view.points().iter().all(|p| p.kind != Vessel));

        filter.set(Organization, false);
        view.recompute(
            &store,
            &map,
            &VisibleSet::compute(&store, &working, &filter),
            &HighlightState::default(),
        );
        assert_eq!(view.render(), ProjectionRender::Placeholder(EMPTY_PLACEHOLDER));
    }

    #[test]
    fn empty_map_disables_view() {
        let (store, working, _) = setup();
        let mut view = ProjectionView::new(PlotArea::default());
        view.recompute(
            &store,
            &ProjectionMap::default(),
            &VisibleSet::compute(&store, &working, &FilterState::default()),
            &HighlightState::default(),
        );
        assert_eq!(view.render(), ProjectionRender::Disabled);
        assert!(view.hit_test(Vec2::new(100.0, 100.0), 10.0).is_none());
    }

    #[test]
    fn highlighted_points_draw_last_and_win_hit_tests() {
        let (store, working, mut map) = setup();
        // Put A on top of B.
        map.insert("A".into(), 10.0, 20.0);
        let visible = VisibleSet::compute(&store, &working, &FilterState::default());
        let mut view = ProjectionView::new(PlotArea::default());
        let mut hl = HighlightState::default();
        view.recompute(&store, &map, &visible, &hl);

        let c = store.get("C").unwrap();
        hl.select(&store, &working, c);
        view.restyle(&hl);
        assert_eq!(view.points().len(), 3);
        let last = view.points().last().unwrap();
        assert!(last.highlighted);
        assert!(!view.points()[0].highlighted);

        let a = store.get("A").unwrap();
        let b = store.get("B").unwrap();
        let spot = view.points().iter().find(|p| p.entity == a).unwrap().screen;
        // B neighbors C, so it is highlighted and sits above A.
        assert_eq!(view.hit_test(spot, 0.0), Some(b));
    }

    #[test]
    fn ticks_are_round_numbers_within_domain() {
        let s = LinearScale::new((-1.0, 11.0), (0.0, 1.0));
        assert_eq!(s.ticks(5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(LinearScale::new((2.0, 2.0), (0.0, 1.0)).ticks(5), vec![2.0]);
    }
}
