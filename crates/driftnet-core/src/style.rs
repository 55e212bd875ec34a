use serde::{Deserialize, Serialize};
use std::fmt;

use crate::highlight::HighlightState;
use crate::model::EntityKind;
use crate::store::{EntityIx, RelIx, Relationship};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const GREY: Rgb = Rgb(0x99, 0x99, 0x99);
    pub const ACCENT: Rgb = Rgb(0xff, 0x57, 0x22);

    pub fn to_f32(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

pub fn kind_color(kind: EntityKind) -> Rgb {
    match kind {
        EntityKind::Organization => Rgb(0xe7, 0x4c, 0x3c),
        EntityKind::Person => Rgb(0x34, 0x98, 0xdb),
        EntityKind::Vessel => Rgb(0x2e, 0xcc, 0x71),
        EntityKind::Location => Rgb(0xf3, 0x9c, 0x12),
        EntityKind::Event => Rgb(0x9b, 0x59, 0xb6),
        EntityKind::Unknown => Rgb::GREY,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub fill: Rgb,
    pub radius: f32,
    pub stroke: Rgb,
    pub stroke_width: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    pub color: Rgb,
    pub width: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub fill: Rgb,
    pub radius: f32,
    /// Color and width of the ring drawn around highlighted points.
    pub outline: Option<(Rgb, f32)>,
    pub opacity: f32,
}

const DIMMED_NODE: f32 = 0.1;
const DIMMED_EDGE: f32 = 0.05;
const DIMMED_POINT: f32 = 0.3;

pub fn node_style(kind: EntityKind, seed: bool, ix: EntityIx, highlight: &HighlightState) -> NodeStyle {
    let (radius, stroke, stroke_width) = if seed {
        (10.0, Rgb::BLACK, 2.0)
    } else {
        (5.0, Rgb::WHITE, 1.0)
    };
    let opacity = if highlight.is_active() && !highlight.contains_entity(ix) {
        DIMMED_NODE
    } else {
        1.0
    };
    NodeStyle {
        fill: kind_color(kind),
        radius,
        stroke,
        stroke_width,
        opacity,
    }
}

pub fn edge_style(rel: &Relationship, rx: RelIx, highlight: &HighlightState) -> EdgeStyle {
    let base = rel.stroke_width();
    if !highlight.is_active() {
        return EdgeStyle {
            color: Rgb::GREY,
            width: base,
            opacity: 0.6,
        };
    }
    if highlight.contains_relationship(rx) {
        EdgeStyle {
            color: Rgb::ACCENT,
            width: base * 2.0,
            opacity: 1.0,
        }
    } else {
        EdgeStyle {
            color: Rgb::GREY,
            width: base,
            opacity: DIMMED_EDGE,
        }
    }
}

pub fn point_style(kind: EntityKind, ix: EntityIx, highlight: &HighlightState) -> PointStyle {
    let lit = highlight.contains_entity(ix);
    PointStyle {
        fill: kind_color(kind),
        radius: if lit { 5.0 } else { 3.0 },
        outline: lit.then_some((Rgb::BLACK, 2.0)),
        opacity: if highlight.is_active() && !lit {
            DIMMED_POINT
        } else {
            1.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind::*;
    use crate::sampler::{sample, SamplerConfig};
    use crate::store::StoreBuilder;

    #[test]
    fn colors_render_as_hex() {
        assert_eq!(kind_color(Organization).to_string(), "#e74c3c");
        assert_eq!(kind_color(Event).to_string(), "#9b59b6");
        assert_eq!(kind_color(Unknown).to_string(), "#999999");
        assert_eq!(Rgb::ACCENT.to_string(), "#ff5722");
    }

    #[test]
    fn selection_dims_everything_outside_highlight() {
        let store = StoreBuilder::new()
            .entity("A", Organization)
            .entity("B", Vessel)
            .entity("C", Person)
            .weighted("A", "B", 4.0)
            .link("B", "C")
            .build();
        let working = sample(&store, &["A"], &SamplerConfig::default());
        let (a, c) = (store.get("A").unwrap(), store.get("C").unwrap());
        let mut hl = HighlightState::default();

        let idle = node_style(Person, false, c, &hl);
        assert_eq!(idle.opacity, 1.0);
        assert_eq!((idle.radius, idle.stroke, idle.stroke_width), (5.0, Rgb::WHITE, 1.0));
        let seed = node_style(Organization, true, a, &hl);
        assert_eq!((seed.radius, seed.stroke, seed.stroke_width), (10.0, Rgb::BLACK, 2.0));

        hl.select(&store, &working, a);
        assert_eq!(node_style(Person, false, c, &hl).opacity, 0.1);
        assert_eq!(node_style(Organization, true, a, &hl).opacity, 1.0);

        let (ab, ab_rel) = store.relationships().next().unwrap();
        let lit = edge_style(ab_rel, ab, &hl);
        assert_eq!((lit.color, lit.width, lit.opacity), (Rgb::ACCENT, 4.0, 1.0));
        let (bc, bc_rel) = store.relationships().nth(1).unwrap();
        let dim = edge_style(bc_rel, bc, &hl);
        assert_eq!((dim.color, dim.width, dim.opacity), (Rgb::GREY, 1.0, 0.05));

        hl.clear();
        let base = edge_style(ab_rel, ab, &hl);
        assert_eq!((base.color, base.width, base.opacity), (Rgb::GREY, 2.0, 0.6));
    }

    #[test]
    fn projection_points_ring_highlighted_entities() {
        let store = StoreBuilder::new()
            .entity("A", Vessel)
            .entity("B", Vessel)
            .entity("C", Vessel)
            .link("A", "B")
            .build();
        let working = sample(&store, &["A", "C"], &SamplerConfig::default());
        let (a, c) = (store.get("A").unwrap(), store.get("C").unwrap());
        let mut hl = HighlightState::default();
        assert_eq!(point_style(Vessel, c, &hl).opacity, 1.0);

        hl.select(&store, &working, a);
        let lit = point_style(Vessel, a, &hl);
        assert_eq!((lit.radius, lit.outline), (5.0, Some((Rgb::BLACK, 2.0))));
        let dim = point_style(Vessel, c, &hl);
        assert_eq!((dim.radius, dim.outline, dim.opacity), (3.0, None, 0.3));
    }
}
