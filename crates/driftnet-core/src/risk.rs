use serde::{Deserialize, Serialize};

use crate::model::EntityKind;
use crate::store::{EntityIx, EntityStore};
use crate::style::{kind_color, Rgb};

/// Weights and caps of the risk terms. The suspicion cutoffs are strict
/// thresholds: the bonus applies above them, never at them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub degree_weight: f64,
    pub degree_cap: f64,
    pub vessel_weight: f64,
    pub vessel_cap: f64,
    pub organization_weight: f64,
    pub organization_cap: f64,
    pub suspicion_bonus: f64,
    pub suspicious_connections: usize,
    pub suspicious_vessel_links: usize,
    pub max_score: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            degree_weight: 0.3,
            degree_cap: 3.0,
            vessel_weight: 0.5,
            vessel_cap: 2.0,
            organization_weight: 0.3,
            organization_cap: 1.5,
            suspicion_bonus: 3.0,
            suspicious_connections: 10,
            suspicious_vessel_links: 3,
            max_score: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RiskInputs {
    pub kind: EntityKind,
    pub connections: usize,
    pub vessel_links: usize,
    pub organization_links: usize,
}

impl RiskInputs {
    /// Counts over the full dataset, so filters never move a score.
    pub fn of(store: &EntityStore, ix: EntityIx) -> Self {
        let mut inputs = RiskInputs {
            kind: store.entity(ix).kind,
            connections: store.degree(ix),
            ..Default::default()
        };
        for other in store.neighbors(ix) {
            match store.entity(other).kind {
                EntityKind::Vessel => inputs.vessel_links += 1,
                EntityKind::Organization => inputs.organization_links += 1,
                _ => {}
            }
        }
        inputs
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskBreakdown {
    pub degree: f64,
    pub kind: f64,
    pub vessel: f64,
    pub organization: f64,
    pub bonus: f64,
    /// Sum of the terms before clamping.
    pub raw: f64,
    pub total: f64,
}

impl RiskBreakdown {
    pub fn category(&self) -> RiskCategory {
        RiskCategory::of(self.total)
    }
}

fn kind_term(kind: EntityKind) -> f64 {
    match kind {
        EntityKind::Vessel => 2.0,
        EntityKind::Organization => 1.0,
        EntityKind::Person => 0.5,
        EntityKind::Location | EntityKind::Event | EntityKind::Unknown => 0.0,
    }
}

pub fn score(inputs: &RiskInputs, cfg: &RiskConfig) -> RiskBreakdown {
    let degree = (inputs.connections as f64 * cfg.degree_weight).min(cfg.degree_cap);
    let kind = kind_term(inputs.kind);
    let vessel = (inputs.vessel_links as f64 * cfg.vessel_weight).min(cfg.vessel_cap);
    let organization =
        (inputs.organization_links as f64 * cfg.organization_weight).min(cfg.organization_cap);
    let suspicious = inputs.connections > cfg.suspicious_connections
        || inputs.vessel_links > cfg.suspicious_vessel_links;
    let bonus = if suspicious { cfg.suspicion_bonus } else { 0.0 };

    let raw = degree + kind + vessel + organization + bonus;
    let total = if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, cfg.max_score.max(0.0))
    };
    RiskBreakdown {
        degree,
        kind,
        vessel,
        organization,
        bonus,
        raw,
        total,
    }
}

pub fn assess(store: &EntityStore, ix: EntityIx, cfg: &RiskConfig) -> RiskBreakdown {
    score(&RiskInputs::of(store, ix), cfg)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub fn of(total: f64) -> Self {
        if total >= 7.0 {
            RiskCategory::High
        } else if total >= 4.0 {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::High => "high risk",
            RiskCategory::Medium => "medium risk",
            RiskCategory::Low => "low risk",
        }
    }

    pub fn advisory(self) -> &'static str {
        match self {
            RiskCategory::High => "High risk. Strongly recommend further investigation.",
            RiskCategory::Medium => "Medium risk. Suggest continuous monitoring.",
            RiskCategory::Low => "Low risk. No obvious suspicious activity.",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            RiskCategory::High => kind_color(EntityKind::Organization),
            RiskCategory::Medium => kind_color(EntityKind::Location),
            RiskCategory::Low => kind_color(EntityKind::Vessel),
        }
    }
}
