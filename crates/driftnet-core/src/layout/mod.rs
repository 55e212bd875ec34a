//! Force-directed placement of the working subgraph.
//!
//! The engine owns every entity position. It is stepped explicitly through
//! [`ForceLayout::advance`] so the caller decides the frame cadence.

mod forces;
mod quadtree;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::sampler::WorkingSubgraph;
use crate::store::{EntityIx, EntityStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub link_distance: f32,
    pub charge_strength: f32,
    pub collide_radius: f32,
    pub collide_strength: f32,
    /// Barnes–Hut opening criterion.
    pub theta: f32,
    pub distance_min: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
    pub reheat_alpha: f32,
    /// Spacing of the spiral new entities are placed on.
    pub initial_radius: f32,
    /// Seconds per simulation tick.
    pub tick_interval: f32,
    pub max_ticks_per_advance: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001f32;
        Self {
            link_distance: 100.0,
            charge_strength: -100.0,
            collide_radius: 10.0,
            collide_strength: 1.0,
            theta: 0.9,
            distance_min: 1.0,
            alpha_min,
            // reaches alpha_min after ~300 ticks
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            reheat_alpha: 0.3,
            initial_radius: 10.0,
            tick_interval: 1.0 / 60.0,
            max_ticks_per_advance: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimNode {
    pub entity: EntityIx,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SimLink {
    pub source: usize,
    pub target: usize,
    pub strength: f32,
    pub bias: f32,
}

/// Deterministic jitter source used to split coincident points.
#[derive(Debug, Clone)]
pub(crate) struct Lcg(u32);

impl Default for Lcg {
    fn default() -> Self {
        Self(1)
    }
}

impl Lcg {
    fn next(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.0 as f32 / 4_294_967_296.0
    }

    pub(crate) fn jiggle(&mut self) -> f32 {
        (self.next() - 0.5) * 1e-6
    }
}

#[derive(Debug, Clone)]
pub struct ForceLayout {
    cfg: LayoutConfig,
    nodes: Vec<SimNode>,
    slots: HashMap<EntityIx, usize>,
    links: Vec<SimLink>,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    clock: f32,
    dragging: Option<EntityIx>,
    rng: Lcg,
    ticks: u64,
}

impl ForceLayout {
    pub fn new(cfg: LayoutConfig, width: f32, height: f32) -> Self {
        Self {
            cfg,
            nodes: Vec::new(),
            slots: HashMap::new(),
            links: Vec::new(),
            center: Vec2::new(width, height) * 0.5,
            alpha: 1.0,
            alpha_target: 0.0,
            running: false,
            clock: 0.0,
            dragging: None,
            rng: Lcg::default(),
            ticks: 0,
        }
    }

    /// Rebuilds nodes and springs for `working`. Entities that were already
    /// laid out keep their position and velocity.
    pub fn load(&mut self, store: &EntityStore, working: &WorkingSubgraph) {
        let previous: HashMap<EntityIx, SimNode> =
            self.nodes.drain(..).map(|n| (n.entity, n)).collect();

        self.slots.clear();
        let mut placed = 0usize;
        for (i, ix) in working.entities().enumerate() {
            let node = match previous.get(&ix) {
                Some(kept) => SimNode {
                    pinned: None,
                    ..*kept
                },
                None => {
                    placed += 1;
                    SimNode {
                        entity: ix,
                        position: self.spiral(i),
                        velocity: Vec2::ZERO,
                        pinned: None,
                    }
                }
            };
            self.slots.insert(ix, self.nodes.len());
            self.nodes.push(node);
        }

        let mut degree = vec![0u32; self.nodes.len()];
        let mut ends = Vec::with_capacity(working.relationship_count());
        for rx in working.relationships() {
            let rel = store.relationship(rx);
            if rel.is_self_loop() {
                continue;
            }
            let (Some(&s), Some(&t)) = (self.slots.get(&rel.source), self.slots.get(&rel.target))
            else {
                continue;
            };
            degree[s] += 1;
            degree[t] += 1;
            ends.push((s, t));
        }
        self.links = ends
            .into_iter()
            .map(|(s, t)| {
                let (ds, dt) = (degree[s] as f32, degree[t] as f32);
                SimLink {
                    source: s,
                    target: t,
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        if let Some(ix) = self.dragging {
            match self.slots.get(&ix) {
                Some(&slot) => self.nodes[slot].pinned = Some(self.nodes[slot].position),
                None => {
                    self.dragging = None;
                    self.alpha_target = 0.0;
                }
            }
        }

        self.alpha = 1.0;
        self.running = true;
        self.clock = 0.0;
        tracing::debug!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            placed,
            "layout loaded"
        );
    }

    fn spiral(&self, i: usize) -> Vec2 {
        let golden = std::f32::consts::PI * (3.0 - 5f32.sqrt());
        let r = self.cfg.initial_radius * (0.5 + i as f32).sqrt();
        let angle = i as f32 * golden;
        self.center + Vec2::new(r * angle.cos(), r * angle.sin())
    }

    /// One simulation step regardless of the running flag.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.cfg.alpha_decay;
        let alpha = self.alpha;
        let cfg = &self.cfg;

        forces::links(&mut self.nodes, &self.links, cfg.link_distance, alpha, &mut self.rng);
        forces::charge(
            &mut self.nodes,
            cfg.charge_strength,
            cfg.theta,
            cfg.distance_min,
            alpha,
            &mut self.rng,
        );
        forces::center(&mut self.nodes, self.center);
        forces::collide(&mut self.nodes, cfg.collide_radius, cfg.collide_strength, &mut self.rng);

        let keep = 1.0 - cfg.velocity_decay;
        for node in &mut self.nodes {
            match node.pinned {
                Some(pin) => {
                    node.position = pin;
                    node.velocity = Vec2::ZERO;
                }
                None => {
                    node.velocity *= keep;
                    node.position += node.velocity;
                }
            }
        }

        self.ticks += 1;
        if self.alpha < self.cfg.alpha_min {
            self.running = false;
        }
    }

    /// Advances simulated time by `dt` seconds and returns the positions.
    pub fn advance(&mut self, dt: f32) -> &[SimNode] {
        if !self.running {
            self.clock = 0.0;
            return &self.nodes;
        }
        let interval = self.cfg.tick_interval.max(1e-4);
        self.clock += dt.max(0.0);

        let mut steps = 0u32;
        while self.clock >= interval && steps < self.cfg.max_ticks_per_advance && self.running {
            self.tick();
            self.clock -= interval;
            steps += 1;
        }
        // drop the backlog
        self.clock = self.clock.min(interval);
        &self.nodes
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, ix: EntityIx) -> Option<&SimNode> {
        self.slots.get(&ix).map(|slot| &self.nodes[*slot])
    }

    pub fn position(&self, ix: EntityIx) -> Option<Vec2> {
        self.node(ix).map(|n| n.position)
    }

    pub fn set_position(&mut self, ix: EntityIx, p: Vec2) -> bool {
        let Some(&slot) = self.slots.get(&ix) else {
            return false;
        };
        self.nodes[slot].position = p;
        self.nodes[slot].velocity = Vec2::ZERO;
        true
    }

    pub fn pin(&mut self, ix: EntityIx, p: Vec2) -> bool {
        let Some(&slot) = self.slots.get(&ix) else {
            return false;
        };
        self.nodes[slot].pinned = Some(p);
        true
    }

    pub fn unpin(&mut self, ix: EntityIx) -> bool {
        let Some(&slot) = self.slots.get(&ix) else {
            return false;
        };
        self.nodes[slot].pinned.take().is_some()
    }

    pub fn drag_start(&mut self, ix: EntityIx) -> bool {
        let Some(&slot) = self.slots.get(&ix) else {
            return false;
        };
        if let Some(prev) = self.dragging.take() {
            if prev != ix {
                self.unpin(prev);
            }
        }
        self.nodes[slot].pinned = Some(self.nodes[slot].position);
        self.dragging = Some(ix);
        self.alpha_target = self.cfg.drag_alpha_target;
        self.running = true;
        true
    }

    pub fn drag_move(&mut self, ix: EntityIx, p: Vec2) -> bool {
        if self.dragging != Some(ix) {
            return false;
        }
        self.pin(ix, p) && self.set_position(ix, p)
    }

    pub fn drag_end(&mut self, ix: EntityIx) -> bool {
        if self.dragging != Some(ix) {
            return false;
        }
        self.dragging = None;
        self.alpha_target = 0.0;
        self.unpin(ix);
        true
    }

    pub fn dragging(&self) -> Option<EntityIx> {
        self.dragging
    }

    /// Moves the centering target; positions are left alone.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.center = Vec2::new(width, height) * 0.5;
        self.reheat(self.cfg.reheat_alpha);
    }

    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.running = true;
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }
}
