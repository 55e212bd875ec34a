use glam::Vec2;
use smallvec::{smallvec, SmallVec};

use super::Lcg;

const MAX_DEPTH: u32 = 24;
const NONE: u32 = u32::MAX;

#[derive(Debug, Clone)]
struct Cell {
    min: Vec2,
    size: f32,
    children: [u32; 4],
    bodies: SmallVec<[u32; 2]>,
    leaf: bool,
    count: u32,
    center: Vec2,
}

impl Cell {
    fn new(min: Vec2, size: f32) -> Self {
        Self {
            min,
            size,
            children: [NONE; 4],
            bodies: SmallVec::new(),
            leaf: true,
            count: 0,
            center: Vec2::ZERO,
        }
    }
}

/// Barnes–Hut quadtree over a frozen snapshot of body positions. Every body
/// carries the same charge, so a cell's mass is its body count.
#[derive(Debug, Default)]
pub(crate) struct QuadTree {
    cells: Vec<Cell>,
}

impl QuadTree {
    pub(crate) fn build(points: &[Vec2]) -> Self {
        let mut tree = Self {
            cells: Vec::with_capacity(points.len() * 2),
        };
        let Some(first) = points.first() else {
            return tree;
        };

        let (mut lo, mut hi) = (*first, *first);
        for p in points {
            lo = lo.min(*p);
            hi = hi.max(*p);
        }
        let size = (hi - lo).max_element().max(1.0);
        tree.cells.push(Cell::new(lo, size));

        for body in 0..points.len() {
            tree.insert(points, body as u32);
        }
        tree.aggregate(0, points);
        tree
    }

    fn insert(&mut self, points: &[Vec2], body: u32) {
        let p = points[body as usize];
        let mut cell = 0usize;
        let mut depth = 0u32;
        loop {
            if self.cells[cell].leaf {
                let c = &self.cells[cell];
                let coincident = c
                    .bodies
                    .first()
                    .map(|b| points[*b as usize] == p)
                    .unwrap_or(false);
                if c.bodies.is_empty() || coincident || depth >= MAX_DEPTH {
                    self.cells[cell].bodies.push(body);
                    return;
                }

                // A leaf only ever stacks coincident bodies, so they all move to one child.
                let existing = std::mem::take(&mut self.cells[cell].bodies);
                self.cells[cell].leaf = false;
                for b in existing {
                    let child = self.child_for(cell, points[b as usize]);
                    self.cells[child].bodies.push(b);
                }
            }
            cell = self.child_for(cell, p);
            depth += 1;
        }
    }

    fn child_for(&mut self, cell: usize, p: Vec2) -> usize {
        let half = self.cells[cell].size * 0.5;
        let min = self.cells[cell].min;
        let right = p.x >= min.x + half;
        let below = p.y >= min.y + half;
        let q = (right as usize) | ((below as usize) << 1);

        let existing = self.cells[cell].children[q];
        if existing != NONE {
            return existing as usize;
        }
        let offset = Vec2::new(
            if right { half } else { 0.0 },
            if below { half } else { 0.0 },
        );
        let idx = self.cells.len();
        self.cells.push(Cell::new(min + offset, half));
        self.cells[cell].children[q] = idx as u32;
        idx
    }

    fn aggregate(&mut self, idx: usize, points: &[Vec2]) -> (u32, Vec2) {
        let (count, sum) = if self.cells[idx].leaf {
            let bodies = &self.cells[idx].bodies;
            let sum = bodies
                .iter()
                .fold(Vec2::ZERO, |acc, b| acc + points[*b as usize]);
            (bodies.len() as u32, sum)
        } else {
            let children = self.cells[idx].children;
            let mut count = 0u32;
            let mut sum = Vec2::ZERO;
            for child in children {
                if child != NONE {
                    let (c, s) = self.aggregate(child as usize, points);
                    count += c;
                    sum += s;
                }
            }
            (count, sum)
        };

        let cell = &mut self.cells[idx];
        cell.count = count;
        cell.center = if count > 0 {
            sum / count as f32
        } else {
            cell.min + Vec2::splat(cell.size * 0.5)
        };
        (count, sum)
    }

    /// Velocity change on `body` from every other body. Cells whose width is
    /// small against their distance (`w² / θ² < l²`) act as one point mass.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn accumulate(
        &self,
        points: &[Vec2],
        body: usize,
        strength: f32,
        alpha: f32,
        theta2: f32,
        distance_min2: f32,
        rng: &mut Lcg,
    ) -> Vec2 {
        let mut dv = Vec2::ZERO;
        if self.cells.is_empty() {
            return dv;
        }
        let p = points[body];

        let mut stack: SmallVec<[u32; 64]> = smallvec![0];
        while let Some(idx) = stack.pop() {
            let cell = &self.cells[idx as usize];
            if cell.count == 0 {
                continue;
            }

            let d = cell.center - p;
            let l = d.length_squared();
            if cell.size * cell.size / theta2 < l {
                dv += d * (strength * cell.count as f32 * alpha / soften(l, distance_min2));
                continue;
            }

            if !cell.leaf {
                stack.extend(cell.children.iter().copied().filter(|c| *c != NONE));
                continue;
            }

            for other in &cell.bodies {
                if *other as usize == body {
                    continue;
                }
                let mut d = points[*other as usize] - p;
                let mut l = d.length_squared();
                if d.x == 0.0 {
                    d.x = rng.jiggle();
                    l += d.x * d.x;
                }
                if d.y == 0.0 {
                    d.y = rng.jiggle();
                    l += d.y * d.y;
                }
                dv += d * (strength * alpha / soften(l, distance_min2));
            }
        }
        dv
    }
}

fn soften(l: f32, distance_min2: f32) -> f32 {
    if l < distance_min2 {
        (distance_min2 * l).sqrt()
    } else {
        l
    }
}
