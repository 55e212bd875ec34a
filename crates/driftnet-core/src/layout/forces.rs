use glam::Vec2;
use smallvec::SmallVec;
use std::collections::HashMap;

use super::quadtree::QuadTree;
use super::{Lcg, SimLink, SimNode};

/// Springs pull linked entities toward `distance`. Velocities of both
/// endpoints are read predicted one step ahead.
pub(super) fn links(nodes: &mut [SimNode], links: &[SimLink], distance: f32, alpha: f32, rng: &mut Lcg) {
    for link in links {
        let (s, t) = (link.source, link.target);
        let mut d = nodes[t].position + nodes[t].velocity - nodes[s].position - nodes[s].velocity;
        if d.x == 0.0 {
            d.x = rng.jiggle();
        }
        if d.y == 0.0 {
            d.y = rng.jiggle();
        }
        let l = d.length();
        let d = d * ((l - distance) / l * alpha * link.strength);
        nodes[t].velocity -= d * link.bias;
        nodes[s].velocity += d * (1.0 - link.bias);
    }
}

pub(super) fn charge(
    nodes: &mut [SimNode],
    strength: f32,
    theta: f32,
    distance_min: f32,
    alpha: f32,
    rng: &mut Lcg,
) {
    if nodes.len() < 2 || strength == 0.0 {
        return;
    }
    let points: Vec<Vec2> = nodes.iter().map(|n| n.position).collect();
    let tree = QuadTree::build(&points);
    let theta2 = theta * theta;
    let distance_min2 = distance_min * distance_min;
    for (i, node) in nodes.iter_mut().enumerate() {
        node.velocity += tree.accumulate(&points, i, strength, alpha, theta2, distance_min2, rng);
    }
}

pub(super) fn center(nodes: &mut [SimNode], target: Vec2) {
    if nodes.is_empty() {
        return;
    }
    let mean = nodes.iter().fold(Vec2::ZERO, |acc, n| acc + n.position) / nodes.len() as f32;
    let shift = mean - target;
    for node in nodes {
        node.position -= shift;
    }
}

/// Pairwise overlap resolution on predicted positions. Buckets are two radii
/// wide so only the 3x3 neighborhood of a bucket can collide.
pub(super) fn collide(nodes: &mut [SimNode], radius: f32, strength: f32, rng: &mut Lcg) {
    if radius <= 0.0 || nodes.len() < 2 {
        return;
    }
    let reach = radius * 2.0;
    let bucket = |p: Vec2| ((p.x / reach).floor() as i32, (p.y / reach).floor() as i32);

    let mut grid: HashMap<(i32, i32), SmallVec<[usize; 4]>> = HashMap::new();
    for (i, n) in nodes.iter().enumerate() {
        grid.entry(bucket(n.position + n.velocity)).or_default().push(i);
    }

    for i in 0..nodes.len() {
        let xi = nodes[i].position + nodes[i].velocity;
        let (bx, by) = bucket(xi);
        for gx in bx - 1..=bx + 1 {
            for gy in by - 1..=by + 1 {
                let Some(cell) = grid.get(&(gx, gy)) else {
                    continue;
                };
                for &j in cell {
                    if j <= i {
                        continue;
                    }
                    let mut d = xi - nodes[j].position - nodes[j].velocity;
                    let mut l = d.length_squared();
                    if l >= reach * reach {
                        continue;
                    }
                    if d.x == 0.0 {
                        d.x = rng.jiggle();
                        l += d.x * d.x;
                    }
                    if d.y == 0.0 {
                        d.y = rng.jiggle();
                        l += d.y * d.y;
                    }
                    let l = l.sqrt();
                    let push = d * ((reach - l) / l * strength * 0.5);
                    nodes[i].velocity += push;
                    nodes[j].velocity -= push;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntityIx;

    fn node(i: usize, x: f32, y: f32) -> SimNode {
        SimNode {
            entity: EntityIx(i),
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            pinned: None,
        }
    }

    #[test]
    fn charge_pushes_pair_apart_symmetrically() {
        let mut nodes = vec![node(0, 0.0, 0.0), node(1, 10.0, 0.0)];
        charge(&mut nodes, -100.0, 0.9, 1.0, 1.0, &mut Lcg::default());
        assert!(nodes[0].velocity.x < 0.0);
        assert!(nodes[1].velocity.x > 0.0);
        assert!((nodes[0].velocity + nodes[1].velocity).length() < 1e-4);
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let mut nodes = vec![node(0, 0.0, 0.0), node(1, 300.0, 0.0)];
        let link = SimLink {
            source: 0,
            target: 1,
            strength: 1.0,
            bias: 0.5,
        };
        links(&mut nodes, &[link], 100.0, 1.0, &mut Lcg::default());
        assert!(nodes[0].velocity.x > 0.0);
        assert!(nodes[1].velocity.x < 0.0);
        assert!((nodes[0].velocity.x + nodes[1].velocity.x).abs() < 1e-3);
    }

    #[test]
    fn center_moves_mean_onto_target() {
        let mut nodes = vec![node(0, 0.0, 0.0), node(1, 10.0, 20.0), node(2, 50.0, -5.0)];
        let target = Vec2::new(400.0, 300.0);
        center(&mut nodes, target);
        let mean = nodes.iter().fold(Vec2::ZERO, |a, n| a + n.position) / 3.0;
        assert!((mean - target).length() < 1e-3);
    }

    #[test]
    fn overlapping_markers_separate() {
        let mut nodes = vec![node(0, 100.0, 100.0), node(1, 104.0, 100.0), node(2, 500.0, 500.0)];
        collide(&mut nodes, 10.0, 1.0, &mut Lcg::default());
        assert!(nodes[0].velocity.x < 0.0);
        assert!(nodes[1].velocity.x > 0.0);
        assert_eq!(nodes[2].velocity, Vec2::ZERO);
    }

    #[test]
    fn coincident_markers_get_jiggled_apart() {
        let mut nodes = vec![node(0, 7.0, 7.0), node(1, 7.0, 7.0)];
        collide(&mut nodes, 10.0, 1.0, &mut Lcg::default());
        assert!(nodes[0].velocity.is_finite());
        assert!(nodes[0].velocity.length() > 0.0);
    }
}
