use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use driftnet_core::{EdgeSegment, EntityIx, NodeSprite};
use std::collections::HashMap;

use crate::app::resources::ViewerState;
use crate::render::{color, to_world};

#[derive(Component)]
pub struct NodeMarker {
    pub entity: EntityIx,
}

const BASE_Z: f32 = 1.0;
const RAISED_Z: f32 = 2.0;
const RING_STEP: f32 = 0.5;

fn marker_transform(node: &NodeSprite) -> Transform {
    let p = to_world(node.position);
    let z = if node.style.opacity < 1.0 { BASE_Z } else { RAISED_Z };
    Transform::from_xyz(p.x, p.y, z).with_scale(Vec3::splat(node.style.radius))
}

/// Keeps one filled disc per visible entity. The set of markers is rebuilt
/// when visibility changes; otherwise only positions and colors move.
pub fn sync_markers(
    mut commands: Commands,
    mut st: ResMut<ViewerState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(
        Entity,
        &NodeMarker,
        &mut Transform,
        &Handle<ColorMaterial>,
    )>,
) {
    if st.explorer.is_none() {
        return;
    }

    if st.ui.rebuild_markers {
        st.ui.rebuild_markers = false;
        for (e, _, _, material) in query.iter() {
            mats.remove(material);
            commands.entity(e).despawn_recursive();
        }

        let disc = Mesh2dHandle(meshes.add(Circle::new(1.0)));
        for node in st.frame.nodes.iter() {
            let material = mats.add(ColorMaterial::from(color(
                node.style.fill,
                node.style.opacity,
            )));
            commands.spawn((
                MaterialMesh2dBundle {
                    mesh: disc.clone(),
                    material,
                    transform: marker_transform(node),
                    ..default()
                },
                NodeMarker { entity: node.entity },
            ));
        }
        tracing::debug!(markers = st.frame.nodes.len(), "rebuilt node markers");
        return;
    }

    let by_entity: HashMap<EntityIx, &NodeSprite> =
        st.frame.nodes.iter().map(|n| (n.entity, n)).collect();
    for (_, marker, mut tf, material) in query.iter_mut() {
        let Some(node) = by_entity.get(&marker.entity) else {
            continue;
        };
        *tf = marker_transform(node);
        let wanted = color(node.style.fill, node.style.opacity);
        if let Some(mat) = mats.get_mut(material) {
            if mat.color != wanted {
                mat.color = wanted;
            }
        }
    }
}

fn draw_edge(gizmos: &mut Gizmos, edge: &EdgeSegment) {
    let from = to_world(edge.from);
    let to = to_world(edge.to);
    let c = color(edge.style.color, edge.style.opacity);
    let lines = edge.style.width.max(1.0).round() as usize;
    let normal = (to - from).perp().normalize_or_zero() * RING_STEP;
    let first = -(lines as f32 - 1.0) / 2.0;
    for i in 0..lines {
        let offset = normal * (first + i as f32);
        gizmos.line_2d(from + offset, to + offset, c);
    }
}

pub fn draw_edges_and_strokes(st: Res<ViewerState>, mut gizmos: Gizmos) {
    if st.explorer.is_none() {
        return;
    }
    if st.ui.show_edges {
        for edge in st.frame.edges.iter() {
            draw_edge(&mut gizmos, edge);
        }
    }
    for node in st.frame.nodes.iter() {
        let center = to_world(node.position);
        let c = color(node.style.stroke, node.style.opacity);
        let rings = (node.style.stroke_width / RING_STEP).ceil().max(1.0) as usize;
        for i in 0..rings {
            gizmos.circle_2d(center, node.style.radius + i as f32 * RING_STEP, c);
        }
    }
}
