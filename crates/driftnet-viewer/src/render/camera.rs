use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::app::resources::ViewerState;
use crate::render::{clamp_zoom, to_world, zoom_about};

#[derive(Component)]
pub struct MainCamera;

const LINE_STEP: f32 = 0.1;
const PIXEL_STEP: f32 = 0.002;

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2dBundle::default(), MainCamera));
}

/// Jumps the camera to a pending recenter or initial view.
pub fn apply_view_target(
    mut st: ResMut<ViewerState>,
    mut cam_q: Query<(&mut Transform, &mut OrthographicProjection), With<MainCamera>>,
) {
    let Some(target) = st.ui.view_target.take() else {
        return;
    };
    let Ok((mut tf, mut projection)) = cam_q.get_single_mut() else {
        return;
    };
    let center = to_world(target.center);
    tf.translation.x = center.x;
    tf.translation.y = center.y;
    projection.scale = 1.0 / clamp_zoom(target.zoom);
}

pub fn zoom_with_wheel(
    mut wheel: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
    windows: Query<&Window>,
    mut cam_q: Query<
        (
            &Camera,
            &GlobalTransform,
            &mut Transform,
            &mut OrthographicProjection,
        ),
        With<MainCamera>,
    >,
) {
    let mut steps = 0.0;
    for ev in wheel.read() {
        steps += match ev.unit {
            MouseScrollUnit::Line => ev.y * LINE_STEP,
            MouseScrollUnit::Pixel => ev.y * PIXEL_STEP,
        };
    }
    if steps == 0.0 || contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, cam_gtf, mut tf, mut projection)) = cam_q.get_single_mut() else {
        return;
    };

    let from = 1.0 / projection.scale;
    let to = clamp_zoom(from * (1.0 + steps));
    if to == from {
        return;
    }

    let anchor = window
        .cursor_position()
        .and_then(|c| camera.viewport_to_world_2d(cam_gtf, c));
    if let Some(anchor) = anchor {
        let moved = zoom_about(tf.translation.truncate(), anchor, from, to);
        tf.translation.x = moved.x;
        tf.translation.y = moved.y;
    }
    projection.scale = 1.0 / to;
}
