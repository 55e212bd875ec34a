use bevy::prelude::*;
use bevy_egui::EguiContexts;
use driftnet_core::{DragPhase, Explorer};

use crate::app::resources::{Gesture, ViewerState};
use crate::render::{to_layout, MainCamera};

/// Pointer travel (logical pixels) below which a press on a marker is a click.
const CLICK_TOLERANCE: f32 = 3.0;
/// Extra pick radius around a marker, in layout units.
const PICK_SLACK: f32 = 2.0;

pub fn pointer_input(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut cam_q: Query<
        (
            &Camera,
            &GlobalTransform,
            &mut Transform,
            &OrthographicProjection,
        ),
        With<MainCamera>,
    >,
    mut contexts: EguiContexts,
    mut st: ResMut<ViewerState>,
) {
    let st = &mut *st;
    let Some(ex) = st.explorer.as_mut() else {
        return;
    };
    // Release is honoured even when the cursor has left the window.
    let released = buttons.just_released(MouseButton::Left);
    if released {
        finish_gesture(ex, st.ui.gesture.take());
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, cam_gtf, mut cam_tf, projection)) = cam_q.get_single_mut() else {
        return;
    };

    let Some(cursor) = window.cursor_position() else {
        st.ui.hovered = None;
        return;
    };
    if st.ui.gesture.is_none() && contexts.ctx_mut().wants_pointer_input() {
        st.ui.hovered = None;
        return;
    }
    let Some(world) = camera.viewport_to_world_2d(cam_gtf, cursor) else {
        return;
    };
    let at = to_layout(world);

    if st.ui.gesture.is_none() {
        st.ui.hovered = ex.pick(at, PICK_SLACK);
    }

    if buttons.just_pressed(MouseButton::Left) && !released {
        st.ui.gesture = Some(match st.ui.hovered {
            Some(entity) => Gesture::Node {
                entity,
                press: cursor,
                moved: false,
            },
            None => Gesture::Pan { last: cursor },
        });
    } else if buttons.pressed(MouseButton::Left) {
        match st.ui.gesture.as_mut() {
            Some(Gesture::Node {
                entity,
                press,
                moved,
            }) => {
                if !*moved && press.distance(cursor) >= CLICK_TOLERANCE {
                    *moved = true;
                    ex.drag_entity(*entity, DragPhase::Start);
                }
                if *moved {
                    ex.drag_entity(*entity, DragPhase::Move(at));
                }
            }
            Some(Gesture::Pan { last }) => {
                let delta = cursor - *last;
                cam_tf.translation.x -= delta.x * projection.scale;
                cam_tf.translation.y += delta.y * projection.scale;
                *last = cursor;
            }
            None => {}
        }
    }
}

/// Ends a gesture on button release: a dragged marker is unpinned, a
/// marker that never travelled is selected, a pan just stops.
pub(crate) fn finish_gesture(ex: &mut Explorer, gesture: Option<Gesture>) {
    if let Some(Gesture::Node { entity, moved, .. }) = gesture {
        if moved {
            ex.drag_entity(entity, DragPhase::End);
        } else {
            ex.select_entity(entity);
        }
    }
}
