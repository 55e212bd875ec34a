use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};

use crate::app::resources::ViewerState;
use crate::ui::actions::{apply, UiAction};

pub fn handle_shortcuts(mut contexts: EguiContexts, mut st: ResMut<ViewerState>) {
    let ctx = contexts.ctx_mut();
    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        st.ui.notice = None;
        st.ui.hovered = None;
        apply(&mut st, UiAction::Clear);
    }

    if ctx.wants_keyboard_input() {
        return;
    }

    if ctx.input(|i| i.key_pressed(egui::Key::E)) {
        let on = !st.ui.show_edges;
        apply(&mut st, UiAction::ShowEdges(on));
    }
    if ctx.input(|i| i.key_pressed(egui::Key::P)) {
        let on = !st.ui.show_projection;
        apply(&mut st, UiAction::ShowProjection(on));
    }
}
