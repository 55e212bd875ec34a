use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::app::resources::ViewerState;

const OFFSET: egui::Vec2 = egui::vec2(14.0, 14.0);

pub fn render_tooltip(
    ctx: &egui::Context,
    id: &str,
    pos: egui::Pos2,
    lines: impl IntoIterator<Item = String>,
) {
    egui::Area::new(egui::Id::new(id))
        .order(egui::Order::Tooltip)
        .fixed_pos(pos)
        .interactable(false)
        .show(ctx, |ui| {
            ui.group(|ui| {
                for line in lines {
                    ui.label(line);
                }
            });
        });
}

/// Summary box next to the pointer for the marker under it.
pub fn hover_tooltip(mut contexts: EguiContexts, st: Res<ViewerState>) {
    let (Some(ex), Some(ix)) = (st.explorer.as_ref(), st.ui.hovered) else {
        return;
    };
    if st.ui.gesture.is_some() {
        return;
    }
    let ctx = contexts.ctx_mut();
    let Some(pointer) = ctx.input(|i| i.pointer.hover_pos()) else {
        return;
    };
    let Some(summary) = ex.hover(ix) else {
        return;
    };
    render_tooltip(ctx, "hover_node", pointer + OFFSET, summary.lines());
}
