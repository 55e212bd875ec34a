use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use driftnet_core::Explorer;

use crate::app::resources::{LoadRx, LoadStatus, ViewTarget, ViewerState};
use crate::loader::{spawn_loader, LoadEvent};
use crate::util::config::ViewerConfig;

pub mod resources;

const INITIAL_ZOOM: f32 = 0.5;

pub struct DriftnetViewerPlugin {
    pub cfg: ViewerConfig,
}

impl Plugin for DriftnetViewerPlugin {
    fn build(&self, app: &mut App) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        spawn_loader(
            self.cfg.graph_path.clone(),
            self.cfg.projection_path.clone(),
            tx,
        );

        app.insert_resource(LoadRx(rx))
            .insert_resource(ViewerState::new(self.cfg.clone()))
            .add_systems(Startup, crate::render::setup_camera)
            .add_systems(
                Update,
                (
                    pump_loader,
                    crate::ui::handle_shortcuts,
                    crate::ui::ui_panel,
                    crate::ui::projection_window,
                    crate::render::pointer_input,
                    crate::render::zoom_with_wheel,
                    resize_layout,
                    step_layout,
                    apply_view_events,
                    crate::render::apply_view_target,
                    crate::render::sync_markers,
                    crate::render::draw_edges_and_strokes,
                    crate::ui::hover_tooltip,
                )
                    .chain(),
            );
    }
}

fn pump_loader(
    mut st: ResMut<ViewerState>,
    rx: Res<LoadRx>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(event) = rx.0.try_recv() else {
        return;
    };
    match event {
        LoadEvent::Loaded { store, projection } => {
            let (width, height) = windows
                .get_single()
                .map(|w| (w.width(), w.height()))
                .unwrap_or((1280.0, 720.0));
            let explorer = Explorer::new(
                store,
                projection,
                st.cfg.seeds.clone(),
                st.cfg.engine(),
                width,
                height,
            );
            st.ui.view_target = Some(ViewTarget {
                center: explorer.layout().center(),
                zoom: INITIAL_ZOOM,
            });
            st.ui.rebuild_markers = true;
            st.frame = explorer.frame();
            st.explorer = Some(explorer);
            st.status = LoadStatus::Ready;
        }
        LoadEvent::Failed(msg) => {
            st.status = LoadStatus::Failed(msg);
        }
    }
}

fn resize_layout(mut resized: EventReader<WindowResized>, mut st: ResMut<ViewerState>) {
    let Some(last) = resized.read().last() else {
        return;
    };
    if let Some(ex) = st.explorer.as_mut() {
        ex.resize(last.width, last.height);
    }
}

fn step_layout(time: Res<Time>, mut st: ResMut<ViewerState>) {
    let st = &mut *st;
    let Some(ex) = st.explorer.as_mut() else {
        return;
    };
    ex.advance(time.delta_seconds());
    st.frame = ex.frame();
}

fn apply_view_events(mut st: ResMut<ViewerState>) {
    crate::ui::drain_view_events(&mut st);
}
