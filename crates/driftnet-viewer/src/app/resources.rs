use bevy::math::Vec2;
use bevy::prelude::Resource;
use crossbeam_channel::Receiver;
use driftnet_core::{EntityIx, Explorer, RenderFrame};

use crate::loader::LoadEvent;
use crate::util::config::ViewerConfig;

#[derive(Resource)]
pub struct LoadRx(pub Receiver<LoadEvent>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Pressed on a marker; becomes a drag once the pointer travels.
    Node {
        entity: EntityIx,
        press: Vec2,
        moved: bool,
    },
    Pan {
        last: Vec2,
    },
}

/// Camera move requested by the engine or the loader, in layout space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTarget {
    pub center: driftnet_core::Vec2,
    pub zoom: f32,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub search_term: String,
    pub notice: Option<String>,
    pub hovered: Option<EntityIx>,
    pub gesture: Option<Gesture>,
    pub view_target: Option<ViewTarget>,
    pub rebuild_markers: bool,
    pub show_edges: bool,
    pub show_projection: bool,
}

impl UiState {
    fn from_config(cfg: &ViewerConfig) -> Self {
        Self {
            search_term: String::new(),
            notice: None,
            hovered: None,
            gesture: None,
            view_target: None,
            rebuild_markers: true,
            show_edges: cfg.show_edges,
            show_projection: cfg.show_projection,
        }
    }
}

#[derive(Resource)]
pub struct ViewerState {
    pub cfg: ViewerConfig,
    pub status: LoadStatus,
    pub explorer: Option<Explorer>,
    /// Positions and styles for the current frame.
    pub frame: RenderFrame,
    pub ui: UiState,
}

impl ViewerState {
    pub fn new(cfg: ViewerConfig) -> Self {
        let ui = UiState::from_config(&cfg);
        Self {
            cfg,
            status: LoadStatus::Loading,
            explorer: None,
            frame: RenderFrame::default(),
            ui,
        }
    }
}
