pub mod actions;
pub mod panel;
pub mod projection;
pub mod shortcuts;
pub mod tooltips;

use bevy_egui::egui;
use driftnet_core::style::Rgb;

pub use actions::{apply, drain_view_events, UiAction};
pub use panel::ui_panel;
pub use projection::projection_window;
pub use shortcuts::handle_shortcuts;
pub use tooltips::hover_tooltip;

pub const PANEL_W: f32 = 300.0;

pub fn egui_color(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

pub fn egui_color_alpha(rgb: Rgb, opacity: f32) -> egui::Color32 {
    let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(rgb.0, rgb.1, rgb.2, a)
}
