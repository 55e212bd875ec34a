pub mod camera;
pub mod markers;
pub mod picking;

use bevy::prelude::*;
use driftnet_core::style::Rgb;

pub use camera::{apply_view_target, setup_camera, zoom_with_wheel, MainCamera};
pub use markers::{draw_edges_and_strokes, sync_markers, NodeMarker};
pub use picking::pointer_input;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 8.0;

// Layout space grows downwards; world space grows upwards.
pub fn to_world(p: driftnet_core::Vec2) -> Vec2 {
    Vec2::new(p.x, -p.y)
}

pub fn to_layout(p: Vec2) -> driftnet_core::Vec2 {
    driftnet_core::Vec2::new(p.x, -p.y)
}

pub fn color(rgb: Rgb, opacity: f32) -> Color {
    let [r, g, b] = rgb.to_f32();
    Color::srgba(r, g, b, opacity)
}

/// Camera translation that keeps `anchor` (world) under the cursor when the
/// zoom factor goes from `from` to `to`. Zoom is the inverse of the
/// orthographic scale.
pub fn zoom_about(camera: Vec2, anchor: Vec2, from: f32, to: f32) -> Vec2 {
    anchor + (camera - anchor) * (from / to)
}

pub fn clamp_zoom(k: f32) -> f32 {
    k.clamp(MIN_ZOOM, MAX_ZOOM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_mapping_flips_y_and_inverts() {
        let p = driftnet_core::Vec2::new(120.0, 45.0);
        assert_eq!(to_world(p), Vec2::new(120.0, -45.0));
        assert_eq!(to_layout(to_world(p)), p);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let camera = Vec2::new(100.0, 50.0);
        let anchor = Vec2::new(140.0, 90.0);
        let moved = zoom_about(camera, anchor, 1.0, 2.0);
        // anchor's offset from the camera halves when zoom doubles
        assert_eq!(anchor - moved, (anchor - camera) * 0.5);
        assert_eq!(zoom_about(camera, anchor, 1.5, 1.5), camera);
    }

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(clamp_zoom(0.01), MIN_ZOOM);
        assert_eq!(clamp_zoom(20.0), MAX_ZOOM);
        assert_eq!(clamp_zoom(1.5), 1.5);
    }

    #[test]
    fn color_carries_opacity() {
        let c = color(Rgb::WHITE, 0.25).to_srgba();
        assert_eq!((c.red, c.green, c.blue, c.alpha), (1.0, 1.0, 1.0, 0.25));
    }
}
