use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};
use driftnet_core::projection::{LinearScale, PlotArea, ProjectedPoint};
use driftnet_core::style::Rgb;
use driftnet_core::{ProjectionRender, Vec2};

use crate::app::resources::ViewerState;
use crate::ui::actions::{apply, UiAction};
use crate::ui::egui_color_alpha;
use crate::ui::tooltips::render_tooltip;

const TICK_COUNT: usize = 5;
const TICK_LEN: f32 = 4.0;
const HOVER_SLACK: f32 = 2.0;

/// Label for a tick value with just enough decimals for its step.
pub fn tick_label(value: f32, step: f32) -> String {
    let decimals = if step > 0.0 && step.is_finite() {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };
    let label = format!("{value:.decimals$}");
    // avoid "-0" and "-0.0"
    if label.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        label.trim_start_matches('-').to_string()
    } else {
        label
    }
}

fn step_of(ticks: &[f32]) -> f32 {
    match ticks {
        [a, b, ..] => b - a,
        _ => 1.0,
    }
}

pub fn projection_window(mut contexts: EguiContexts, mut st: ResMut<ViewerState>) {
    if !st.ui.show_projection {
        return;
    }
    let Some(ex) = st.explorer.as_ref() else {
        return;
    };
    let ctx = contexts.ctx_mut();
    let area = ex.projection().area();
    let mut clicked = None;

    egui::Window::new("Projection")
        .resizable(false)
        .default_pos(egui::pos2(ctx.screen_rect().max.x - area.width - 24.0, 24.0))
        .show(ctx, |ui| match ex.projection().render() {
            ProjectionRender::Disabled => {
                ui.label("Projection data unavailable");
            }
            ProjectionRender::Placeholder(msg) => {
                ui.allocate_ui(egui::vec2(area.width, area.height), |ui| {
                    ui.centered_and_justified(|ui| ui.label(msg));
                });
            }
            ProjectionRender::Plot {
                x_scale,
                y_scale,
                points,
            } => {
                let (response, painter) = ui.allocate_painter(
                    egui::vec2(area.width, area.height),
                    egui::Sense::click(),
                );
                let origin = response.rect.min;
                draw_axes(&painter, origin, &area, &x_scale, &y_scale);
                for p in points {
                    draw_point(&painter, origin, p);
                }

                if let Some(hover) = response.hover_pos() {
                    let local = hover - origin;
                    let at = Vec2::new(local.x, local.y);
                    let summary = ex
                        .projection()
                        .hit_test(at, HOVER_SLACK)
                        .and_then(|ix| ex.hover(ix));
                    if let Some(summary) = summary {
                        render_tooltip(
                            ui.ctx(),
                            "hover_point",
                            hover + egui::vec2(12.0, 12.0),
                            summary.lines(),
                        );
                    }
                }
                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        let local = pos - origin;
                        clicked = Some(Vec2::new(local.x, local.y));
                    }
                }
            }
        });

    if let Some(p) = clicked {
        apply(&mut st, UiAction::ClickProjection(p));
    }
}

fn draw_axes(
    painter: &egui::Painter,
    origin: egui::Pos2,
    area: &PlotArea,
    x_scale: &LinearScale,
    y_scale: &LinearScale,
) {
    let stroke = egui::Stroke::new(1.0, egui::Color32::GRAY);
    let text = egui::Color32::LIGHT_GRAY;
    let font = egui::FontId::proportional(10.0);
    let bottom = area.height - area.margin_bottom;
    let left = area.margin_left;
    let at = |x: f32, y: f32| origin + egui::vec2(x, y);

    painter.line_segment(
        [at(left, bottom), at(area.width - area.margin_right, bottom)],
        stroke,
    );
    painter.line_segment([at(left, area.margin_top), at(left, bottom)], stroke);

    let ticks = x_scale.ticks(TICK_COUNT);
    let step = step_of(&ticks);
    for t in ticks {
        let x = x_scale.apply(t);
        painter.line_segment([at(x, bottom), at(x, bottom + TICK_LEN)], stroke);
        painter.text(
            at(x, bottom + TICK_LEN + 1.0),
            egui::Align2::CENTER_TOP,
            tick_label(t, step),
            font.clone(),
            text,
        );
    }
    let ticks = y_scale.ticks(TICK_COUNT);
    let step = step_of(&ticks);
    for t in ticks {
        let y = y_scale.apply(t);
        painter.line_segment([at(left - TICK_LEN, y), at(left, y)], stroke);
        painter.text(
            at(left - TICK_LEN - 2.0, y),
            egui::Align2::RIGHT_CENTER,
            tick_label(t, step),
            font.clone(),
            text,
        );
    }
}

fn draw_point(painter: &egui::Painter, origin: egui::Pos2, p: &ProjectedPoint) {
    let center = origin + egui::vec2(p.screen.x, p.screen.y);
    painter.circle_filled(
        center,
        p.style.radius,
        egui_color_alpha(p.style.fill, p.style.opacity),
    );
    let stroke = match p.style.outline {
        Some((outline, width)) => egui::Stroke::new(width, egui_color_alpha(outline, 1.0)),
        None => egui::Stroke::new(0.5, egui_color_alpha(Rgb::WHITE, p.style.opacity)),
    };
    painter.circle_stroke(center, p.style.radius, stroke);
}
