use bevy_egui::{egui, EguiContexts};

pub fn apply_console_theme(mut contexts: EguiContexts) {
    let ctx = contexts.ctx_mut();
    let mut style = (*ctx.style()).clone();

    // Dark, slightly blue console palette.
    let panel = egui::Color32::from_rgb(28, 32, 40);
    let inactive = egui::Color32::from_rgb(44, 50, 62);
    let hover = egui::Color32::from_rgb(62, 74, 94);
    let active = egui::Color32::from_rgb(90, 150, 210);

    style.visuals.widgets.noninteractive.bg_fill = panel;
    style.visuals.widgets.inactive.bg_fill = inactive;
    style.visuals.widgets.hovered.bg_fill = hover;
    style.visuals.widgets.active.bg_fill = active;
    style.visuals.widgets.inactive.weak_bg_fill = inactive;
    style.visuals.widgets.hovered.weak_bg_fill = hover;
    style.visuals.widgets.active.weak_bg_fill = active;

    style.visuals.window_fill = panel;
    style.visuals.panel_fill = panel;
    style.visuals.extreme_bg_color = egui::Color32::from_rgb(22, 25, 32);
    style.visuals.faint_bg_color = egui::Color32::from_rgb(34, 38, 48);

    style.visuals.selection.bg_fill = active;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, active);

    let window_rounding = egui::CornerRadius::same(6);
    let widget_rounding = egui::CornerRadius::same(4);
    style.visuals.window_corner_radius = window_rounding;
    style.visuals.widgets.noninteractive.corner_radius = widget_rounding;
    style.visuals.widgets.inactive.corner_radius = widget_rounding;
    style.visuals.widgets.hovered.corner_radius = widget_rounding;
    style.visuals.widgets.active.corner_radius = widget_rounding;

    ctx.set_style(style);
}
