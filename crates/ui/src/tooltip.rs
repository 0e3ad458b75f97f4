//! Hover tooltips for tap markers.
//!
//! After hovering the same marker for 500ms, a tooltip shows the tap's
//! name, status, and report age. Tap names are operator-supplied free
//! text and are sanitized before display. Hidden during drag operations.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use floorplan::taps::{TapId, TapRoster};
use rendering::camera::CameraDrag;
use rendering::drag::DragState;
use rendering::markers::{TapMarker, MARKER_SIZE};

/// How long (seconds) the cursor must hover the same marker before the
/// tooltip appears.
const HOVER_DELAY: f32 = 0.5;

/// Pixel offset from the cursor to the tooltip.
const TOOLTIP_OFFSET: f32 = 20.0;

/// Longest name the tooltip will render before truncating.
const MAX_NAME_CHARS: usize = 64;

#[derive(Resource, Default)]
pub struct TapHoverState {
    pub tap: Option<TapId>,
    pub elapsed: f32,
}

/// Strip markup and control characters from an operator-supplied label.
/// The result is plain display text, never interpreted.
pub fn sanitize_label(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_control() && *c != '<' && *c != '>')
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return "(unnamed)".to_string();
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        let head: String = trimmed.chars().take(MAX_NAME_CHARS).collect();
        format!("{head}…")
    } else {
        trimmed.to_string()
    }
}

/// Human-readable report age, for the tooltip's "last report" line.
pub fn humanize_report_age(secs: Option<f64>) -> String {
    let Some(secs) = secs else {
        return "never".to_string();
    };
    if secs < 60.0 {
        "just now".to_string()
    } else if secs < 3600.0 {
        format!("{}m ago", (secs / 60.0) as u64)
    } else if secs < 86_400.0 {
        format!("{}h ago", (secs / 3600.0) as u64)
    } else {
        format!("{}d ago", (secs / 86_400.0) as u64)
    }
}

#[allow(clippy::too_many_arguments)]
pub fn tap_tooltip_ui(
    mut contexts: EguiContexts,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    markers: Query<(&TapMarker, &Transform)>,
    roster: Res<TapRoster>,
    camera_drag: Res<CameraDrag>,
    marker_drag: Res<DragState>,
    time: Res<Time>,
    mut hover: ResMut<TapHoverState>,
) {
    if camera_drag.dragging || marker_drag.active.is_some() {
        hover.tap = None;
        hover.elapsed = 0.0;
        return;
    }

    let hovered = cursor_world_pos(&windows, &cameras).and_then(|cursor| {
        let half = MARKER_SIZE / 2.0;
        markers.iter().find_map(|(marker, transform)| {
            let pos = transform.translation;
            let hit = (cursor.x - pos.x).abs() <= half && (cursor.y - pos.y).abs() <= half;
            hit.then_some(marker.tap)
        })
    });

    let Some(tap_id) = hovered else {
        hover.tap = None;
        hover.elapsed = 0.0;
        return;
    };

    // Reset the timer when the hovered marker changes.
    if hover.tap != Some(tap_id) {
        hover.tap = Some(tap_id);
        hover.elapsed = 0.0;
    }
    hover.elapsed += time.delta_secs();
    if hover.elapsed < HOVER_DELAY {
        return;
    }

    let Some(tap) = roster.get(tap_id) else {
        return;
    };

    let ctx = contexts.ctx_mut();
    let Some(pointer_pos) = ctx.pointer_hover_pos() else {
        return;
    };
    let label_pos = pointer_pos + egui::vec2(TOOLTIP_OFFSET, TOOLTIP_OFFSET);

    let (status, status_color) = if tap.active {
        ("Online", egui::Color32::from_rgb(80, 200, 80))
    } else {
        ("Offline", egui::Color32::from_rgb(220, 60, 50))
    };

    egui::Area::new(egui::Id::new("tap_hover_tooltip"))
        .fixed_pos(egui::pos2(label_pos.x, label_pos.y))
        .interactable(false)
        .order(egui::Order::Tooltip)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .fill(egui::Color32::from_rgba_premultiplied(30, 30, 30, 220))
                .show(ui, |ui| {
                    ui.set_max_width(220.0);

                    ui.label(
                        egui::RichText::new(sanitize_label(&tap.name))
                            .strong()
                            .size(13.0)
                            .color(egui::Color32::WHITE),
                    );
                    ui.separator();

                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new("Status:")
                                .size(11.0)
                                .color(egui::Color32::LIGHT_GRAY),
                        );
                        ui.label(
                            egui::RichText::new(status).size(11.0).color(status_color),
                        );
                    });
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new("Last report:")
                                .size(11.0)
                                .color(egui::Color32::LIGHT_GRAY),
                        );
                        ui.label(
                            egui::RichText::new(humanize_report_age(tap.last_report_secs))
                                .size(11.0)
                                .color(egui::Color32::WHITE),
                        );
                    });
                });
        });
}

fn cursor_world_pos(
    windows: &Query<&Window>,
    cameras: &Query<(&Camera, &GlobalTransform), With<Camera2d>>,
) -> Option<Vec2> {
    let window = windows.get_single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, camera_transform) = cameras.get_single().ok()?;
    camera.viewport_to_world_2d(camera_transform, cursor).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_stripped_from_names() {
        assert_eq!(sanitize_label("roof <b>east</b>"), "roof beast/b");
        assert_eq!(sanitize_label("lab\u{0007}\u{001b}tap"), "labtap");
    }

    #[test]
    fn blank_names_get_a_placeholder() {
        assert_eq!(sanitize_label("   "), "(unnamed)");
        assert_eq!(sanitize_label("\u{0000}\u{0001}"), "(unnamed)");
    }

    #[test]
    fn long_names_are_truncated() {
        let long = "x".repeat(200);
        let out = sanitize_label(&long);
        assert_eq!(out.chars().count(), MAX_NAME_CHARS + 1);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn report_ages_humanize() {
        assert_eq!(humanize_report_age(None), "never");
        assert_eq!(humanize_report_age(Some(12.0)), "just now");
        assert_eq!(humanize_report_age(Some(150.0)), "2m ago");
        assert_eq!(humanize_report_age(Some(7200.0)), "2h ago");
        assert_eq!(humanize_report_age(Some(200_000.0)), "2d ago");
    }
}
