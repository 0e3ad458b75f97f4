//! The floor-plan control panel.
//!
//! View mode: refresh, marker visibility toggles, heatmap intensity.
//! Edit mode: save (gated on unsaved changes), placement of unpositioned
//! taps, plan deletion, and the way back to view mode. Leaving edit mode
//! or deleting the plan routes through the confirmation dialog whenever
//! staged positions would be lost.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use floorplan::edit_session::{EditSession, SaveRequested};
use floorplan::plan::ActivePlan;
use floorplan::plan_mode::PlanMode;
use floorplan::taps::{PlaceTapRequested, TapRoster};
use floorplan::telemetry::RefreshRequested;
use rendering::heatmap::HeatmapSettings;
use rendering::markers::MarkerVisibility;

use crate::confirm_dialog::{ConfirmAction, PendingConfirmAction};

#[allow(clippy::too_many_arguments)]
pub fn controls_ui(
    mut contexts: EguiContexts,
    plan: Res<ActivePlan>,
    roster: Res<TapRoster>,
    session: Res<EditSession>,
    mode: Res<State<PlanMode>>,
    mut next_mode: ResMut<NextState<PlanMode>>,
    mut visibility: ResMut<MarkerVisibility>,
    mut heatmap: ResMut<HeatmapSettings>,
    mut pending: ResMut<PendingConfirmAction>,
    mut refreshes: EventWriter<RefreshRequested>,
    mut saves: EventWriter<SaveRequested>,
    mut placements: EventWriter<PlaceTapRequested>,
) {
    let ctx = contexts.ctx_mut();

    if plan.renderable().is_none() {
        egui::Window::new("Floor Plan")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.label("No floor plan has been uploaded for this location.");
                    ui.add_space(8.0);
                });
            });
        return;
    }

    egui::SidePanel::left("floorplan_controls")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.add_space(6.0);
            ui.heading("Floor Plan");
            ui.separator();

            match *mode.get() {
                PlanMode::View => {
                    // Widgets write through bypassed references; the
                    // resources are only flagged changed when a widget
                    // actually changed, so downstream rebuilds don't fire
                    // every frame the panel is drawn.
                    let (vis_changed, heat_changed) = view_controls(
                        ui,
                        visibility.bypass_change_detection(),
                        heatmap.bypass_change_detection(),
                        &mut refreshes,
                        &mut next_mode,
                    );
                    if vis_changed {
                        visibility.set_changed();
                    }
                    if heat_changed {
                        heatmap.set_changed();
                    }
                }
                PlanMode::Edit => {
                    edit_controls(
                        ui,
                        &roster,
                        &session,
                        &mut next_mode,
                        &mut pending,
                        &mut saves,
                        &mut placements,
                    );
                }
            }
        });
}

/// Returns whether the visibility toggles and the heatmap settings were
/// edited, so the caller can flag the resources changed.
fn view_controls(
    ui: &mut egui::Ui,
    visibility: &mut MarkerVisibility,
    heatmap: &mut HeatmapSettings,
    refreshes: &mut EventWriter<RefreshRequested>,
    next_mode: &mut NextState<PlanMode>,
) -> (bool, bool) {
    if ui.button("Refresh").clicked() {
        refreshes.send(RefreshRequested);
    }
    ui.add_space(8.0);

    let mut vis_changed = ui.checkbox(&mut visibility.taps, "Show taps").changed();
    vis_changed |= ui
        .checkbox(&mut visibility.strength_indicators, "Show signal strengths")
        .changed();
    ui.add_space(8.0);

    ui.label("Heatmap intensity");
    let heat_changed = ui
        .add(
            egui::Slider::new(&mut heatmap.intensity, 0.0..=1.0)
                .step_by(0.1)
                .show_value(true),
        )
        .changed();
    ui.add_space(12.0);
    ui.separator();

    if ui.button("Edit positions").clicked() {
        next_mode.set(PlanMode::Edit);
    }

    (vis_changed, heat_changed)
}

#[allow(clippy::too_many_arguments)]
fn edit_controls(
    ui: &mut egui::Ui,
    roster: &TapRoster,
    session: &EditSession,
    next_mode: &mut NextState<PlanMode>,
    pending: &mut PendingConfirmAction,
    saves: &mut EventWriter<SaveRequested>,
    placements: &mut EventWriter<PlaceTapRequested>,
) {
    ui.label("Drag tap markers to position them.");
    ui.add_space(8.0);

    if session.is_dirty() {
        ui.label(format!(
            "{} unsaved position(s)",
            session.pending().len()
        ));
    } else {
        ui.label("No unsaved changes");
    }
    ui.add_space(4.0);

    if ui
        .add_enabled(session.is_dirty(), egui::Button::new("Save positions"))
        .clicked()
    {
        saves.send(SaveRequested);
    }
    ui.add_space(12.0);

    let unplaced: Vec<_> = roster
        .0
        .iter()
        .filter(|tap| tap.position.is_none())
        .collect();
    if !unplaced.is_empty() {
        ui.separator();
        ui.label("Unplaced taps");
        for tap in unplaced {
            ui.horizontal(|ui| {
                ui.label(crate::tooltip::sanitize_label(&tap.name));
                if ui.small_button("Place").clicked() {
                    placements.send(PlaceTapRequested { tap: tap.clone() });
                }
            });
        }
        ui.add_space(12.0);
    }

    ui.separator();
    if ui.button("Done").clicked() {
        if session.is_dirty() {
            pending.0 = Some(ConfirmAction::LeaveEdit);
        } else {
            next_mode.set(PlanMode::View);
        }
    }
    ui.add_space(8.0);

    if ui.button("Delete floor plan").clicked() {
        pending.0 = Some(ConfirmAction::DeletePlan);
    }
}
