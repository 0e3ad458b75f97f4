//! Confirmation dialogs for actions that would discard unsaved positions
//! or destroy the plan.
//!
//! Other systems never fire the destructive event directly: they set
//! [`PendingConfirmAction`] and the dialog system fires the event on
//! confirmation. Window-close requests are intercepted here as well — the
//! app quits immediately unless the edit-mode guard is installed and the
//! session is dirty.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::window::WindowCloseRequested;
use bevy_egui::{egui, EguiContexts};

use floorplan::edit_session::{EditSession, ExitGuard, PlanDeleted};
use floorplan::plan_mode::PlanMode;

/// The action awaiting operator confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Leave edit mode, discarding staged positions.
    LeaveEdit,
    /// Quit the application with unsaved positions.
    Quit,
    /// Delete the floor plan and all persisted tap placements.
    DeletePlan,
}

#[derive(Resource, Default)]
pub struct PendingConfirmAction(pub Option<ConfirmAction>);

/// Route window-close requests through the unsaved-changes guard. The
/// guard resource exists exactly while edit mode is active, so outside
/// edit mode this always quits straight away.
pub fn intercept_close_requests(
    mut closes: EventReader<WindowCloseRequested>,
    guard: Option<Res<ExitGuard>>,
    session: Res<EditSession>,
    mut pending: ResMut<PendingConfirmAction>,
    mut exits: EventWriter<AppExit>,
) {
    if closes.is_empty() {
        return;
    }
    closes.clear();

    if guard.is_some() && session.is_dirty() {
        pending.0 = Some(ConfirmAction::Quit);
    } else {
        exits.send(AppExit::Success);
    }
}

/// Renders a modal confirmation dialog when an action is pending.
pub fn confirm_dialog_ui(
    mut contexts: EguiContexts,
    mut pending: ResMut<PendingConfirmAction>,
    mut session: ResMut<EditSession>,
    mut next_mode: ResMut<NextState<PlanMode>>,
    mut deletions: EventWriter<PlanDeleted>,
    mut exits: EventWriter<AppExit>,
) {
    let Some(action) = pending.0 else {
        return;
    };

    let ctx = contexts.ctx_mut();

    // Semi-transparent backdrop to block interaction behind the dialog.
    let screen_rect = ctx.screen_rect();
    egui::Area::new(egui::Id::new("confirm_dialog_backdrop"))
        .fixed_pos(screen_rect.min)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let painter = ui.painter();
            painter.rect_filled(
                screen_rect,
                egui::CornerRadius::ZERO,
                egui::Color32::from_black_alpha(120),
            );
            ui.allocate_rect(screen_rect, egui::Sense::click());
        });

    let (title, description, confirm_label) = match action {
        ConfirmAction::LeaveEdit => (
            "Discard Changes",
            "Leave edit mode? Unsaved tap positions will be lost.",
            "Discard",
        ),
        ConfirmAction::Quit => (
            "Quit",
            "Quit now? Unsaved tap positions will be lost.",
            "Quit",
        ),
        ConfirmAction::DeletePlan => (
            "Delete Floor Plan",
            "Delete this floor plan and all tap placements on it? \
             This cannot be undone.",
            "Delete",
        ),
    };

    let mut should_clear = false;

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .default_width(320.0)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.spacing_mut().item_spacing.y = 10.0;
                ui.add_space(12.0);

                ui.heading(title);
                ui.add_space(4.0);
                ui.label(description);
                ui.add_space(12.0);

                let button_size = egui::Vec2::new(120.0, 32.0);

                ui.horizontal(|ui| {
                    let total_width = button_size.x * 2.0 + 16.0;
                    let avail = ui.available_width();
                    if avail > total_width {
                        ui.add_space((avail - total_width) / 2.0);
                    }

                    if ui
                        .add_sized(button_size, egui::Button::new(confirm_label))
                        .clicked()
                    {
                        match action {
                            ConfirmAction::LeaveEdit => {
                                session.reset();
                                next_mode.set(PlanMode::View);
                            }
                            ConfirmAction::Quit => {
                                exits.send(AppExit::Success);
                            }
                            ConfirmAction::DeletePlan => {
                                deletions.send(PlanDeleted);
                                session.reset();
                                next_mode.set(PlanMode::View);
                            }
                        }
                        should_clear = true;
                    }

                    ui.add_space(16.0);

                    if ui
                        .add_sized(button_size, egui::Button::new("Cancel"))
                        .clicked()
                    {
                        should_clear = true;
                    }
                });

                ui.add_space(12.0);
            });
        });

    if should_clear {
        pending.0 = None;
    }
}
