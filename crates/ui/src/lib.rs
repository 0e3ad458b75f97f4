use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod confirm_dialog;
pub mod controls;
pub mod theme;
pub mod tooltip;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<confirm_dialog::PendingConfirmAction>()
            .init_resource::<tooltip::TapHoverState>()
            .add_systems(Startup, theme::apply_console_theme)
            .add_systems(
                Update,
                (
                    controls::controls_ui,
                    tooltip::tap_tooltip_ui,
                    confirm_dialog::intercept_close_requests,
                    confirm_dialog::confirm_dialog_ui,
                ),
            );
    }
}
