use crate::viewer::fields::vector3_field;
use crate::viewer::playback::AnimationQueue;
use crate::viewer::state::ViewerState;
use crate::viewer::viewport::FieldAction;
use bevy::prelude::{Res, ResMut, Resource};
use bevy_egui::{EguiContexts, egui};

#[derive(Resource, Default)]
pub struct PanelFocus {
    pub pointer_over_ui: bool,
    pub panel_width: f32,
}

pub fn ui_system(
    mut contexts: EguiContexts,
    mut state: ResMut<ViewerState>,
    mut focus: ResMut<PanelFocus>,
    queue: Res<AnimationQueue>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::TopBottomPanel::top("viewer_top_bar").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.heading("IPEX Viewer");
            ui.separator();
            ui.label(format!("Status: {}", state.status));
            if queue.is_running() {
                ui.label(format!("(animating {})", queue.active_len()));
            }
            ui.separator();
            ui.small("LMB select, RMB rotate, MMB pan, wheel zoom.");
        });
    });

    let side_panel_response = egui::SidePanel::left("viewer_controls")
        .resizable(true)
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.heading("Selection");
            match state.selected_model_name() {
                Some(name) => ui.label(format!("Model: {name}")),
                None => ui.label("Nothing selected"),
            };
            ui.horizontal(|ui| {
                let selected = state.viewport.has_selection();
                if ui
                    .add_enabled(selected, egui::Button::new("Deselect"))
                    .clicked()
                    && state.viewport.clear_selection()
                {
                    state.status = "Selection cleared".to_string();
                }
                ui.checkbox(&mut state.show_grid, "Show grid");
            });

            ui.separator();
            ui.heading("Transform");

            if vector3_field(ui, &mut state.extent_field) {
                let factor = state.extent_field.value();
                state.queue_action(FieldAction::Extend(factor));
            }
            ui.add_space(4.0);
            if vector3_field(ui, &mut state.translation_field) {
                let distance = state.translation_field.value();
                state.queue_action(FieldAction::Move(distance));
            }
            ui.add_space(4.0);
            if ui.button("Balloon").clicked() {
                state.queue_action(FieldAction::Inflate);
            }

            ui.separator();
            ui.collapsing("Models", |ui| {
                let scene = state.viewport.scene();
                let mut groups: Vec<_> = state
                    .viewport
                    .session()
                    .state(scene)
                    .into_iter()
                    .flat_map(|session| session.models())
                    .collect();
                groups.sort_by(|a, b| a.name.cmp(&b.name));
                for group in groups {
                    ui.label(format!("{} ({} meshes)", group.name, group.member_count()));
                }
            });
        });

    focus.pointer_over_ui = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
    focus.panel_width = side_panel_response.response.rect.width();
}
