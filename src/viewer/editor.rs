use crate::viewer::CONFIG_PATH;
use crate::viewer::camera::{OrbitCameraState, orbit_camera_system, update_camera_viewport};
use crate::viewer::config::load_or_default;
use crate::viewer::host::{apply_transform_commands, on_pointer_click, tick_highlight_pulse};
use crate::viewer::playback::{AnimationQueue, advance_animations};
use crate::viewer::scene::{draw_highlight_outlines, draw_reference_grid, setup_viewer_scene};
use crate::viewer::ui::{PanelFocus, ui_system};
use bevy::picking::mesh_picking::MeshPickingPlugin;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};
use std::path::Path;

pub fn run() -> AppExit {
    let config = load_or_default(Path::new(CONFIG_PATH));
    let (r, g, b) = config.clear_color;

    App::new()
        .insert_resource(ClearColor(Color::srgb(r, g, b)))
        .insert_resource(OrbitCameraState::from_settings(&config.camera))
        .insert_resource(config)
        .insert_resource(PanelFocus::default())
        .insert_resource(AnimationQueue::default())
        .insert_resource(GlobalAmbientLight {
            color: Color::srgb(0.85, 0.88, 0.95),
            brightness: 350.0,
            affects_lightmapped_meshes: true,
        })
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "IPEX Viewer".to_string(),
                resolution: (1400, 900).into(),
                present_mode: PresentMode::AutoVsync,
                ..Default::default()
            }),
            ..Default::default()
        }))
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_systems(Startup, setup_viewer_scene)
        .add_systems(
            Update,
            (
                apply_transform_commands,
                advance_animations,
                tick_highlight_pulse,
                update_camera_viewport,
                orbit_camera_system,
            )
                .chain(),
        )
        .add_systems(Update, (draw_reference_grid, draw_highlight_outlines))
        .add_systems(EguiPrimaryContextPass, ui_system)
        .add_observer(on_pointer_click)
        .run()
}
