use crate::viewer::camera::OrbitCameraState;
use crate::viewer::config::{DemoModel, PartDefinition, PartShape, ViewerConfig};
use crate::viewer::selection::Tint;
use crate::viewer::state::{ViewerState, mesh_id};
use crate::viewer::viewport::Viewport;
use crate::viewer::{PRIMARY_SCENE, UI_RENDER_LAYER};
use bevy::camera::ClearColorConfig;
use bevy::camera::primitives::Aabb;
use bevy::camera::visibility::RenderLayers;
use bevy::picking::Pickable;
use bevy::prelude::*;
use bevy_egui::PrimaryEguiContext;
use tracing::{info, warn};

/// Grows each outline box by this much per unit of blur.
const OUTLINE_PADDING: f32 = 0.08;

#[derive(Component)]
pub struct ViewerCamera;

pub fn setup_viewer_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<ViewerConfig>,
    orbit: Res<OrbitCameraState>,
) {
    commands.spawn((Camera3d::default(), orbit.transform(), ViewerCamera));
    commands.spawn((
        Camera2d,
        Camera {
            order: 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        RenderLayers::layer(UI_RENDER_LAYER),
        PrimaryEguiContext,
    ));

    commands.spawn((
        DirectionalLight {
            color: Color::srgb(1.0, 0.97, 0.9),
            shadows_enabled: true,
            illuminance: 9_000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let plane_settings = config.reference_plane;
    let size = plane_settings.extent * 2.0;
    let plane = commands
        .spawn((
            Name::new("ground"),
            Mesh3d(meshes.add(Plane3d::default().mesh().size(size, size))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgba(0.55, 0.55, 0.58, plane_settings.opacity),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            })),
            Transform::default(),
            Pickable::IGNORE,
        ))
        .id();

    let viewport = Viewport::new(
        PRIMARY_SCENE,
        mesh_id(plane),
        config.highlight,
        config.retarget,
    );
    let mut state = ViewerState::new(viewport, &config);

    for model in &config.models {
        spawn_demo_model(&mut commands, &mut meshes, &mut materials, &mut state, model);
    }
    info!(models = config.models.len(), "viewer scene ready");

    commands.insert_resource(state);
}

fn spawn_demo_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    state: &mut ViewerState,
    model: &DemoModel,
) {
    let root_transform = Transform::from_translation(
        Vec3::from_array(model.position) + Vec3::from_array(model.root.offset),
    )
    .with_scale(Vec3::from_array(model.scaling));
    let root = commands
        .spawn((
            Name::new(model.name.clone()),
            part_bundle(meshes, materials, &model.root),
            root_transform,
        ))
        .id();

    let children = model
        .children
        .iter()
        .map(|part| {
            let child = commands
                .spawn((
                    part_bundle(meshes, materials, part),
                    Transform::from_translation(Vec3::from_array(part.offset)),
                    ChildOf(root),
                ))
                .id();
            state.track(child)
        })
        .collect();
    let root = state.track(root);

    if let Err(err) = state.viewport.register_model(model.name.clone(), root, children) {
        warn!("Skipping model '{}': {err}", model.name);
    }
}

fn part_bundle(
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    part: &PartDefinition,
) -> (Mesh3d, MeshMaterial3d<StandardMaterial>) {
    let (r, g, b) = part.color;
    (
        Mesh3d(meshes.add(part_mesh(&part.shape))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(r, g, b),
            perceptual_roughness: 0.85,
            ..default()
        })),
    )
}

fn part_mesh(shape: &PartShape) -> Mesh {
    match *shape {
        PartShape::Cuboid { size: [x, y, z] } => Mesh::from(Cuboid::new(x, y, z)),
        PartShape::Sphere { radius } => Mesh::from(Sphere::new(radius)),
        PartShape::Cylinder { radius, height } => Mesh::from(Cylinder::new(radius, height)),
    }
}

pub fn draw_reference_grid(mut gizmos: Gizmos, config: Res<ViewerConfig>, state: Res<ViewerState>) {
    if !state.show_grid {
        return;
    }

    let settings = config.reference_plane;
    if settings.cell_size <= 0.0 {
        return;
    }
    let extent = settings.extent;
    let cells = (extent / settings.cell_size).round() as i32;
    let major_every = settings.major_every.max(1) as i32;
    let y = 0.001;

    for i in -cells..=cells {
        let f = i as f32 * settings.cell_size;
        let color = if i % major_every == 0 {
            Color::srgba(0.7, 0.7, 0.7, settings.opacity * 3.0)
        } else {
            Color::srgba(0.45, 0.45, 0.45, settings.opacity)
        };

        gizmos.line(Vec3::new(-extent, y, f), Vec3::new(extent, y, f), color);
        gizmos.line(Vec3::new(f, y, -extent), Vec3::new(f, y, extent), color);
    }

    gizmos.line(
        Vec3::new(-extent, y + 0.0005, 0.0),
        Vec3::new(extent, y + 0.0005, 0.0),
        Color::srgb(0.85, 0.25, 0.25),
    );
    gizmos.line(
        Vec3::new(0.0, y + 0.0005, -extent),
        Vec3::new(0.0, y + 0.0005, extent),
        Color::srgb(0.25, 0.25, 0.85),
    );
}

pub fn draw_highlight_outlines(
    mut gizmos: Gizmos,
    config: Res<ViewerConfig>,
    state: Res<ViewerState>,
    bounds: Query<(&GlobalTransform, &Aabb)>,
) {
    let Some(layer) = state.viewport.session().highlight(state.viewport.scene()) else {
        return;
    };
    let (blur, _) = layer.blur_size();
    let padding = Vec3::splat(blur * OUTLINE_PADDING);

    for (mesh, tint) in layer.entries() {
        let Some(entity) = state.entity(mesh) else {
            continue;
        };
        let Ok((global, aabb)) = bounds.get(entity) else {
            continue;
        };
        let (r, g, b) = match tint {
            Tint::Primary => config.highlight.primary_tint,
            Tint::Secondary => config.highlight.secondary_tint,
        };
        let size = Vec3::from(aabb.half_extents) * 2.0 + padding;
        let local = Transform::from_translation(Vec3::from(aabb.center)).with_scale(size);
        gizmos.cube(global.mul_transform(local), Color::srgb(r, g, b));
    }
}
