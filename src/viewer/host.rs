use crate::viewer::animation::{AnimationSink, PlaybackRequest};
use crate::viewer::camera::{ActiveCamera, OrbitCameraState};
use crate::viewer::config::ViewerConfig;
use crate::viewer::geometry::{
    Bounds, EditableGeometry, TransformOutcome, extend_mesh, inflate_mesh, move_mesh,
};
use crate::viewer::playback::AnimationQueue;
use crate::viewer::session::{MeshId, SceneId, ViewportHost};
use crate::viewer::state::ViewerState;
use crate::viewer::ui::PanelFocus;
use crate::viewer::viewport::{PickEvent, TransformCommand};
use bevy::camera::primitives::Aabb;
use bevy::mesh::VertexAttributeValues;
use bevy::picking::events::{Click, Pointer};
use bevy::picking::pointer::PointerButton;
use bevy::prelude::*;
use std::collections::HashMap;
use tracing::debug;

pub struct SceneHost<'a> {
    scene: SceneId,
    orbit: &'a OrbitCameraState,
    positions: HashMap<MeshId, Vec3>,
    queue: &'a mut AnimationQueue,
}

impl<'a> SceneHost<'a> {
    pub fn new(
        scene: SceneId,
        orbit: &'a OrbitCameraState,
        positions: HashMap<MeshId, Vec3>,
        queue: &'a mut AnimationQueue,
    ) -> Self {
        Self {
            scene,
            orbit,
            positions,
            queue,
        }
    }
}

impl AnimationSink for SceneHost<'_> {
    fn submit(&mut self, request: PlaybackRequest) {
        self.queue.submit(request);
    }
}

impl ViewportHost for SceneHost<'_> {
    fn active_camera(&self, scene: SceneId) -> Option<ActiveCamera> {
        (scene == self.scene).then_some(ActiveCamera::Orbit {
            target: self.orbit.target,
        })
    }

    fn mesh_position(&self, mesh: MeshId) -> Option<Vec3> {
        self.positions.get(&mesh).copied()
    }
}

pub fn on_pointer_click(
    mut click: On<Pointer<Click>>,
    focus: Res<PanelFocus>,
    orbit: Res<OrbitCameraState>,
    mut state: ResMut<ViewerState>,
    mut queue: ResMut<AnimationQueue>,
    globals: Query<&GlobalTransform>,
) {
    click.propagate(false);
    if click.button != PointerButton::Primary || focus.pointer_over_ui {
        return;
    }

    let event = match (click.hit.position, state.mesh_of(click.entity)) {
        (Some(_), Some(mesh)) => PickEvent::hit(mesh),
        _ => PickEvent::miss(),
    };

    let state = &mut *state;
    let positions = state
        .entities()
        .iter()
        .filter_map(|(mesh, entity)| {
            let global = globals.get(*entity).ok()?;
            Some((*mesh, global.translation()))
        })
        .collect();
    let mut host = SceneHost::new(state.viewport.scene(), &orbit, positions, &mut queue);

    if state.viewport.handle_pick(event, &mut host) {
        state.status = match state.selected_model_name() {
            Some(name) => format!("Selected {name}"),
            None => "Selected".to_string(),
        };
    }
}

pub struct BevyMeshGeometry<'a> {
    mesh: &'a mut Mesh,
    aabb: Option<Mut<'a, Aabb>>,
}

impl<'a> BevyMeshGeometry<'a> {
    pub fn new(mesh: &'a mut Mesh, aabb: Option<Mut<'a, Aabb>>) -> Self {
        Self { mesh, aabb }
    }
}

impl EditableGeometry for BevyMeshGeometry<'_> {
    fn positions_mut(&mut self) -> Option<&mut [f32]> {
        match self.mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)? {
            VertexAttributeValues::Float32x3(values) => Some(values.as_flattened_mut()),
            _ => None,
        }
    }

    /// Meshes pivot around their local origin.
    fn pivot(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn refresh_bounds(&mut self) {
        let Some(VertexAttributeValues::Float32x3(values)) =
            self.mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            return;
        };
        let Some(bounds) = Bounds::from_positions(values.as_flattened()) else {
            return;
        };
        if let Some(aabb) = self.aabb.as_mut() {
            **aabb = Aabb::from_min_max(bounds.min, bounds.max);
        }
    }
}

pub fn apply_transform_commands(
    config: Res<ViewerConfig>,
    mut state: ResMut<ViewerState>,
    mut queue: ResMut<AnimationQueue>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut targets: Query<(&Mesh3d, &Transform, Option<&mut Aabb>)>,
) {
    if state.pending.is_empty() {
        return;
    }

    let pending = std::mem::take(&mut state.pending);
    for command in pending {
        let Some(entity) = state.entity(command.mesh()) else {
            continue;
        };
        let Ok((mesh3d, transform, aabb)) = targets.get_mut(entity) else {
            continue;
        };

        let outcome = match command {
            TransformCommand::Extend { factor, .. } => {
                let Some(mut mesh) = meshes.get_mut(&mesh3d.0) else {
                    continue;
                };
                extend_mesh(&mut BevyMeshGeometry::new(&mut *mesh, aabb), factor)
            }
            TransformCommand::Move { distance, .. } => {
                let Some(mut mesh) = meshes.get_mut(&mesh3d.0) else {
                    continue;
                };
                move_mesh(&mut BevyMeshGeometry::new(&mut *mesh, aabb), distance)
            }
            TransformCommand::Inflate { mesh } => {
                inflate_mesh(mesh, transform.translation, &config.inflate, &mut *queue);
                state.status = "Inflating".to_string();
                continue;
            }
        };

        debug!(?command, ?outcome, "transform applied");
        state.status = match outcome {
            TransformOutcome::Applied { vertices } => {
                format!("Updated {vertices} vertices")
            }
            TransformOutcome::Skipped(reason) => format!("Skipped: {reason}"),
        };
    }
}

pub fn tick_highlight_pulse(mut state: ResMut<ViewerState>) {
    state.viewport.tick();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::geometry::SkipReason;
    use bevy::asset::RenderAssetUsages;
    use bevy::mesh::PrimitiveTopology;
    use pretty_assertions::assert_eq;

    fn positions(mesh: &Mesh) -> Vec<Vec3> {
        match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
            Some(VertexAttributeValues::Float32x3(values)) => {
                values.iter().copied().map(Vec3::from_array).collect()
            }
            _ => Vec::new(),
        }
    }

    fn world_with_aabb() -> (World, Entity) {
        let mut world = World::new();
        let entity = world
            .spawn(Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0)))
            .id();
        (world, entity)
    }

    #[test]
    fn extend_and_move_edit_the_mesh_positions() {
        let mut mesh = Mesh::from(Cuboid::new(2.0, 2.0, 2.0));
        let before = positions(&mesh);
        let factor = Vec3::new(2.0, 1.0, 0.5);

        let outcome = extend_mesh(&mut BevyMeshGeometry::new(&mut mesh, None), factor);
        assert_eq!(
            outcome,
            TransformOutcome::Applied {
                vertices: before.len()
            }
        );
        let extended: Vec<_> = before.iter().map(|v| *v * factor).collect();
        assert_eq!(positions(&mesh), extended);

        move_mesh(&mut BevyMeshGeometry::new(&mut mesh, None), Vec3::Y);
        let moved: Vec<_> = extended.iter().map(|v| *v + Vec3::Y).collect();
        assert_eq!(positions(&mesh), moved);
    }

    #[test]
    fn mesh_without_positions_is_skipped() {
        let (mut world, entity) = world_with_aabb();
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());

        let aabb = world.get_mut::<Aabb>(entity);
        let outcome = extend_mesh(&mut BevyMeshGeometry::new(&mut mesh, aabb), Vec3::splat(2.0));
        assert_eq!(outcome, TransformOutcome::Skipped(SkipReason::NoGeometry));

        let aabb = world.get_mut::<Aabb>(entity);
        let outcome = move_mesh(&mut BevyMeshGeometry::new(&mut mesh, aabb), Vec3::X);
        assert_eq!(outcome, TransformOutcome::Skipped(SkipReason::NoGeometry));

        assert!(mesh.attribute(Mesh::ATTRIBUTE_POSITION).is_none());
        let aabb = world.get::<Aabb>(entity).unwrap();
        assert_eq!(Vec3::from(aabb.center), Vec3::ZERO);
        assert_eq!(Vec3::from(aabb.half_extents), Vec3::ONE);
    }

    #[test]
    fn edits_refresh_the_entity_aabb() {
        let (mut world, entity) = world_with_aabb();
        let mut mesh = Mesh::from(Cuboid::new(2.0, 2.0, 2.0));

        let aabb = world.get_mut::<Aabb>(entity);
        extend_mesh(
            &mut BevyMeshGeometry::new(&mut mesh, aabb),
            Vec3::new(3.0, 1.0, 1.0),
        );
        let aabb = world.get_mut::<Aabb>(entity);
        move_mesh(
            &mut BevyMeshGeometry::new(&mut mesh, aabb),
            Vec3::new(0.0, 2.0, 0.0),
        );

        let aabb = world.get::<Aabb>(entity).unwrap();
        assert_eq!(Vec3::from(aabb.center), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(Vec3::from(aabb.half_extents), Vec3::new(3.0, 1.0, 1.0));
    }
}
