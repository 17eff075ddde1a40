use crate::viewer::animation::AnimationSink;
use crate::viewer::camera::ActiveCamera;
use crate::viewer::config::{HighlightSettings, RetargetSettings};
use crate::viewer::selection::HighlightLayer;
use bevy::math::Vec3;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct ModelGroup {
    pub id: ModelId,
    pub name: String,
    pub scene: SceneId,
    pub root: MeshId,
    pub children: Vec<MeshId>,
}

impl ModelGroup {
    pub fn members(&self) -> impl Iterator<Item = MeshId> + '_ {
        std::iter::once(self.root).chain(self.children.iter().copied())
    }

    pub fn contains(&self, mesh: MeshId) -> bool {
        self.root == mesh || self.children.contains(&mesh)
    }

    pub fn member_count(&self) -> usize {
        1 + self.children.len()
    }
}

pub trait ViewportHost: AnimationSink {
    fn active_camera(&self, scene: SceneId) -> Option<ActiveCamera>;

    fn mesh_position(&self, mesh: MeshId) -> Option<Vec3>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("scene {0:?} is not open")]
    SceneNotOpen(SceneId),
    #[error("mesh {0:?} already belongs to a model")]
    MeshAlreadyGrouped(MeshId),
    #[error("mesh {0:?} is the scene's reference plane")]
    ReferencePlane(MeshId),
    #[error("mesh {0:?} is listed more than once")]
    DuplicateMember(MeshId),
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub(crate) reference_plane: Option<MeshId>,
    pub(crate) models: HashMap<ModelId, ModelGroup>,
    pub(crate) owners: HashMap<MeshId, ModelId>,
    pub(crate) selection: Option<ModelId>,
    pub(crate) highlight: Option<HighlightLayer>,
}

impl SessionState {
    pub fn models(&self) -> impl Iterator<Item = &ModelGroup> {
        self.models.values()
    }
}

#[derive(Debug, Default)]
pub struct ViewportSession {
    pub(crate) scenes: HashMap<SceneId, SessionState>,
    pub(crate) highlight_settings: HighlightSettings,
    pub(crate) retarget_settings: RetargetSettings,
    next_model: u32,
}

impl ViewportSession {
    pub fn new(highlight_settings: HighlightSettings, retarget_settings: RetargetSettings) -> Self {
        Self {
            scenes: HashMap::new(),
            highlight_settings,
            retarget_settings,
            next_model: 0,
        }
    }

    /// Opening an already open scene only updates its reference plane.
    pub fn open_scene(&mut self, scene: SceneId, reference_plane: Option<MeshId>) {
        let state = self.scenes.entry(scene).or_default();
        state.reference_plane = reference_plane;
        if let (Some(layer), Some(plane)) = (state.highlight.as_mut(), reference_plane) {
            layer.exclude_mesh(plane);
        }
        debug!(?scene, ?reference_plane, "scene opened");
    }

    pub fn close_scene(&mut self, scene: SceneId) -> bool {
        let closed = self.scenes.remove(&scene).is_some();
        if closed {
            debug!(?scene, "scene closed");
        }
        closed
    }

    pub fn state(&self, scene: SceneId) -> Option<&SessionState> {
        self.scenes.get(&scene)
    }

    pub fn register_model(
        &mut self,
        scene: SceneId,
        name: impl Into<String>,
        root: MeshId,
        children: Vec<MeshId>,
    ) -> Result<ModelId, RegisterError> {
        let state = self
            .scenes
            .get_mut(&scene)
            .ok_or(RegisterError::SceneNotOpen(scene))?;

        let mut seen = HashSet::with_capacity(children.len() + 1);
        for mesh in std::iter::once(root).chain(children.iter().copied()) {
            if state.reference_plane == Some(mesh) {
                return Err(RegisterError::ReferencePlane(mesh));
            }
            if state.owners.contains_key(&mesh) {
                return Err(RegisterError::MeshAlreadyGrouped(mesh));
            }
            if !seen.insert(mesh) {
                return Err(RegisterError::DuplicateMember(mesh));
            }
        }

        let id = ModelId(self.next_model);
        self.next_model += 1;

        let group = ModelGroup {
            id,
            name: name.into(),
            scene,
            root,
            children,
        };
        for mesh in group.members() {
            state.owners.insert(mesh, id);
        }
        debug!(?scene, model = %group.name, members = group.member_count(), "model registered");
        state.models.insert(id, group);
        Ok(id)
    }

    pub fn model_of(&self, mesh: MeshId) -> Option<&ModelGroup> {
        self.scenes.values().find_map(|state| {
            let id = state.owners.get(&mesh)?;
            state.models.get(id)
        })
    }

    pub fn reference_plane(&self, scene: SceneId) -> Option<MeshId> {
        self.scenes.get(&scene)?.reference_plane
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const SCENE: SceneId = SceneId(7);

    #[test]
    fn members_list_root_before_children() {
        let group = ModelGroup {
            id: ModelId(0),
            name: "combi".to_string(),
            scene: SCENE,
            root: MeshId(1),
            children: vec![MeshId(2), MeshId(3)],
        };
        assert_eq!(
            group.members().collect::<Vec<_>>(),
            vec![MeshId(1), MeshId(2), MeshId(3)]
        );
        assert!(group.contains(MeshId(3)));
        assert!(!group.contains(MeshId(4)));
    }

    #[test]
    fn register_requires_an_open_scene() {
        let mut session = ViewportSession::default();
        assert_eq!(
            session.register_model(SCENE, "lonely", MeshId(1), vec![]),
            Err(RegisterError::SceneNotOpen(SCENE))
        );
    }

    #[test]
    fn meshes_belong_to_one_group_only() {
        let mut session = ViewportSession::default();
        session.open_scene(SCENE, Some(MeshId(100)));
        session
            .register_model(SCENE, "first", MeshId(1), vec![MeshId(2)])
            .unwrap();

        assert_eq!(
            session.register_model(SCENE, "second", MeshId(3), vec![MeshId(2)]),
            Err(RegisterError::MeshAlreadyGrouped(MeshId(2)))
        );
        assert_eq!(
            session.register_model(SCENE, "plane", MeshId(100), vec![]),
            Err(RegisterError::ReferencePlane(MeshId(100)))
        );
    }

    #[rstest]
    #[case::root_as_child(MeshId(1), vec![MeshId(1)], MeshId(1))]
    #[case::repeated_child(MeshId(1), vec![MeshId(2), MeshId(3), MeshId(2)], MeshId(2))]
    fn members_are_listed_once(
        #[case] root: MeshId,
        #[case] children: Vec<MeshId>,
        #[case] repeated: MeshId,
    ) {
        let mut session = ViewportSession::default();
        session.open_scene(SCENE, None);

        assert_eq!(
            session.register_model(SCENE, "m", root, children),
            Err(RegisterError::DuplicateMember(repeated))
        );
        let state = session.state(SCENE).unwrap();
        assert_eq!(state.models().count(), 0);
        assert!(state.owners.is_empty());
    }

    #[test]
    fn model_lookup_resolves_any_member() {
        let mut session = ViewportSession::default();
        session.open_scene(SCENE, None);
        let id = session
            .register_model(SCENE, "combi", MeshId(1), vec![MeshId(2), MeshId(3)])
            .unwrap();

        assert_eq!(session.model_of(MeshId(3)).map(|group| group.id), Some(id));
        assert_eq!(session.model_of(MeshId(1)).map(|group| group.root), Some(MeshId(1)));
        assert!(session.model_of(MeshId(9)).is_none());
    }

    #[test]
    fn closing_a_scene_drops_its_models() {
        let mut session = ViewportSession::default();
        session.open_scene(SCENE, None);
        session
            .register_model(SCENE, "combi", MeshId(1), vec![])
            .unwrap();

        assert!(session.close_scene(SCENE));
        assert!(session.state(SCENE).is_none());
        assert!(session.model_of(MeshId(1)).is_none());
        assert!(!session.close_scene(SCENE));
    }
}
