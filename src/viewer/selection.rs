use crate::viewer::camera::retarget_camera;
use crate::viewer::config::HighlightSettings;
use crate::viewer::session::{MeshId, ModelGroup, SceneId, ViewportHost, ViewportSession};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tint {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PulsePhase(f32);

impl PulsePhase {
    pub fn value(self) -> f32 {
        self.0
    }

    fn advance(&mut self, increment: f32, ceiling: f32) {
        self.0 += increment;
        if self.0 >= ceiling {
            self.0 = 0.0;
        }
    }
}

#[derive(Debug, Clone)]
pub struct HighlightLayer {
    entries: HashSet<(MeshId, Tint)>,
    excluded: HashSet<MeshId>,
    pulse: PulsePhase,
    blur_horizontal: f32,
    blur_vertical: f32,
}

impl HighlightLayer {
    pub fn new(excluded: impl IntoIterator<Item = MeshId>, settings: &HighlightSettings) -> Self {
        let blur = settings.blur_at(0.0);
        Self {
            entries: HashSet::new(),
            excluded: excluded.into_iter().collect(),
            pulse: PulsePhase::default(),
            blur_horizontal: blur,
            blur_vertical: blur,
        }
    }

    pub fn add_mesh(&mut self, mesh: MeshId, tint: Tint) -> bool {
        if self.excluded.contains(&mesh) {
            return false;
        }
        self.entries.insert((mesh, tint))
    }

    pub fn remove_mesh(&mut self, mesh: MeshId) {
        self.entries.retain(|(entry, _)| *entry != mesh);
    }

    pub fn exclude_mesh(&mut self, mesh: MeshId) {
        self.remove_mesh(mesh);
        self.excluded.insert(mesh);
    }

    pub fn contains(&self, mesh: MeshId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == mesh)
    }

    pub fn entries(&self) -> impl Iterator<Item = (MeshId, Tint)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pulse(&self) -> PulsePhase {
        self.pulse
    }

    pub fn blur_size(&self) -> (f32, f32) {
        (self.blur_horizontal, self.blur_vertical)
    }

    pub fn reset_pulse(&mut self) {
        self.pulse = PulsePhase::default();
    }

    pub fn tick(&mut self, settings: &HighlightSettings) {
        self.pulse
            .advance(settings.pulse_increment, settings.phase_ceiling);
        let blur = settings.blur_at(self.pulse.value());
        self.blur_horizontal = blur;
        self.blur_vertical = blur;
    }
}

impl ViewportSession {
    pub fn select<H: ViewportHost + ?Sized>(&mut self, mesh: Option<MeshId>, host: &mut H) -> bool {
        let Some(mesh) = mesh else {
            return false;
        };
        let Some(group) = self.model_of(mesh).cloned() else {
            debug!(?mesh, "select ignored, mesh belongs to no model");
            return false;
        };
        let scene = group.scene;

        self.deselect(scene);

        let settings = self.highlight_settings;
        let Some(state) = self.scenes.get_mut(&scene) else {
            return false;
        };
        let plane = state.reference_plane;
        let layer = state
            .highlight
            .get_or_insert_with(|| HighlightLayer::new(plane, &settings));
        layer.reset_pulse();
        layer.add_mesh(group.root, Tint::Primary);
        for child in &group.children {
            layer.add_mesh(*child, Tint::Secondary);
        }
        state.selection = Some(group.id);
        debug!(?scene, model = %group.name, "model selected");

        if let Some(position) = host.mesh_position(group.root) {
            retarget_camera(scene, position, host, &self.retarget_settings);
        }
        true
    }

    pub fn deselect(&mut self, scene: SceneId) -> bool {
        let Some(state) = self.scenes.get_mut(&scene) else {
            return false;
        };
        let (Some(layer), Some(selected)) = (state.highlight.as_mut(), state.selection) else {
            return false;
        };
        if let Some(group) = state.models.get(&selected) {
            for member in group.members() {
                layer.remove_mesh(member);
            }
        }
        state.selection = None;
        debug!(?scene, "selection cleared");
        true
    }

    pub fn has_selection(&self, scene: SceneId) -> bool {
        self.selected_model(scene).is_some()
    }

    pub fn selection(&self, scene: SceneId) -> Option<MeshId> {
        self.selected_model(scene).map(|group| group.root)
    }

    pub fn selected_model(&self, scene: SceneId) -> Option<&ModelGroup> {
        let state = self.scenes.get(&scene)?;
        state.models.get(&state.selection?)
    }

    pub fn highlight(&self, scene: SceneId) -> Option<&HighlightLayer> {
        self.scenes.get(&scene)?.highlight.as_ref()
    }

    pub fn tick_highlights(&mut self) {
        let settings = self.highlight_settings;
        for layer in self
            .scenes
            .values_mut()
            .filter_map(|state| state.highlight.as_mut())
        {
            layer.tick(&settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::animation::AnimationTarget;
    use crate::viewer::config::RetargetSettings;
    use crate::viewer::session::ModelId;
    use crate::viewer::testing::FakeHost;
    use approx::assert_relative_eq;
    use bevy::math::Vec3;
    use pretty_assertions::assert_eq;

    const SCENE: SceneId = SceneId(1);
    const PLANE: MeshId = MeshId(100);

    fn session() -> ViewportSession {
        let mut session =
            ViewportSession::new(HighlightSettings::default(), RetargetSettings::default());
        session.open_scene(SCENE, Some(PLANE));
        session
    }

    fn combi(session: &mut ViewportSession) -> ModelId {
        session
            .register_model(SCENE, "combi", MeshId(1), vec![MeshId(2), MeshId(3), MeshId(4)])
            .unwrap()
    }

    fn entries(session: &ViewportSession) -> Vec<(MeshId, Tint)> {
        let mut entries: Vec<_> = session
            .highlight(SCENE)
            .map(|layer| layer.entries().collect())
            .unwrap_or_default();
        entries.sort();
        entries
    }

    #[test]
    fn combi_select_then_deselect() {
        let mut session = session();
        combi(&mut session);
        let mut host = FakeHost::with_orbit(SCENE, Vec3::ZERO);

        assert!(session.select(Some(MeshId(1)), &mut host));
        assert_eq!(session.selection(SCENE), Some(MeshId(1)));
        assert_eq!(
            entries(&session),
            vec![
                (MeshId(1), Tint::Primary),
                (MeshId(2), Tint::Secondary),
                (MeshId(3), Tint::Secondary),
                (MeshId(4), Tint::Secondary),
            ]
        );

        assert!(session.deselect(SCENE));
        assert!(entries(&session).is_empty());
        assert!(!session.has_selection(SCENE));
    }

    #[test]
    fn picking_a_child_selects_the_whole_model() {
        let mut session = session();
        combi(&mut session);
        let mut host = FakeHost::default();

        session.select(Some(MeshId(3)), &mut host);
        assert_eq!(session.selection(SCENE), Some(MeshId(1)));
        assert_eq!(entries(&session).len(), 4);
    }

    #[test]
    fn selecting_another_model_replaces_the_first() {
        let mut session = session();
        combi(&mut session);
        session
            .register_model(SCENE, "crate", MeshId(10), vec![MeshId(11)])
            .unwrap();
        let mut host = FakeHost::default();

        session.select(Some(MeshId(1)), &mut host);
        session.select(Some(MeshId(10)), &mut host);

        assert_eq!(session.selection(SCENE), Some(MeshId(10)));
        let layer = session.highlight(SCENE).unwrap();
        for member in 1..=4 {
            assert!(!layer.contains(MeshId(member)));
        }
        assert_eq!(
            entries(&session),
            vec![(MeshId(10), Tint::Primary), (MeshId(11), Tint::Secondary)]
        );
    }

    #[test]
    fn select_none_and_empty_deselect_change_nothing() {
        let mut session = session();
        combi(&mut session);
        let mut host = FakeHost::default();

        assert!(!session.select(None, &mut host));
        assert!(!session.deselect(SCENE));
        assert!(session.highlight(SCENE).is_none());

        session.select(Some(MeshId(1)), &mut host);
        session.deselect(SCENE);
        let before = entries(&session);
        assert!(!session.select(None, &mut host));
        assert!(!session.deselect(SCENE));
        assert_eq!(entries(&session), before);
        assert!(!session.has_selection(SCENE));
    }

    #[test]
    fn unknown_meshes_and_the_plane_are_not_selectable() {
        let mut session = session();
        combi(&mut session);
        let mut host = FakeHost::default();

        assert!(!session.select(Some(MeshId(55)), &mut host));
        assert!(!session.select(Some(PLANE), &mut host));
        assert!(!session.has_selection(SCENE));
    }

    #[test]
    fn reselect_resets_the_pulse_and_rebuilds_membership() {
        let mut session = session();
        combi(&mut session);
        let mut host = FakeHost::default();

        session.select(Some(MeshId(1)), &mut host);
        let before = entries(&session);
        for _ in 0..10 {
            session.tick_highlights();
        }
        assert!(session.highlight(SCENE).unwrap().pulse().value() > 0.0);

        session.select(Some(MeshId(1)), &mut host);
        assert_eq!(session.highlight(SCENE).unwrap().pulse(), PulsePhase::default());
        assert_eq!(entries(&session), before);
    }

    #[test]
    fn layer_never_admits_the_reference_plane() {
        let mut layer = HighlightLayer::new([PLANE], &HighlightSettings::default());
        assert!(!layer.add_mesh(PLANE, Tint::Primary));
        assert!(layer.add_mesh(MeshId(1), Tint::Primary));
        assert!(layer.add_mesh(MeshId(1), Tint::Secondary));
        assert_eq!(layer.len(), 2);

        layer.remove_mesh(MeshId(1));
        assert!(layer.is_empty());
    }

    #[test]
    fn blur_follows_the_phase() {
        let settings = HighlightSettings::default();
        let mut layer = HighlightLayer::new([], &settings);
        layer.tick(&settings);

        let (horizontal, vertical) = layer.blur_size();
        assert_relative_eq!(horizontal, 0.3 + 0.02f32.cos() * 0.2 + 0.2, epsilon = 1e-6);
        assert_eq!(horizontal, vertical);
    }

    #[test]
    fn pulse_wraps_at_the_ceiling() {
        let settings = HighlightSettings {
            pulse_increment: 1.0,
            phase_ceiling: 3.0,
            ..HighlightSettings::default()
        };
        let mut layer = HighlightLayer::new([], &settings);
        layer.tick(&settings);
        layer.tick(&settings);
        assert_eq!(layer.pulse().value(), 2.0);
        layer.tick(&settings);
        assert_eq!(layer.pulse().value(), 0.0);
        assert_relative_eq!(layer.blur_size().0, 0.7, epsilon = 1e-6);
    }

    #[test]
    fn scenes_pulse_independently() {
        let other = SceneId(2);
        let mut session = session();
        session.open_scene(other, None);
        combi(&mut session);
        session
            .register_model(other, "crate", MeshId(20), vec![])
            .unwrap();
        let mut host = FakeHost::default();

        session.select(Some(MeshId(1)), &mut host);
        session.tick_highlights();
        session.tick_highlights();
        session.select(Some(MeshId(20)), &mut host);

        assert_eq!(session.highlight(other).unwrap().pulse().value(), 0.0);
        assert!(session.highlight(SCENE).unwrap().pulse().value() > 0.0);
        assert_eq!(session.selection(SCENE), Some(MeshId(1)));
        assert_eq!(session.selection(other), Some(MeshId(20)));
    }

    #[test]
    fn selection_retargets_the_camera_onto_the_root() {
        let mut session = session();
        combi(&mut session);
        let root_position = Vec3::new(2.0, 0.5, -1.0);
        let mut host = FakeHost::with_orbit(SCENE, Vec3::ZERO).place(MeshId(1), root_position);

        session.select(Some(MeshId(2)), &mut host);

        assert_eq!(host.submitted.len(), 1);
        let request = &host.submitted[0];
        assert_eq!(request.target, AnimationTarget::Camera(SCENE));
        assert_eq!(request.clips[0].keys()[1].value, root_position);
    }

    #[test]
    fn closing_the_scene_drops_selection_and_layer() {
        let mut session = session();
        combi(&mut session);
        let mut host = FakeHost::default();
        session.select(Some(MeshId(1)), &mut host);

        session.close_scene(SCENE);
        assert!(session.highlight(SCENE).is_none());
        assert!(!session.has_selection(SCENE));
    }
}
