use crate::viewer::config::{HighlightSettings, RetargetSettings};
use crate::viewer::session::{
    MeshId, ModelId, RegisterError, SceneId, ViewportHost, ViewportSession,
};
use bevy::math::Vec3;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickEvent {
    pub hit: bool,
    pub picked: Option<MeshId>,
}

impl PickEvent {
    pub fn hit(mesh: MeshId) -> Self {
        Self {
            hit: true,
            picked: Some(mesh),
        }
    }

    pub fn miss() -> Self {
        Self {
            hit: false,
            picked: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldAction {
    Extend(Vec3),
    Move(Vec3),
    Inflate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformCommand {
    Extend { mesh: MeshId, factor: Vec3 },
    Move { mesh: MeshId, distance: Vec3 },
    Inflate { mesh: MeshId },
}

impl TransformCommand {
    pub fn mesh(&self) -> MeshId {
        match *self {
            Self::Extend { mesh, .. } | Self::Move { mesh, .. } | Self::Inflate { mesh } => mesh,
        }
    }
}

#[derive(Debug)]
pub struct Viewport {
    scene: SceneId,
    reference_plane: MeshId,
    session: ViewportSession,
}

impl Viewport {
    pub fn new(
        scene: SceneId,
        reference_plane: MeshId,
        highlight: HighlightSettings,
        retarget: RetargetSettings,
    ) -> Self {
        let mut session = ViewportSession::new(highlight, retarget);
        session.open_scene(scene, Some(reference_plane));
        Self {
            scene,
            reference_plane,
            session,
        }
    }

    pub fn scene(&self) -> SceneId {
        self.scene
    }

    pub fn reference_plane(&self) -> MeshId {
        self.reference_plane
    }

    pub fn session(&self) -> &ViewportSession {
        &self.session
    }

    pub fn register_model(
        &mut self,
        name: impl Into<String>,
        root: MeshId,
        children: Vec<MeshId>,
    ) -> Result<ModelId, RegisterError> {
        self.session.register_model(self.scene, name, root, children)
    }

    /// Misses and hits without a mesh leave the selection untouched.
    pub fn handle_pick<H: ViewportHost + ?Sized>(&mut self, event: PickEvent, host: &mut H) -> bool {
        match event {
            PickEvent {
                hit: true,
                picked: Some(mesh),
            } => self.session.select(Some(mesh), host),
            _ => {
                debug!(?event, "pick ignored");
                false
            }
        }
    }

    pub fn resolve(&self, action: FieldAction) -> Option<TransformCommand> {
        let mesh = self.selection()?;
        Some(match action {
            FieldAction::Extend(factor) => TransformCommand::Extend { mesh, factor },
            FieldAction::Move(distance) => TransformCommand::Move { mesh, distance },
            FieldAction::Inflate => TransformCommand::Inflate { mesh },
        })
    }

    pub fn has_selection(&self) -> bool {
        self.session.has_selection(self.scene)
    }

    pub fn selection(&self) -> Option<MeshId> {
        self.session.selection(self.scene)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.session.deselect(self.scene)
    }

    pub fn tick(&mut self) {
        self.session.tick_highlights();
    }
}
