use crate::viewer::config::ViewerConfig;
use crate::viewer::fields::Vector3Field;
use crate::viewer::session::MeshId;
use crate::viewer::viewport::{FieldAction, TransformCommand, Viewport};
use bevy::prelude::{Entity, Resource};
use std::collections::HashMap;
use tracing::debug;

pub fn mesh_id(entity: Entity) -> MeshId {
    MeshId(entity.to_bits())
}

#[derive(Resource)]
pub struct ViewerState {
    pub viewport: Viewport,
    pub extent_field: Vector3Field,
    pub translation_field: Vector3Field,
    pub pending: Vec<TransformCommand>,
    pub show_grid: bool,
    pub status: String,
    entities: HashMap<MeshId, Entity>,
}

impl ViewerState {
    pub fn new(viewport: Viewport, config: &ViewerConfig) -> Self {
        Self {
            viewport,
            extent_field: Vector3Field::new("Apply Model Scaling", config.fields.extent),
            translation_field: Vector3Field::new("Apply Model Move", config.fields.translation),
            pending: Vec::new(),
            show_grid: true,
            status: "Click a model to select it".to_string(),
            entities: HashMap::new(),
        }
    }

    pub fn track(&mut self, entity: Entity) -> MeshId {
        let id = mesh_id(entity);
        self.entities.insert(id, entity);
        id
    }

    pub fn entity(&self, mesh: MeshId) -> Option<Entity> {
        self.entities.get(&mesh).copied()
    }

    /// `None` for entities that are not tracked meshes (the window, the plane, gizmos).
    pub fn mesh_of(&self, entity: Entity) -> Option<MeshId> {
        let id = mesh_id(entity);
        self.entities.contains_key(&id).then_some(id)
    }

    pub fn entities(&self) -> &HashMap<MeshId, Entity> {
        &self.entities
    }

    pub fn queue_action(&mut self, action: FieldAction) {
        match self.viewport.resolve(action) {
            Some(command) => {
                debug!(?command, "transform queued");
                self.pending.push(command);
            }
            None => self.status = "Select a model first".to_string(),
        }
    }

    pub fn selected_model_name(&self) -> Option<&str> {
        self.viewport
            .session()
            .selected_model(self.viewport.scene())
            .map(|group| group.name.as_str())
    }
}
