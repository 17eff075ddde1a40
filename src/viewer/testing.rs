use crate::viewer::animation::{AnimationSink, PlaybackRequest};
use crate::viewer::camera::ActiveCamera;
use crate::viewer::geometry::{Bounds, EditableGeometry};
use crate::viewer::session::{MeshId, SceneId, ViewportHost};
use bevy::math::Vec3;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct FakeHost {
    pub cameras: HashMap<SceneId, ActiveCamera>,
    pub positions: HashMap<MeshId, Vec3>,
    pub submitted: Vec<PlaybackRequest>,
}

impl FakeHost {
    pub fn with_orbit(scene: SceneId, target: Vec3) -> Self {
        let mut host = Self::default();
        host.cameras.insert(scene, ActiveCamera::Orbit { target });
        host
    }

    pub fn place(mut self, mesh: MeshId, position: Vec3) -> Self {
        self.positions.insert(mesh, position);
        self
    }
}

impl AnimationSink for FakeHost {
    fn submit(&mut self, request: PlaybackRequest) {
        self.submitted.push(request);
    }
}

impl ViewportHost for FakeHost {
    fn active_camera(&self, scene: SceneId) -> Option<ActiveCamera> {
        self.cameras.get(&scene).copied()
    }

    fn mesh_position(&self, mesh: MeshId) -> Option<Vec3> {
        self.positions.get(&mesh).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    positions: Option<Vec<f32>>,
    pivot: Vec3,
    bounds: Option<Bounds>,
}

impl MeshGeometry {
    pub fn new(positions: Vec<f32>) -> Self {
        let bounds = Bounds::from_positions(&positions);
        Self {
            positions: Some(positions),
            pivot: Vec3::ZERO,
            bounds,
        }
    }

    pub fn from_vertices(vertices: &[Vec3]) -> Self {
        Self::new(vertices.iter().flat_map(|v| v.to_array()).collect())
    }

    pub fn without_positions() -> Self {
        Self::default()
    }

    pub fn with_pivot(mut self, pivot: Vec3) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn vertices(&self) -> Vec<Vec3> {
        self.positions
            .as_deref()
            .unwrap_or_default()
            .chunks_exact(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
            .collect()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

impl EditableGeometry for MeshGeometry {
    fn positions_mut(&mut self) -> Option<&mut [f32]> {
        self.positions.as_deref_mut()
    }

    fn pivot(&self) -> Vec3 {
        self.pivot
    }

    fn refresh_bounds(&mut self) {
        self.bounds = self.positions.as_deref().and_then(Bounds::from_positions);
    }
}
