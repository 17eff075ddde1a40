use crate::viewer::animation::{
    ActivePlayback, AnimationSink, AnimationTarget, PlaybackRequest, TrackProperty,
};
use crate::viewer::camera::OrbitCameraState;
use crate::viewer::scene::ViewerCamera;
use crate::viewer::state::ViewerState;
use bevy::prelude::*;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackUpdate {
    pub target: AnimationTarget,
    pub property: TrackProperty,
    pub value: Vec3,
}

#[derive(Resource, Default)]
pub struct AnimationQueue {
    pending: Vec<PlaybackRequest>,
    active: Vec<ActivePlayback>,
}

impl AnimationSink for AnimationQueue {
    fn submit(&mut self, request: PlaybackRequest) {
        debug!(animated = ?request.target, clips = request.clips.len(), "playback submitted");
        self.pending.push(request);
    }
}

impl AnimationQueue {
    pub fn is_running(&self) -> bool {
        !self.pending.is_empty() || !self.active.is_empty()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn step(&mut self, delta_secs: f32) -> Vec<TrackUpdate> {
        self.active
            .extend(self.pending.drain(..).map(ActivePlayback::new));

        let mut updates = Vec::new();
        for playback in &mut self.active {
            let target = playback.target();
            updates.extend(
                playback
                    .advance(delta_secs)
                    .into_iter()
                    .map(|(property, value)| TrackUpdate {
                        target,
                        property,
                        value,
                    }),
            );
        }
        self.active.retain(|playback| !playback.is_finished());
        updates
    }
}

pub fn advance_animations(
    time: Res<Time>,
    state: Res<ViewerState>,
    mut queue: ResMut<AnimationQueue>,
    mut orbit: ResMut<OrbitCameraState>,
    mut transforms: Query<&mut Transform, Without<ViewerCamera>>,
) {
    if !queue.is_running() {
        return;
    }

    for update in queue.step(time.delta_secs()) {
        match update.target {
            AnimationTarget::Camera(scene) => {
                if scene == state.viewport.scene() && update.property == TrackProperty::Target {
                    orbit.target = update.value;
                }
            }
            AnimationTarget::Mesh(mesh) => {
                let Some(entity) = state.entity(mesh) else {
                    continue;
                };
                let Ok(mut transform) = transforms.get_mut(entity) else {
                    continue;
                };
                match update.property {
                    TrackProperty::Scaling => transform.scale = update.value,
                    TrackProperty::Position => transform.translation = update.value,
                    TrackProperty::Target => {}
                }
            }
        }
    }
}
