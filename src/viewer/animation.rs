use crate::viewer::session::{MeshId, SceneId};
use bevy::math::Vec3;
use bevy::math::curve::Curve;
use bevy::math::curve::easing::EaseFunction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackProperty {
    Scaling,
    Position,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Cycle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: f32,
    pub value: Vec3,
}

impl Keyframe {
    pub fn new(frame: f32, value: Vec3) -> Self {
        Self { frame, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub property: TrackProperty,
    pub frame_rate: f32,
    pub loop_mode: LoopMode,
    pub easing: EaseFunction,
    keys: Vec<Keyframe>,
}

impl AnimationClip {
    pub fn new(
        name: impl Into<String>,
        property: TrackProperty,
        frame_rate: f32,
        loop_mode: LoopMode,
    ) -> Self {
        Self {
            name: name.into(),
            property,
            frame_rate,
            loop_mode,
            easing: EaseFunction::Linear,
            keys: Vec::new(),
        }
    }

    pub fn with_easing(mut self, easing: EaseFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = Keyframe>) -> Self {
        self.keys.extend(keys);
        self.keys.sort_by(|a, b| a.frame.total_cmp(&b.frame));
        self
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn last_frame(&self) -> f32 {
        self.keys.last().map_or(0.0, |key| key.frame)
    }

    pub fn sample(&self, frame: f32) -> Option<Vec3> {
        let first = self.keys.first()?;
        if frame <= first.frame {
            return Some(first.value);
        }

        for segment in self.keys.windows(2) {
            let (from, to) = (segment[0], segment[1]);
            if frame > to.frame {
                continue;
            }
            let span = to.frame - from.frame;
            if span <= f32::EPSILON {
                return Some(to.value);
            }
            let gradient = self.easing.sample_clamped((frame - from.frame) / span);
            return Some(from.value.lerp(to.value, gradient));
        }

        self.keys.last().map(|key| key.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationTarget {
    Mesh(MeshId),
    Camera(SceneId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    pub target: AnimationTarget,
    pub clips: Vec<AnimationClip>,
    pub from_frame: f32,
    pub to_frame: f32,
    /// Governs playback; a clip's own `loop_mode` does not.
    pub looping: bool,
    pub speed: f32,
}

pub trait AnimationSink {
    fn submit(&mut self, request: PlaybackRequest);
}

impl AnimationSink for Vec<PlaybackRequest> {
    fn submit(&mut self, request: PlaybackRequest) {
        self.push(request);
    }
}

#[derive(Debug, Clone)]
pub struct ActivePlayback {
    request: PlaybackRequest,
    elapsed_secs: f32,
}

impl ActivePlayback {
    pub fn new(request: PlaybackRequest) -> Self {
        Self {
            request,
            elapsed_secs: 0.0,
        }
    }

    pub fn target(&self) -> AnimationTarget {
        self.request.target
    }

    pub fn advance(&mut self, delta_secs: f32) -> Vec<(TrackProperty, Vec3)> {
        self.elapsed_secs += delta_secs.max(0.0);
        self.request
            .clips
            .iter()
            .filter_map(|clip| {
                let frame = self.frame_for(clip);
                clip.sample(frame).map(|value| (clip.property, value))
            })
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        if self.request.looping {
            return false;
        }
        if self.request.speed <= 0.0 {
            return true;
        }
        self.request
            .clips
            .iter()
            .all(|clip| self.raw_frame(clip) >= self.request.to_frame)
    }

    fn raw_frame(&self, clip: &AnimationClip) -> f32 {
        self.request.from_frame + self.elapsed_secs * clip.frame_rate * self.request.speed
    }

    fn frame_for(&self, clip: &AnimationClip) -> f32 {
        let (from, to) = (self.request.from_frame, self.request.to_frame);
        let raw = self.raw_frame(clip);
        let range = to - from;
        if range <= 0.0 {
            return to;
        }
        if self.request.looping {
            from + (raw - from).rem_euclid(range)
        } else {
            raw.min(to)
        }
    }
}
