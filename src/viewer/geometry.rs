use crate::viewer::animation::{
    AnimationClip, AnimationSink, AnimationTarget, Keyframe, LoopMode, PlaybackRequest,
    TrackProperty,
};
use crate::viewer::config::InflateSettings;
use crate::viewer::session::MeshId;
use bevy::math::Vec3;
use bevy::math::curve::easing::EaseFunction;
use std::fmt;
use tracing::debug;

pub trait EditableGeometry {
    /// `None` when the mesh carries no position attribute.
    fn positions_mut(&mut self) -> Option<&mut [f32]>;

    fn pivot(&self) -> Vec3;

    fn refresh_bounds(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        let mut vertices = positions
            .chunks_exact(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]));
        let first = vertices.next()?;
        let (min, max) = vertices.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));
        Some(Self { min, max })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoGeometry,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoGeometry => f.write_str("mesh has no position data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOutcome {
    Applied { vertices: usize },
    Skipped(SkipReason),
}

pub fn extend_mesh<G: EditableGeometry + ?Sized>(mesh: &mut G, factor: Vec3) -> TransformOutcome {
    let pivot = mesh.pivot();
    let Some(positions) = mesh.positions_mut() else {
        debug!("extend skipped, no position data");
        return TransformOutcome::Skipped(SkipReason::NoGeometry);
    };

    let mut vertices = 0;
    for vertex in positions.chunks_exact_mut(3) {
        let offset = Vec3::new(vertex[0], vertex[1], vertex[2]) - pivot;
        let extended = pivot + offset * factor;
        vertex.copy_from_slice(&extended.to_array());
        vertices += 1;
    }

    mesh.refresh_bounds();
    TransformOutcome::Applied { vertices }
}

pub fn move_mesh<G: EditableGeometry + ?Sized>(mesh: &mut G, distance: Vec3) -> TransformOutcome {
    let Some(positions) = mesh.positions_mut() else {
        debug!("move skipped, no position data");
        return TransformOutcome::Skipped(SkipReason::NoGeometry);
    };

    let mut vertices = 0;
    for vertex in positions.chunks_exact_mut(3) {
        let moved = Vec3::new(vertex[0], vertex[1], vertex[2]) + distance;
        vertex.copy_from_slice(&moved.to_array());
        vertices += 1;
    }

    mesh.refresh_bounds();
    TransformOutcome::Applied { vertices }
}

pub fn inflate_mesh<S: AnimationSink + ?Sized>(
    mesh: MeshId,
    position: Vec3,
    settings: &InflateSettings,
    sink: &mut S,
) {
    let scaling = AnimationClip::new(
        "scaling",
        TrackProperty::Scaling,
        settings.frame_rate,
        LoopMode::Once,
    )
    .with_easing(EaseFunction::SineOut)
    .with_keys([
        Keyframe::new(0.0, Vec3::ONE),
        Keyframe::new(settings.scale_frames, Vec3::from_array(settings.scale_to)),
    ]);

    let flight = AnimationClip::new(
        "position",
        TrackProperty::Position,
        settings.frame_rate,
        LoopMode::Once,
    )
    .with_easing(EaseFunction::SineIn)
    .with_keys([
        Keyframe::new(0.0, position),
        Keyframe::new(
            settings.flight_frames,
            Vec3::from_array(settings.flight_target),
        ),
    ]);

    let to_frame = scaling.last_frame().max(flight.last_frame());
    debug!(?mesh, to_frame, "inflate submitted");
    sink.submit(PlaybackRequest {
        target: AnimationTarget::Mesh(mesh),
        clips: vec![scaling, flight],
        from_frame: 0.0,
        to_frame,
        looping: false,
        speed: 1.0,
    });
}
