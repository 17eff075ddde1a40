use crate::viewer::animation::{
    AnimationClip, AnimationTarget, Keyframe, LoopMode, PlaybackRequest, TrackProperty,
};
use crate::viewer::config::{CameraSettings, RetargetSettings};
use crate::viewer::scene::ViewerCamera;
use crate::viewer::session::{SceneId, ViewportHost};
use crate::viewer::ui::PanelFocus;
use bevy::camera::Viewport;
use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll};
use bevy::math::curve::easing::EaseFunction;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, Window};
use std::f32::consts::PI;
use tracing::debug;

const BETA_LIMIT: f32 = 0.01;
const ROTATE_SPEED: f32 = 0.006;
const PAN_SPEED: f32 = 0.0018;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveCamera {
    Orbit { target: Vec3 },
    Fixed,
}

/// Ease an orbit camera's look-at point over to `new_target`. Orientation and
/// radius are left alone; `false` when the scene has no orbit camera.
pub fn retarget_camera<H: ViewportHost + ?Sized>(
    scene: SceneId,
    new_target: Vec3,
    host: &mut H,
    settings: &RetargetSettings,
) -> bool {
    let current = match host.active_camera(scene) {
        Some(ActiveCamera::Orbit { target }) => target,
        Some(ActiveCamera::Fixed) | None => {
            debug!(?scene, "retarget skipped, no orbit camera");
            return false;
        }
    };

    // Declared as a cycling clip but played once; the request's `looping` wins.
    let clip = AnimationClip::new(
        "target",
        TrackProperty::Target,
        settings.frame_rate,
        LoopMode::Cycle,
    )
    .with_easing(EaseFunction::SineOut)
    .with_keys([
        Keyframe::new(0.0, current),
        Keyframe::new(settings.frame_count, new_target),
    ]);

    host.submit(PlaybackRequest {
        target: AnimationTarget::Camera(scene),
        clips: vec![clip],
        from_frame: 0.0,
        to_frame: settings.frame_count,
        looping: false,
        speed: settings.speed,
    });
    debug!(?scene, from = ?current, to = ?new_target, "camera retarget submitted");
    true
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitCameraState {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Vec3,
    pub wheel_precision: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for OrbitCameraState {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

impl OrbitCameraState {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            alpha: settings.alpha,
            beta: settings.beta.clamp(BETA_LIMIT, PI - BETA_LIMIT),
            radius: settings.radius.clamp(settings.min_radius, settings.max_radius),
            target: Vec3::from_array(settings.target),
            wheel_precision: settings.wheel_precision.max(f32::EPSILON),
            min_radius: settings.min_radius,
            max_radius: settings.max_radius,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_alpha, cos_alpha) = self.alpha.sin_cos();
        let (sin_beta, cos_beta) = self.beta.sin_cos();
        self.target
            + self.radius * Vec3::new(cos_alpha * sin_beta, cos_beta, sin_alpha * sin_beta)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.target, Vec3::Y)
    }

    pub fn rotate(&mut self, delta: Vec2) {
        self.alpha -= delta.x * ROTATE_SPEED;
        self.beta = (self.beta - delta.y * ROTATE_SPEED).clamp(BETA_LIMIT, PI - BETA_LIMIT);
    }

    pub fn pan(&mut self, delta: Vec2) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let mut right = forward.cross(Vec3::Y);
        if right.length_squared() < 1e-6 {
            right = Vec3::X;
        }
        let right = right.normalize();
        let up = right.cross(forward).normalize_or_zero();
        self.target += (-delta.x * right + delta.y * up) * self.radius * PAN_SPEED;
    }

    pub fn zoom(&mut self, scroll: f32) {
        let step = self.radius / self.wheel_precision;
        self.radius = (self.radius - scroll * step).clamp(self.min_radius, self.max_radius);
    }
}

pub fn viewport_beside_panel(window: UVec2, scale_factor: f32, panel_width: f32) -> Option<Viewport> {
    if window.x == 0 || window.y == 0 {
        return None;
    }
    let panel = (panel_width.max(0.0) * scale_factor) as u32;
    let x = panel.min(window.x - 1);
    Some(Viewport {
        physical_position: UVec2::new(x, 0),
        physical_size: UVec2::new(window.x - x, window.y),
        depth: 0.0..1.0,
    })
}

pub fn update_camera_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    focus: Res<PanelFocus>,
    mut cameras: Query<&mut Camera, With<ViewerCamera>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = UVec2::new(window.physical_width(), window.physical_height());
    let Some(viewport) = viewport_beside_panel(size, window.scale_factor(), focus.panel_width)
    else {
        return;
    };
    for mut camera in &mut cameras {
        camera.viewport = Some(viewport.clone());
    }
}

pub fn orbit_camera_system(
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    focus: Res<PanelFocus>,
    mut orbit: ResMut<OrbitCameraState>,
    mut camera_query: Query<&mut Transform, With<ViewerCamera>>,
) {
    let mouse_delta = Vec2::new(mouse_motion.delta.x, -mouse_motion.delta.y);
    let scroll_delta = mouse_scroll.delta.y;

    let pointer_in_window = windows
        .single()
        .ok()
        .and_then(|w| w.cursor_position())
        .is_some();

    if pointer_in_window && !focus.pointer_over_ui {
        if mouse_buttons.pressed(MouseButton::Right) && mouse_delta.length_squared() > 0.0 {
            orbit.rotate(mouse_delta);
        }
        if mouse_buttons.pressed(MouseButton::Middle) && mouse_delta.length_squared() > 0.0 {
            orbit.pan(mouse_delta);
        }
        if scroll_delta.abs() > f32::EPSILON {
            orbit.zoom(scroll_delta);
        }
    }

    let transform = orbit.transform();
    for mut camera_transform in &mut camera_query {
        *camera_transform = transform;
    }
}
