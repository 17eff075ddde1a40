pub mod animation;
pub mod camera;
pub mod config;
pub mod editor;
pub mod fields;
pub mod geometry;
pub mod host;
pub mod playback;
pub mod scene;
pub mod selection;
pub mod session;
pub mod state;
#[cfg(test)]
mod testing;
pub mod ui;
pub mod viewport;

use crate::viewer::session::SceneId;

pub const CONFIG_PATH: &str = "config/viewer.ron";
pub const PRIMARY_SCENE: SceneId = SceneId(1);
pub const UI_RENDER_LAYER: usize = 31;
