use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_3, TAU};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid {field} in {}: {problem}", .path.display())]
    Invalid {
        path: PathBuf,
        field: &'static str,
        problem: String,
    },
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub clear_color: (f32, f32, f32),
    pub camera: CameraSettings,
    pub highlight: HighlightSettings,
    pub retarget: RetargetSettings,
    pub inflate: InflateSettings,
    pub reference_plane: ReferencePlaneSettings,
    pub fields: FieldDefaults,
    pub models: Vec<DemoModel>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            clear_color: (0.2, 0.2, 0.2),
            camera: CameraSettings::default(),
            highlight: HighlightSettings::default(),
            retarget: RetargetSettings::default(),
            inflate: InflateSettings::default(),
            reference_plane: ReferencePlaneSettings::default(),
            fields: FieldDefaults::default(),
            models: default_demo_models(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: [f32; 3],
    pub wheel_precision: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            alpha: FRAC_PI_3,
            beta: FRAC_PI_3,
            radius: 6.0,
            target: [0.0, 0.0, 0.0],
            wheel_precision: 12.0,
            min_radius: 0.5,
            max_radius: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    pub primary_tint: (f32, f32, f32),
    pub secondary_tint: (f32, f32, f32),
    pub pulse_increment: f32,
    pub blur_base: f32,
    pub blur_amplitude: f32,
    pub phase_ceiling: f32,
}

impl HighlightSettings {
    pub fn blur_at(&self, phase: f32) -> f32 {
        self.blur_base + phase.cos() * self.blur_amplitude + self.blur_amplitude
    }
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            primary_tint: (1.0, 1.0, 0.0),
            secondary_tint: (1.0, 0.55, 0.1),
            pulse_increment: 0.02,
            blur_base: 0.3,
            blur_amplitude: 0.2,
            phase_ceiling: TAU * 4096.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetSettings {
    pub frame_rate: f32,
    pub frame_count: f32,
    pub speed: f32,
}

impl Default for RetargetSettings {
    fn default() -> Self {
        Self {
            frame_rate: 24.0,
            frame_count: 24.0,
            speed: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InflateSettings {
    pub frame_rate: f32,
    pub scale_to: [f32; 3],
    pub scale_frames: f32,
    pub flight_target: [f32; 3],
    pub flight_frames: f32,
}

impl Default for InflateSettings {
    fn default() -> Self {
        Self {
            frame_rate: 24.0,
            scale_to: [1.5, 1.5, 1.5],
            scale_frames: 24.0,
            flight_target: [0.0, 40.0, 0.0],
            flight_frames: 72.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePlaneSettings {
    pub extent: f32,
    pub cell_size: f32,
    pub major_every: u32,
    pub opacity: f32,
}

impl Default for ReferencePlaneSettings {
    fn default() -> Self {
        Self {
            extent: 10.0,
            cell_size: 0.5,
            major_every: 5,
            opacity: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefaults {
    pub extent: [f32; 3],
    pub translation: [f32; 3],
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            extent: [1.25, 1.25, 1.25],
            translation: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartShape {
    Cuboid { size: [f32; 3] },
    Sphere { radius: f32 },
    Cylinder { radius: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDefinition {
    pub shape: PartShape,
    #[serde(default)]
    pub offset: [f32; 3],
    #[serde(default = "default_part_color")]
    pub color: (f32, f32, f32),
}

fn default_part_color() -> (f32, f32, f32) {
    (0.7, 0.7, 0.72)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoModel {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "unit_scaling")]
    pub scaling: [f32; 3],
    pub root: PartDefinition,
    #[serde(default)]
    pub children: Vec<PartDefinition>,
}

fn unit_scaling() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

pub fn default_demo_models() -> Vec<DemoModel> {
    let part = |shape, offset, color| PartDefinition {
        shape,
        offset,
        color,
    };
    vec![
        DemoModel {
            name: "combi".to_string(),
            position: [0.0, 0.5, 0.0],
            scaling: unit_scaling(),
            root: part(
                PartShape::Cuboid {
                    size: [1.0, 1.0, 1.0],
                },
                [0.0, 0.0, 0.0],
                (0.62, 0.42, 0.24),
            ),
            children: vec![
                part(PartShape::Sphere { radius: 0.3 }, [0.0, 0.8, 0.0], (0.3, 0.55, 0.8)),
                part(
                    PartShape::Cylinder {
                        radius: 0.15,
                        height: 0.8,
                    },
                    [0.9, 0.0, 0.0],
                    (0.35, 0.7, 0.4),
                ),
                part(
                    PartShape::Cylinder {
                        radius: 0.15,
                        height: 0.8,
                    },
                    [-0.9, 0.0, 0.0],
                    (0.35, 0.7, 0.4),
                ),
            ],
        },
        DemoModel {
            name: "tower".to_string(),
            position: [-3.0, 1.0, -2.0],
            scaling: unit_scaling(),
            root: part(
                PartShape::Cylinder {
                    radius: 0.5,
                    height: 2.0,
                },
                [0.0, 0.0, 0.0],
                (0.48, 0.44, 0.4),
            ),
            children: Vec::new(),
        },
        DemoModel {
            name: "crate".to_string(),
            position: [3.0, 0.4, 1.5],
            scaling: [0.8, 0.8, 0.8],
            root: part(
                PartShape::Cuboid {
                    size: [1.0, 1.0, 1.0],
                },
                [0.0, 0.0, 0.0],
                (0.58, 0.36, 0.2),
            ),
            children: Vec::new(),
        },
    ]
}

impl ViewerConfig {
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |field, problem: String| ConfigError::Invalid {
            path: path.to_path_buf(),
            field,
            problem,
        };
        let positive = |field, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(invalid(field, format!("must be a positive number, got {value}")))
            }
        };

        let camera = &self.camera;
        for (field, value) in [
            ("camera.alpha", camera.alpha),
            ("camera.beta", camera.beta),
            ("camera.radius", camera.radius),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value}")));
            }
        }
        positive("camera.min_radius", camera.min_radius)?;
        positive("camera.max_radius", camera.max_radius)?;
        if camera.min_radius > camera.max_radius {
            return Err(invalid(
                "camera.min_radius",
                format!(
                    "{} is above max_radius {}",
                    camera.min_radius, camera.max_radius
                ),
            ));
        }
        positive("camera.wheel_precision", camera.wheel_precision)?;

        positive("highlight.phase_ceiling", self.highlight.phase_ceiling)?;
        positive("retarget.frame_rate", self.retarget.frame_rate)?;
        positive("retarget.frame_count", self.retarget.frame_count)?;
        positive("retarget.speed", self.retarget.speed)?;
        positive("inflate.frame_rate", self.inflate.frame_rate)?;
        positive("inflate.scale_frames", self.inflate.scale_frames)?;
        positive("inflate.flight_frames", self.inflate.flight_frames)?;
        Ok(())
    }
}

pub fn parse_viewer_config(text: &str, path: &Path) -> Result<ViewerConfig, ConfigError> {
    let config = ron::de::from_str::<ViewerConfig>(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate(path)?;
    Ok(config)
}

// A missing file is not an error; the built-in defaults apply.
pub fn load_viewer_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if !path.exists() {
        return Ok(ViewerConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_viewer_config(&text, path)
}

pub fn load_or_default(path: &Path) -> ViewerConfig {
    match load_viewer_config(path) {
        Ok(config) => {
            info!(path = %path.display(), models = config.models.len(), "viewer config loaded");
            config
        }
        Err(err) => {
            warn!("Falling back to built-in viewer config: {err}");
            ViewerConfig::default()
        }
    }
}
