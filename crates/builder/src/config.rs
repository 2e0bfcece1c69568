use crate::error::SetupError;
use glam::Vec3;
use roomscene_common::Color;
use roomscene_input::OrbitSettings;
use roomscene_scene::ShadowConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Room dimensions and colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub width: f32,
    pub depth: f32,
    pub wall_thickness: f32,
    pub wall_height: f32,
    pub wall_color: Color,
    pub floor_color: Color,
    pub floor_thickness: f32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: 20.0,
            depth: 10.0,
            wall_thickness: 0.5,
            wall_height: 5.0,
            wall_color: Color::from_hex(0x00ff00),
            floor_color: Color::from_hex(0xcecece),
            floor_thickness: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub point_color: Color,
    pub point_intensity: f32,
    pub point_position: Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowConfig,
    pub helper_size: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: Color::WHITE,
            ambient_intensity: 0.6,
            point_color: Color::WHITE,
            point_intensity: 0.5,
            point_position: Vec3::new(0.0, 100.0, 0.0),
            cast_shadow: true,
            shadow: ShadowConfig::default(),
            helper_size: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 500.0,
            position: Vec3::new(0.0, 10.0, 25.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub size: f32,
    pub position: Vec3,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            size: 5.0,
            position: Vec3::new(0.0, 10.0, 0.0),
        }
    }
}

/// Frame loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub initial_time: f64,
    /// Time added per frame.
    pub step: f64,
    /// Distance of the light from the origin.
    pub orbit_radius: f64,
    /// Run the orbit controls' damping step inside the frame loop.
    pub update_controls: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            initial_time: 1.0,
            step: 0.005,
            orbit_radius: 30.0,
            update_controls: true,
        }
    }
}

/// Everything the scene builder needs, with defaults matching the demo room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background: Color,
    pub room: RoomConfig,
    pub lighting: LightingConfig,
    pub camera: CameraConfig,
    pub axes: AxesConfig,
    pub frame: FrameConfig,
    pub orbit: OrbitSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: Color::from_hex(0x4a4a4a),
            room: RoomConfig::default(),
            lighting: LightingConfig::default(),
            camera: CameraConfig::default(),
            axes: AxesConfig::default(),
            frame: FrameConfig::default(),
            orbit: OrbitSettings::default(),
        }
    }
}

impl SceneConfig {
    /// Load a JSON config. Missing fields fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| SetupError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SceneConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        tracing::info!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, SetupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
