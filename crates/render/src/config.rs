use serde::{Deserialize, Serialize};

/// GPU adapter preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    #[default]
    HighPerformance,
    LowPower,
    None,
}

/// Shadow map filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowMapType {
    #[default]
    Basic,
    Pcf,
    PcfSoft,
}

/// Antialiasing costs too much on high-density displays; only enable it at
/// pixel ratio 1 or below.
pub fn antialias_for_pixel_ratio(pixel_ratio: f64) -> bool {
    !(pixel_ratio > 1.0)
}

/// Renderer settings resolved at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    pub antialias: bool,
    pub power_preference: PowerPreference,
    pub shadow_map_enabled: bool,
    pub shadow_map_type: ShadowMapType,
    pub pixel_ratio: f64,
    pub width: u32,
    pub height: u32,
}

impl RendererConfig {
    pub fn for_surface(width: u32, height: u32, pixel_ratio: f64) -> Self {
        let antialias = antialias_for_pixel_ratio(pixel_ratio);
        tracing::debug!(pixel_ratio, antialias, "renderer antialiasing chosen");
        Self {
            antialias,
            power_preference: PowerPreference::HighPerformance,
            shadow_map_enabled: true,
            shadow_map_type: ShadowMapType::Basic,
            pixel_ratio,
            width,
            height,
        }
    }

    /// MSAA sample count implied by the antialias flag.
    pub fn sample_count(&self) -> u32 {
        if self.antialias { 4 } else { 1 }
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::for_surface(1280, 720, 1.0)
    }
}
