//! Display settings and preferences
//!
//! Persisted in LocalStorage on the web; defaults everywhere else.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum raymarch steps per pixel
    pub fn raymarch_steps(&self) -> u32 {
        match self {
            QualityPreset::Low => 48,
            QualityPreset::Medium => 96,
            QualityPreset::High => 160,
        }
    }

    /// Upper bound on the device pixel ratio used for the canvas
    pub fn max_pixel_ratio(&self) -> f64 {
        match self {
            QualityPreset::Low => 1.0,
            QualityPreset::Medium => 1.5,
            QualityPreset::High => 2.0,
        }
    }

    /// Whether the glass splits colors along the refracted ray
    pub fn chromatic_aberration(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

/// Viewer settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Motion ===
    /// Idle bob/wobble on top of the spin
    #[serde(default = "default_true")]
    pub idle_float: bool,

    // === HUD ===
    /// Show FPS counter
    #[serde(default)]
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (no bob/wobble)
    #[serde(default)]
    pub reduced_motion: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            idle_float: true,
            show_fps: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective idle float (respects reduced_motion)
    pub fn effective_idle_float(&self) -> bool {
        self.idle_float && !self.reduced_motion
    }

    /// Clamp a device pixel ratio to what the preset allows (never below 1)
    pub fn pixel_ratio(&self, device_pixel_ratio: f64) -> f64 {
        if !device_pixel_ratio.is_finite() {
            return 1.0;
        }
        device_pixel_ratio.clamp(1.0, self.quality.max_pixel_ratio())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "crystal_die_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
