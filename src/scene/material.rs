//! Material descriptors
//!
//! Fixed constants. The host decides how far to honour each parameter; the
//! SDF pipeline approximates transmission with a single refracted ray.

use serde::{Deserialize, Serialize};

/// sRGB color from a 0xRRGGBB literal, components in 0..=1
pub const fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Physically based glass with transmission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransmissionMaterial {
    pub color: [f32; 3],
    pub transmission: f32,
    pub roughness: f32,
    /// Virtual thickness used for refraction and attenuation
    pub thickness: f32,
    /// Index of refraction
    pub ior: f32,
    pub chromatic_aberration: f32,
    pub anisotropy: f32,
    pub distortion: f32,
    pub distortion_scale: f32,
    pub temporal_distortion: f32,
    pub clearcoat: f32,
    pub attenuation_color: [f32; 3],
    pub attenuation_distance: f32,
    /// Render back faces too
    pub backside: bool,
    /// Transmission samples per pixel
    pub samples: u32,
    /// Transmission buffer resolution
    pub resolution: u32,
}

impl TransmissionMaterial {
    /// Smoked glass for the die body
    pub const SMOKED_GLASS: Self = Self {
        color: hex_rgb(0x202020),
        transmission: 1.0,
        roughness: 0.0,
        thickness: 1.5,
        ior: 1.5,
        chromatic_aberration: 0.06,
        anisotropy: 0.1,
        distortion: 0.1,
        distortion_scale: 0.2,
        temporal_distortion: 0.0,
        clearcoat: 1.0,
        attenuation_color: hex_rgb(0xffffff),
        attenuation_distance: 0.75,
        backside: true,
        samples: 16,
        resolution: 1024,
    };

    /// Fraction of light surviving a path of `distance` through the glass (per channel)
    pub fn attenuation(&self, distance: f32) -> [f32; 3] {
        // Beer-Lambert with the color reached after `attenuation_distance`
        let k = distance / self.attenuation_distance;
        self.attenuation_color.map(|c| c.max(1e-4).powf(k))
    }
}

/// Self-lit material for the pips
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissiveMaterial {
    pub color: [f32; 3],
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    /// Whether the host should tone-map this material
    pub tone_mapped: bool,
}

impl EmissiveMaterial {
    pub const GLOWING_PIP: Self = Self {
        color: hex_rgb(0xffffff),
        roughness: 0.0,
        emissive: hex_rgb(0xffffff),
        emissive_intensity: 1.5,
        tone_mapped: false,
    };

    /// Emitted radiance (emissive color times intensity)
    pub fn radiance(&self) -> [f32; 3] {
        self.emissive.map(|c| c * self.emissive_intensity)
    }
}

/// Material attached to a mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    Transmission(TransmissionMaterial),
    Emissive(EmissiveMaterial),
}
