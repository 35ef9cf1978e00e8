//! Cloud settings persistence
//!
//! Everything tunable at runtime lives here, serialized to JSON so a
//! tweaked look survives restarts.

use crate::cloud::{Aabb, CloudParams};
use crate::math3d::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// All tunable parameters for the cloud scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudSettings {
    pub box_min: [f32; 3],
    pub box_max: [f32; 3],
    pub steps: u32,
    pub density_scale: f32,
    pub density_power: f32,
    pub noise_scale: f32,
    pub color: [f32; 3],
    /// Noise drift speed, in time units per second
    pub animation_speed: f32,
    /// Camera orbit speed in radians per second
    pub orbit_speed: f32,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            box_min: [-1.0, -1.0, -1.0],
            box_max: [1.0, 1.0, 1.0],
            steps: 64,
            density_scale: 2.0,
            density_power: 2.0,
            noise_scale: 1.0,
            color: [1.0, 1.0, 1.0],
            animation_speed: 0.5,
            orbit_speed: 0.2,
        }
    }
}

impl CloudSettings {
    /// The box the cloud is confined to
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            Vec3::new(self.box_min[0], self.box_min[1], self.box_min[2]),
            Vec3::new(self.box_max[0], self.box_max[1], self.box_max[2]),
        )
    }

    /// Per-evaluation parameters for the cloud core
    pub fn params(&self) -> CloudParams {
        CloudParams {
            steps: self.steps.max(1),
            density_scale: self.density_scale,
            density_power: self.density_power,
            noise_scale: self.noise_scale,
            color: Vec3::new(self.color[0], self.color[1], self.color[2]),
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }
}
