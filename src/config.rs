//! Engine configuration
//!
//! Everything the pipeline needs to know that is not level data: view cone,
//! ray resolution tier, traversal budget, input scaling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete ray-count presets. One ray is cast per internal screen column,
/// so the tier doubles as the internal framebuffer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResolutionTier {
    Low,
    #[default]
    Medium,
    High,
    Ultra,
}

impl ResolutionTier {
    /// Rays (= internal columns) cast per frame
    pub fn columns(&self) -> usize {
        match self {
            ResolutionTier::Low => 160,
            ResolutionTier::Medium => 320,
            ResolutionTier::High => 640,
            ResolutionTier::Ultra => 1280,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::Low => "Low",
            ResolutionTier::Medium => "Medium",
            ResolutionTier::High => "High",
            ResolutionTier::Ultra => "Ultra",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("field of view {0} outside the supported 30..=120 degree range")]
    FovOutOfRange(f32),
    #[error("max ray distance must be positive, got {0}")]
    NonPositiveRayDistance(f32),
    #[error("tile size must be positive, got {0}")]
    NonPositiveTileSize(f32),
    #[error("zoom factor must be in (0, 1], got {0}")]
    BadZoomFactor(f32),
}

/// Validated engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Horizontal field of view, degrees; accepted range 30..=120
    pub fov_degrees: f32,
    /// Rays per frame
    pub ray_density: ResolutionTier,
    /// Traversal budget in world units; rays past this render void
    pub max_ray_distance: f32,
    /// World-unit edge of one grid tile
    pub tile_size: f32,
    /// Radians of turn per unit of mouse delta
    pub mouse_sensitivity: f32,
    /// FOV and sensitivity multiplier while aiming down sights
    pub zoom_factor: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            ray_density: ResolutionTier::default(),
            max_ray_distance: 300.0,
            tile_size: 16.0,
            mouse_sensitivity: 0.005,
            zoom_factor: 0.5,
        }
    }
}

impl EngineConfig {
    /// Check the ranges the engine relies on. Call once at construction;
    /// `World::new` refuses an invalid config.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if !(30.0..=120.0).contains(&self.fov_degrees) {
            return Err(ConfigError::FovOutOfRange(self.fov_degrees));
        }
        if self.max_ray_distance <= 0.0 {
            return Err(ConfigError::NonPositiveRayDistance(self.max_ray_distance));
        }
        if self.tile_size <= 0.0 {
            return Err(ConfigError::NonPositiveTileSize(self.tile_size));
        }
        if self.zoom_factor <= 0.0 || self.zoom_factor > 1.0 {
            return Err(ConfigError::BadZoomFactor(self.zoom_factor));
        }
        Ok(self)
    }

    /// Field of view in radians, narrowed by the zoom factor while aiming
    pub fn effective_fov(&self, aiming: bool) -> f32 {
        let fov = self.fov_degrees.to_radians();
        if aiming { fov * self.zoom_factor } else { fov }
    }

    /// Mouse sensitivity, narrowed while aiming
    pub fn effective_sensitivity(&self, aiming: bool) -> f32 {
        if aiming {
            self.mouse_sensitivity * self.zoom_factor
        } else {
            self.mouse_sensitivity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validated().is_ok());
    }

    #[test]
    fn fov_range_is_enforced() {
        let narrow = EngineConfig {
            fov_degrees: 20.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            narrow.validated(),
            Err(ConfigError::FovOutOfRange(_))
        ));
        let wide = EngineConfig {
            fov_degrees: 150.0,
            ..EngineConfig::default()
        };
        assert!(wide.validated().is_err());
    }

    #[test]
    fn aiming_narrows_fov_and_sensitivity() {
        let cfg = EngineConfig::default();
        assert!(cfg.effective_fov(true) < cfg.effective_fov(false));
        assert!(cfg.effective_sensitivity(true) < cfg.effective_sensitivity(false));
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = EngineConfig {
            ray_density: ResolutionTier::High,
            ..EngineConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ray_density, ResolutionTier::High);
        assert_eq!(back.fov_degrees, cfg.fov_degrees);
    }
}
