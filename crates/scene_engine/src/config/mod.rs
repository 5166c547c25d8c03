//! Configuration system
//!
//! All tunable scene parameters live here: window dimensions, camera lens,
//! wave-grid setup, the random ripple policy, and picking thresholds. Configs
//! serialize to TOML and every struct has sensible defaults so the demo runs
//! without a config file on disk.

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Window dimensions used for viewport-dependent constants and picking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Client width in pixels
    pub width: u32,
    /// Client height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Camera lens and movement parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Near clip plane distance
    pub near_z: f32,
    /// Far clip plane distance
    pub far_z: f32,
    /// Walk/strafe speed in world units per second
    pub move_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near_z: 1.0,
            far_z: 1000.0,
            move_speed: 10.0,
        }
    }
}

/// Wave-field grid and integration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Grid rows
    pub rows: usize,
    /// Grid columns
    pub cols: usize,
    /// Distance between adjacent grid vertices
    pub spatial_step: f32,
    /// Fixed simulation timestep in seconds
    pub time_step: f32,
    /// Wave propagation speed
    pub speed: f32,
    /// Damping coefficient
    pub damping: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            rows: 128,
            cols: 128,
            spatial_step: 1.0,
            time_step: 0.03,
            speed: 4.0,
            damping: 0.2,
        }
    }
}

/// Random ripple policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RippleConfig {
    /// Real-time interval between ripples in seconds
    pub interval: f32,
    /// Minimum impulse magnitude
    pub min_magnitude: f32,
    /// Maximum impulse magnitude
    pub max_magnitude: f32,
    /// Minimum distance (in cells) a ripple center keeps from the grid edge
    pub edge_margin: usize,
    /// RNG seed; a fixed seed gives a reproducible ripple sequence
    pub seed: u64,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            interval: 0.25,
            min_magnitude: 0.2,
            max_magnitude: 0.5,
            edge_margin: 4,
            seed: 0x5eed,
        }
    }
}

/// Picking thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickingConfig {
    /// Hits at or below this distance set the movement-blocked flag
    pub block_distance: f32,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            block_distance: 2.0,
        }
    }
}

/// Top-level scene configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Window dimensions
    pub window: WindowConfig,
    /// Camera parameters
    pub camera: CameraConfig,
    /// Wave simulation parameters
    pub waves: WaveConfig,
    /// Random ripple policy
    pub ripples: RippleConfig,
    /// Picking thresholds
    pub picking: PickingConfig,
}

impl SceneConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
