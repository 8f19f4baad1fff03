//! Game configuration.
//!
//! Every section defaults to the shipped game constants, so a config file
//! only needs the values it overrides.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Visible world width in meters.
pub const VIEWPORT_WIDTH: f32 = 5.0;
/// Visible world height in meters.
pub const VIEWPORT_HEIGHT: f32 = 5.0;
/// GUI viewport width in pixels.
pub const VIEWPORT_GUI_WIDTH: f32 = 800.0;
/// GUI viewport height in pixels.
pub const VIEWPORT_GUI_HEIGHT: f32 = 480.0;

/// Location of the first level image.
pub const LEVEL_01: &str = "levels/level-01.png";

/// Horizontal movement policy while the player is airborne.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AirControl {
    /// Move keys only change horizontal velocity while grounded.
    #[default]
    GroundedOnly,
    /// Move keys always set horizontal velocity.
    Full,
}

/// Player movement tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal speed while a move key is held (m/s).
    pub run_speed: f32,
    /// Vertical velocity applied when a jump starts (m/s).
    pub jump_velocity: f32,
    pub air_control: AirControl,
    /// `|vel.y|` at or below this counts as grounded.
    pub grounded_epsilon: f32,
    /// Seconds the orb power-up lasts.
    pub powerup_duration: f32,
    /// Jump velocity multiplier while the power-up is active.
    pub powerup_jump_multiplier: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            run_speed: 5.0,
            jump_velocity: 5.0,
            air_control: AirControl::GroundedOnly,
            grounded_epsilon: 1.0e-3,
            powerup_duration: 9.0,
            powerup_jump_multiplier: 1.5,
        }
    }
}

/// Camera follow and zoom limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub follow_speed: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Lowest world Y the camera may move to.
    pub floor_y: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            follow_speed: 4.0,
            min_zoom: 0.25,
            max_zoom: 10.0,
            floor_y: -1.0,
        }
    }
}

/// Bat flock tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatConfig {
    pub enabled: bool,
    /// Distance between initial bats; also one bat per `spacing` meters of level.
    pub spacing: f32,
    pub base_speed: f32,
    /// Upper bound of the random extra speed added to `base_speed`.
    pub speed_jitter: f32,
    /// Bats left of this X are recycled.
    pub despawn_x: f32,
    /// Distance past the level end where recycled bats respawn.
    pub spawn_margin: f32,
}

impl Default for BatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spacing: 5.0,
            base_speed: 2.0,
            speed_jitter: 0.75,
            despawn_x: -10.0,
            spawn_margin: 10.0,
        }
    }
}

/// Physics world tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: [f32; 2],
    pub velocity_iterations: usize,
    pub position_iterations: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81],
            velocity_iterations: 8,
            position_iterations: 3,
        }
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub max_lives: i32,
    pub candycorn_score: u32,
    pub orb_score: u32,
    /// Seconds between running out of lives and returning to the menu.
    pub game_over_delay: f32,
    /// The player loses a life below this world Y.
    pub fall_threshold: f32,
    /// Seed for bat spawning.
    pub rng_seed: u64,
    /// Enables free-camera keys while the camera is not locked to the player.
    pub debug_camera: bool,
    pub player: PlayerConfig,
    pub camera: CameraConfig,
    pub bats: BatConfig,
    pub physics: PhysicsConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_lives: 3,
            candycorn_score: 50,
            orb_score: 250,
            game_over_delay: 5.0,
            fall_threshold: -5.0,
            rng_seed: 12345,
            debug_camera: true,
            player: PlayerConfig::default(),
            camera: CameraConfig::default(),
            bats: BatConfig::default(),
            physics: PhysicsConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lives < 0 {
            return Err(invalid("max_lives", "must not be negative"));
        }
        if self.game_over_delay.is_nan() || self.game_over_delay < 0.0 {
            return Err(invalid("game_over_delay", "must be a non-negative number"));
        }
        if self.camera.min_zoom <= 0.0 || self.camera.min_zoom > self.camera.max_zoom {
            return Err(invalid(
                "camera.min_zoom",
                "must be positive and not larger than camera.max_zoom",
            ));
        }
        if self.physics.velocity_iterations == 0 {
            return Err(invalid("physics.velocity_iterations", "must be at least 1"));
        }
        if self.bats.enabled && self.bats.spacing <= 0.0 {
            return Err(invalid("bats.spacing", "must be positive when bats are enabled"));
        }
        if self.bats.speed_jitter.is_nan() || self.bats.speed_jitter < 0.0 {
            return Err(invalid("bats.speed_jitter", "must be a non-negative number"));
        }
        if self.player.grounded_epsilon < 0.0 {
            return Err(invalid("player.grounded_epsilon", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_lives, 3);
        assert_eq!(config.candycorn_score, 50);
        assert_eq!(config.physics.velocity_iterations, 8);
        assert_eq!(config.physics.position_iterations, 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "max_lives": 5,
            "player": { "air_control": "full" }
        }"#;

        let config = GameConfig::from_json(json).expect("Failed to parse config");

        assert_eq!(config.max_lives, 5);
        assert_eq!(config.player.air_control, AirControl::Full);
        assert_eq!(config.player.run_speed, 5.0);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = GameConfig {
            rng_seed: 99,
            ..GameConfig::default()
        };
        let json = config.to_json().expect("Failed to serialize");
        let loaded = GameConfig::from_json(&json).expect("Failed to deserialize");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_zoom_range_rejected() {
        let json = r#"{ "camera": { "min_zoom": 4.0, "max_zoom": 2.0 } }"#;
        let err = GameConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.min_zoom", .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = GameConfig::from_json("{ max_lives: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
