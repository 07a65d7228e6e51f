use serde::{Deserialize, Serialize};

/// Tuning for the simulation, provided by the game shell.
///
/// Every field has a default, so a JSON override only needs the keys it
/// changes: `{"gravity": 600.0}` is a complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Largest frame delta accepted before accumulation. Larger values
    /// (tab stalls, debugger pauses) are clamped to avoid tunneling.
    pub max_frame_dt: f32,
    /// Downward acceleration in world units per second squared (Y-down).
    pub gravity: f32,
    /// Smallest mass any object may carry.
    pub min_mass: f32,
    /// Ambient temperature new objects start at.
    pub ambient_temp: f32,

    // -- Ground contact --
    /// Horizontal velocity multiplier applied each tick while grounded.
    pub ground_friction: f32,
    /// Grounded horizontal speeds below this snap to zero.
    pub friction_epsilon: f32,

    // -- Thermal stress --
    /// Lower edge of the safe temperature band.
    pub safe_temp_min: f32,
    /// Upper edge of the safe temperature band.
    pub safe_temp_max: f32,
    /// Stress gained per second outside the safe band.
    pub stress_build_rate: f32,
    /// Stress shed per second inside the safe band.
    pub stress_recovery_rate: f32,
    /// Stress above which an object is labelled "stressed" for presentation.
    pub stressed_threshold: f32,

    // -- Object/object response --
    /// Fraction of the mover's horizontal velocity handed to a dynamic target.
    pub momentum_transfer: f32,
    /// Fraction of horizontal velocity the mover keeps after hitting a dynamic target.
    pub mover_damping: f32,

    // -- Player/object response --
    /// Downward force per unit of player mass applied to an object the player lands on.
    pub landing_force: f32,
    /// Impulse applied to an object the player walks into.
    pub push_impulse: f32,
    /// Cap on the horizontal speed a push can give an object.
    pub max_push_speed: f32,

    // -- Sympathy --
    /// Concentration drained per second by a perfectly efficient link.
    pub base_drain: f32,
    /// Concentration regenerated per second while no link is active.
    pub regen_rate: f32,
    /// Player's concentration pool.
    pub max_concentration: f32,
    /// Temperature difference at which temperature similarity reaches zero.
    pub max_temp_diff: f32,
    pub mass_weight: f32,
    pub temp_weight: f32,
    pub size_weight: f32,
    /// Lowest similarity a link can have.
    pub min_similarity: f32,
    /// Highest similarity a link can have.
    pub max_similarity: f32,

    // -- Player movement --
    pub player_mass: f32,
    /// Horizontal acceleration while a direction is held, units/s².
    pub player_acceleration: f32,
    /// Horizontal deceleration with no direction held, units/s².
    pub player_deceleration: f32,
    pub player_max_speed: f32,
    /// Upward speed given by a jump.
    pub player_jump_speed: f32,
    pub player_max_fall_speed: f32,
    /// Distance below the map bottom at which the player counts as fallen out.
    pub fall_out_padding: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_frame_dt: 0.1,
            gravity: 980.0,
            min_mass: 0.1,
            ambient_temp: 20.0,
            ground_friction: 0.85,
            friction_epsilon: 1.0,
            safe_temp_min: -30.0,
            safe_temp_max: 60.0,
            stress_build_rate: 0.09,
            stress_recovery_rate: 0.04,
            stressed_threshold: 0.25,
            momentum_transfer: 0.9,
            mover_damping: 0.1,
            landing_force: 200.0,
            push_impulse: 300.0,
            max_push_speed: 120.0,
            base_drain: 5.0,
            regen_rate: 8.0,
            max_concentration: 100.0,
            max_temp_diff: 100.0,
            mass_weight: 0.5,
            temp_weight: 0.35,
            size_weight: 0.15,
            min_similarity: 0.2,
            max_similarity: 0.95,
            player_mass: 1.0,
            player_acceleration: 1200.0,
            player_deceleration: 1500.0,
            player_max_speed: 120.0,
            player_jump_speed: 320.0,
            player_max_fall_speed: 600.0,
            fall_out_padding: 100.0,
        }
    }
}

impl PhysicsConfig {
    /// Parse a config from a JSON string. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether `temp` lies inside the safe band (inclusive).
    pub fn is_safe_temp(&self, temp: f32) -> bool {
        temp >= self.safe_temp_min && temp <= self.safe_temp_max
    }
}
