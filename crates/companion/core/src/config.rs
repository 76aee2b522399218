/// Controller configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Distance kept behind the leader while following.
    pub follow_distance: f32,
    /// Angle (radians) relative to the leader's facing while following.
    pub follow_angle: f32,
    /// Radius within which at least one group member must stay, and the
    /// maximum assist/leader-transfer distance.
    pub max_leader_distance: f32,
    /// Delay before the first follower distance check after creation.
    pub initial_follower_check_ms: u32,
    /// Period of the follower distance check while following.
    pub follower_check_interval_ms: u32,
    /// Period of the group status broadcast.
    pub group_update_interval_ms: u32,
    pub regen: RegenConfig,
    pub scheduler: SchedulerConfig,
}

impl ControllerConfig {
    // ===== compile-time constants =====
    /// Movement point id used when returning to the spot where combat started.
    pub const POINT_COMBAT_START: u32 = 0x00FF_FFFF;
    /// Template entries below this value are not driven by a companion controller.
    pub const MIN_COMPANION_ENTRY: u32 = 9_000_000;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_FOLLOW_DISTANCE: f32 = 3.0;
    pub const DEFAULT_FOLLOW_ANGLE: f32 = core::f32::consts::FRAC_PI_2;
    pub const DEFAULT_MAX_LEADER_DISTANCE: f32 = 100.0;
    pub const DEFAULT_INITIAL_FOLLOWER_CHECK_MS: u32 = 2500;
    pub const DEFAULT_FOLLOWER_CHECK_INTERVAL_MS: u32 = 1000;
    pub const DEFAULT_GROUP_UPDATE_INTERVAL_MS: u32 = 500;

    pub fn new() -> Self {
        Self {
            follow_distance: Self::DEFAULT_FOLLOW_DISTANCE,
            follow_angle: Self::DEFAULT_FOLLOW_ANGLE,
            max_leader_distance: Self::DEFAULT_MAX_LEADER_DISTANCE,
            initial_follower_check_ms: Self::DEFAULT_INITIAL_FOLLOWER_CHECK_MS,
            follower_check_interval_ms: Self::DEFAULT_FOLLOWER_CHECK_INTERVAL_MS,
            group_update_interval_ms: Self::DEFAULT_GROUP_UPDATE_INTERVAL_MS,
            regen: RegenConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }

    pub fn with_max_leader_distance(mut self, distance: f32) -> Self {
        self.max_leader_distance = distance;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Regeneration rates and the coarse regen threshold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegenConfig {
    /// Coarse timer threshold that fires health and mana regeneration.
    pub interval_ms: u32,
    /// Energy gained per millisecond before rate multipliers (10 per second).
    pub energy_per_ms: f32,
    /// World-wide energy rate multiplier.
    pub energy_rate: f32,
    /// World-wide mana rate multiplier.
    pub mana_rate: f32,
}

impl RegenConfig {
    pub const DEFAULT_INTERVAL_MS: u32 = 2000;
    pub const DEFAULT_ENERGY_PER_MS: f32 = 0.01;
}

impl Default for RegenConfig {
    fn default() -> Self {
        Self {
            interval_ms: Self::DEFAULT_INTERVAL_MS,
            energy_per_ms: Self::DEFAULT_ENERGY_PER_MS,
            energy_rate: 1.0,
            mana_rate: 1.0,
        }
    }
}

/// Delays used by the update scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Countdown for an autonomous companion that is engaged.
    pub combat_delay_ms: u32,
    /// Lower bound of the idle countdown for autonomous companions.
    pub idle_delay_min_ms: u32,
    /// Upper bound (inclusive) of the idle countdown for autonomous companions.
    pub idle_delay_max_ms: u32,
    /// Extra delay per additional companion of the same owner.
    pub per_companion_delay_ms: u32,
    /// Cap on the owned, non-mass-group countdown.
    pub owned_delay_cap_ms: u32,
    /// Upper bound (inclusive) of the batch-shared jitter.
    pub jitter_max: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            combat_delay_ms: 500,
            idle_delay_min_ms: 750,
            idle_delay_max_ms: 1250,
            per_companion_delay_ms: 50,
            owned_delay_cap_ms: 500,
            jitter_max: 100,
        }
    }
}
