//! Bot tuning, loaded from YAML.
//!
//! Every section is optional; anything left out falls back to the defaults below, which are
//! the values the behaviors were tuned with.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub lifecycle: LifecycleConfig,
    pub stuck: StuckConfig,
    pub combat: CombatConfig,
    pub loot: LootConfig,
    pub build: BuildConfig,
    pub hazard: HazardConfig,
    pub upkeep: UpkeepConfig,
    pub wander: WanderConfig,
    pub focus: FocusConfig,
    pub poi: PoiConfig,
    pub features: FeatureToggles,

    /// Upper bound on concurrently live bots.
    pub max_agents: usize,

    /// Match seed; every random decision derives from it.
    pub seed: u64,

    /// Largest random delay applied to a service's first run, in seconds.
    pub service_jitter_seconds: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleConfig::default(),
            stuck: StuckConfig::default(),
            combat: CombatConfig::default(),
            loot: LootConfig::default(),
            build: BuildConfig::default(),
            hazard: HazardConfig::default(),
            upkeep: UpkeepConfig::default(),
            wander: WanderConfig::default(),
            focus: FocusConfig::default(),
            poi: PoiConfig::default(),
            features: FeatureToggles::default(),
            max_agents: 95,
            seed: 0,
            service_jitter_seconds: 0.5,
        }
    }
}

impl BotConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourtesyMode {
    /// Per-tick Bernoulli trial from a per-second rate.
    Rate,
    /// One randomized deadline after spawn.
    Deadline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Start in the transport (`Boarding`); otherwise bots spawn already landed.
    pub spawn_in_transport: bool,
    pub jump_delay_min_seconds: f64,
    pub jump_delay_max_seconds: f64,
    pub courtesy_mode: CourtesyMode,
    pub courtesy_rate_per_second: f64,
    pub courtesy_delay_min_seconds: f64,
    pub courtesy_delay_max_seconds: f64,
    /// Health and shield applied on leaving the transport.
    pub spawn_health: f32,
    pub spawn_shield: f32,
    /// How far below the current height each dive step aims.
    pub dive_step: f32,
    pub descent_acceptance_radius: f32,
    /// Idle wait between jump checks while boarding.
    pub boarding_wait_seconds: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            spawn_in_transport: true,
            jump_delay_min_seconds: 3.0,
            jump_delay_max_seconds: 8.0,
            courtesy_mode: CourtesyMode::Deadline,
            courtesy_rate_per_second: 0.15,
            courtesy_delay_min_seconds: 1.0,
            courtesy_delay_max_seconds: 4.0,
            spawn_health: 100.0,
            spawn_shield: 0.0,
            dive_step: 100.0,
            descent_acceptance_radius: 100.0,
            boarding_wait_seconds: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StuckConfig {
    pub check_interval_seconds: f64,
    /// Displacement between samples below which a moving bot counts as stalled.
    pub min_displacement: f32,
    pub trigger_count: u32,
    /// Half-width of the square the recovery destination is drawn from.
    pub recovery_radius: f32,
    pub recovery_acceptance_radius: f32,
    /// How long the recovery destination overrides the other landed behaviors.
    pub recovery_timeout_seconds: f64,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: 2.0,
            min_displacement: 50.0,
            trigger_count: 3,
            recovery_radius: 500.0,
            recovery_acceptance_radius: 50.0,
            recovery_timeout_seconds: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub scan_interval_seconds: f64,
    pub max_range: f32,
    pub switch_cooldown_seconds: f64,
    pub fire_range: f32,
    pub approach_radius: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            scan_interval_seconds: 1.0,
            max_range: 5000.0,
            switch_cooldown_seconds: 2.0,
            fire_range: 1500.0,
            approach_radius: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    /// How often the candidate list is rebuilt while a target is held.
    pub scan_interval_seconds: f64,
    pub search_radius: f32,
    pub collect_radius: f32,
    pub open_radius: f32,
    pub interaction_cooldown_seconds: f64,
    pub low_health_threshold: f32,
    /// Shield below this also counts as low. Zero disables the shield check.
    pub low_shield_threshold: f32,
    pub healing_bonus: f32,
    pub weapon_bonus: f32,
    pub container_bonus: f32,
    pub baseline: f32,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            scan_interval_seconds: 1.5,
            search_radius: 2000.0,
            collect_radius: 150.0,
            open_radius: 200.0,
            interaction_cooldown_seconds: 0.5,
            low_health_threshold: 50.0,
            low_shield_threshold: 0.0,
            healing_bonus: 1000.0,
            weapon_bonus: 500.0,
            container_bonus: 300.0,
            baseline: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub threat_radius: f32,
    pub max_attempts: u32,
    pub cooldown_seconds: f64,
    /// Distance from the bot, toward the threat, at which pieces are placed.
    pub placement_distance: f32,
    pub placement_height: f32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            threat_radius: 3000.0,
            max_attempts: 3,
            cooldown_seconds: 5.0,
            placement_distance: 300.0,
            placement_height: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    /// Move target distance from the zone center, as a fraction of the zone radius.
    pub inner_fraction: f32,
    pub acceptance_radius: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            inner_fraction: 0.5,
            acceptance_radius: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpkeepConfig {
    pub interval_seconds: f64,
    pub consumable_health_threshold: f32,
    pub consumable_cooldown_seconds: f64,
    pub reload_cooldown_seconds: f64,
}

impl Default for UpkeepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 1.0,
            consumable_health_threshold: 50.0,
            consumable_cooldown_seconds: 5.0,
            reload_cooldown_seconds: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    pub change_interval_seconds: f64,
    pub offset: f32,
    pub acceptance_radius: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            change_interval_seconds: 1.0,
            offset: 600.0,
            acceptance_radius: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub interval_seconds: f64,
    /// Horizontal half-width of the look-around box; the vertical half-width is half of it.
    pub offset: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 0.3,
            offset: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiConfig {
    pub weight_per_tier: u32,
    pub strategic_bonus: u32,
    pub min_capacity: u32,
    pub max_capacity: u32,
    /// Horizontal placement spread per tier level.
    pub spread_per_tier: f32,
    pub vertical_jitter: f32,
    /// Fallback when no named anchor group qualifies: every `fallback_stride`-th anchor.
    pub fallback_stride: usize,
    pub fallback_capacity: u32,
    pub fallback_max_pois: usize,
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            weight_per_tier: 10,
            strategic_bonus: 5,
            min_capacity: 1,
            max_capacity: 10,
            spread_per_tier: 400.0,
            vertical_jitter: 50.0,
            fallback_stride: 5,
            fallback_capacity: 5,
            fallback_max_pois: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub combat: bool,
    pub looting: bool,
    pub building: bool,
    pub stuck_detection: bool,
    pub courtesy: bool,
    pub look_around: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            combat: true,
            looting: true,
            building: true,
            stuck_detection: true,
            courtesy: true,
            look_around: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(BotConfig::from_yaml_str("").unwrap(), BotConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = BotConfig::from_yaml_str(
            "combat:\n  fire_range: 900\nfeatures:\n  building: false\nmax_agents: 12\n",
        )
        .unwrap();
        assert_eq!(config.combat.fire_range, 900.0);
        assert_eq!(config.combat.switch_cooldown_seconds, 2.0);
        assert!(!config.features.building);
        assert!(config.features.combat);
        assert_eq!(config.max_agents, 12);
        assert_eq!(config.stuck, StuckConfig::default());
    }
}
