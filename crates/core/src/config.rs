//! Generation settings, read once before a run starts.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::locks::DangerType;
use crate::pattern::Pattern;
use crate::seed::generate_runtime_seed;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub locked_cycle: bool,
    pub double_lock_cycle: bool,
    pub hidden_path: bool,
    pub locked_fork: bool,
    pub alternate_path: bool,
    pub floor_hidden_path: bool,
    pub floor_locked_cycle: bool,
    pub floor_locked_fork: bool,

    pub sound_traps: bool,
    pub death_traps: bool,
    pub cameras: bool,

    /// Floor patterns applied over the whole level. Any non-zero count seeds
    /// the level with two floors.
    pub floor_pattern_count: u32,
    /// Room patterns applied on each floor.
    pub pattern_count: u32,
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            locked_cycle: true,
            double_lock_cycle: true,
            hidden_path: true,
            locked_fork: true,
            alternate_path: true,
            floor_hidden_path: true,
            floor_locked_cycle: true,
            floor_locked_fork: true,
            sound_traps: true,
            death_traps: true,
            cameras: true,
            floor_pattern_count: 2,
            pattern_count: 4,
            seed: None,
        }
    }
}

impl GenerationConfig {
    /// Every room pattern disabled and no floor patterns: the run stops at
    /// the two-vertex seed corridor.
    pub fn seed_only(seed: u64) -> Self {
        Self {
            locked_cycle: false,
            double_lock_cycle: false,
            hidden_path: false,
            locked_fork: false,
            alternate_path: false,
            floor_pattern_count: 0,
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn is_multi_floor(&self) -> bool {
        self.floor_pattern_count > 0
    }

    /// Floors are only requested through floor patterns, so asking for some
    /// while every floor pattern is off cannot be honoured. Disabling every
    /// room pattern just skips the room phase.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_multi_floor() && self.enabled_floor_patterns().is_empty() {
            return Err(ConfigError::NoFloorPatternEnabled(self.floor_pattern_count));
        }
        Ok(())
    }

    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(generate_runtime_seed)
    }

    pub fn is_enabled(&self, pattern: Pattern) -> bool {
        match pattern {
            Pattern::LockedCycle => self.locked_cycle,
            Pattern::DoubleLockCycle => self.double_lock_cycle,
            Pattern::HiddenPath => self.hidden_path,
            Pattern::LockedFork => self.locked_fork,
            Pattern::AlternatePath => self.alternate_path,
            Pattern::FloorHiddenPath => self.floor_hidden_path,
            Pattern::FloorLockedCycle => self.floor_locked_cycle,
            Pattern::FloorLockedFork => self.floor_locked_fork,
        }
    }

    pub fn enabled_room_patterns(&self) -> Vec<Pattern> {
        Pattern::ROOM.into_iter().filter(|&pattern| self.is_enabled(pattern)).collect()
    }

    pub fn enabled_floor_patterns(&self) -> Vec<Pattern> {
        Pattern::FLOOR.into_iter().filter(|&pattern| self.is_enabled(pattern)).collect()
    }

    pub fn enabled_dangers(&self) -> Vec<DangerType> {
        [
            (self.sound_traps, DangerType::SoundTrap),
            (self.death_traps, DangerType::DeathTrap),
            (self.cameras, DangerType::Camera),
        ]
        .into_iter()
        .filter_map(|(enabled, danger)| enabled.then_some(danger))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GenerationConfig::default().validate(), Ok(()));
        let seed_only = GenerationConfig::seed_only(3);
        assert_eq!(seed_only.validate(), Ok(()));
        assert!(!seed_only.is_multi_floor());
        assert!(seed_only.enabled_room_patterns().is_empty());
    }

    #[test]
    fn requested_floor_patterns_must_have_an_enabled_kind() {
        let config = GenerationConfig {
            floor_hidden_path: false,
            floor_locked_cycle: false,
            floor_locked_fork: false,
            ..GenerationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoFloorPatternEnabled(2)));
        let config = GenerationConfig { floor_pattern_count: 0, ..config };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{"cameras": false, "pattern_count": 7, "seed": 42}"#)
                .expect("valid json");
        assert!(!config.cameras);
        assert_eq!(config.pattern_count, 7);
        assert_eq!(config.resolve_seed(), 42);
        assert!(config.locked_cycle);
        assert_eq!(config.enabled_dangers(), vec![DangerType::SoundTrap, DangerType::DeathTrap]);
    }
}
