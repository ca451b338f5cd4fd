//! Zone preset: a saved schedule configuration for one zone.
//!
//! A [`PresetSnapshot`] is fetched wholesale from the remote service. Its
//! editable part lives in [`PresetSettings`]; identity fields (zone, room,
//! name, index) are only ever replaced by a fresh read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{PresetId, ZoneId};

/// Operating mode of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetMode {
    /// Breezer speed follows the CO₂ target.
    #[default]
    Auto,
    /// Breezer runs at the fixed speed.
    Manual,
}

impl PresetMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for PresetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// Inclusive bounds, and the increment between accepted values, for a
/// numeric preset field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub field: &'static str,
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl Limit {
    #[must_use]
    pub const fn new(field: &'static str, min: i32, max: i32) -> Self {
        Self {
            field,
            min,
            max,
            step: 1,
        }
    }

    #[must_use]
    pub const fn with_step(self, step: i32) -> Self {
        Self { step, ..self }
    }

    /// Check a value about to be written: within bounds and on the step grid.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] when `value` is outside
    /// `min..=max`, or [`ValidationError::OffStep`] when it falls between steps.
    pub fn check(&self, value: impl Into<i32>) -> Result<(), ValidationError> {
        let value = value.into();
        self.check_range(value)?;
        if (value - self.min) % self.step != 0 {
            return Err(ValidationError::OffStep {
                field: self.field,
                value,
                step: self.step,
            });
        }
        Ok(())
    }

    /// Check bounds only. Values read back from the remote are not held to
    /// the step grid.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] when `value` is outside `min..=max`.
    pub fn check_range(&self, value: impl Into<i32>) -> Result<(), ValidationError> {
        let value = value.into();
        if (self.min..=self.max).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Bounds enforced on every preset field, in the units the remote uses.
pub mod limits {
    use super::Limit;

    /// Target CO₂ concentration, ppm, in steps of 50.
    pub const CO2: Limit = Limit::new("co2", 550, 1500).with_step(50);
    pub const SPEED: Limit = Limit::new("speed", 1, 6);
    pub const SPEED_MIN: Limit = Limit::new("speed_min_set", 0, 6);
    pub const SPEED_MAX: Limit = Limit::new("speed_max_set", 0, 6);
    /// Target air temperature, °C.
    pub const TARGET_TEMPERATURE: Limit = Limit::new("t_set", 0, 30);
}

/// The user-editable fields of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSettings {
    pub co2: u16,
    pub speed: u8,
    pub speed_min_set: u8,
    pub speed_max_set: u8,
    pub t_set: i8,
    pub mode: PresetMode,
    pub is_on: bool,
    pub heater_enabled: bool,
}

impl PresetSettings {
    /// Check every numeric field against the bounds in [`limits`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError::OutOfRange`] encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        limits::CO2.check_range(self.co2)?;
        limits::SPEED.check_range(self.speed)?;
        limits::SPEED_MIN.check_range(self.speed_min_set)?;
        limits::SPEED_MAX.check_range(self.speed_max_set)?;
        limits::TARGET_TEMPERATURE.check_range(self.t_set)?;
        Ok(())
    }
}

/// A preset as read from the remote service at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSnapshot {
    pub id: PresetId,
    pub zone_id: ZoneId,
    pub room: String,
    pub name: String,
    pub index: u32,
    pub settings: PresetSettings,
}

impl PresetSnapshot {
    /// Whether every field can be trusted at once.
    ///
    /// # Errors
    ///
    /// Returns the first violated limit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.settings.validate()
    }

    /// `"{room} {name}"`, the label the platform shows for this preset.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.room, self.name)
    }
}
