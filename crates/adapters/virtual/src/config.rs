//! Virtual store configuration.

use std::time::Duration;

use serde::Deserialize;

use breezehub_domain::preset::PresetSnapshot;
use breezehub_domain::zone::Zone;

/// Configuration for the virtual remote service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// Simulated round-trip time of every remote call, in milliseconds.
    pub latency_ms: u64,
    /// How long a bulk read may be answered from cache, in seconds.
    pub min_update_interval_secs: u64,
    /// Zones to serve. Demo data is used when both lists are empty.
    pub zones: Vec<Zone>,
    /// Presets to serve.
    pub presets: Vec<PresetSnapshot>,
}

impl VirtualConfig {
    #[must_use]
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    #[must_use]
    pub fn min_update_interval(&self) -> Duration {
        Duration::from_secs(self.min_update_interval_secs)
    }
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            latency_ms: 200,
            min_update_interval_secs: 10,
            zones: Vec::new(),
            presets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = VirtualConfig::default();
        assert_eq!(config.latency(), Duration::from_millis(200));
        assert_eq!(config.min_update_interval(), Duration::from_secs(10));
        assert!(config.presets.is_empty());
    }

    #[test]
    fn should_deserialize_seed_data_from_toml() {
        let toml = r#"
            latency_ms = 0

            [[zones]]
            id = "0e6f1c52-3b7a-4f0e-9d25-6c1a8b4e7f30"
            name = "Office"

            [[presets]]
            id = "8a1d2c3b-4e5f-4a6b-8c7d-9e0f1a2b3c4d"
            zone_id = "0e6f1c52-3b7a-4f0e-9d25-6c1a8b4e7f30"
            room = "Office"
            name = "Work hours"
            index = 0

            [presets.settings]
            co2 = 700
            speed = 3
            speed_min_set = 1
            speed_max_set = 6
            t_set = 21
            mode = "manual"
            is_on = true
            heater_enabled = true
        "#;
        let config: VirtualConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.latency_ms, 0);
        assert_eq!(config.min_update_interval_secs, 10);
        assert_eq!(config.zones[0].name, "Office");
        assert_eq!(config.presets[0].settings.co2, 700);
        assert!(config.presets[0].validate().is_ok());
    }
}
