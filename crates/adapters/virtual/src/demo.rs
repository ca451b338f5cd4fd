//! Demo account: two zones, three presets.

use uuid::Uuid;

use breezehub_domain::id::{PresetId, ZoneId};
use breezehub_domain::preset::{PresetMode, PresetSettings, PresetSnapshot};
use breezehub_domain::zone::Zone;

const LIVING_ROOM: Uuid = Uuid::from_u128(0x6c1e_93a2_47d5_4b8e_9f10_2a7d_5e3c_0b41);
const BEDROOM: Uuid = Uuid::from_u128(0x1f4b_8d60_2c39_4e7a_b5d2_7e91_0a6c_3f58);

pub(crate) fn zones() -> Vec<Zone> {
    vec![
        Zone {
            id: ZoneId::from_uuid(LIVING_ROOM),
            name: "Living room".to_string(),
        },
        Zone {
            id: ZoneId::from_uuid(BEDROOM),
            name: "Bedroom".to_string(),
        },
    ]
}

pub(crate) fn presets() -> Vec<PresetSnapshot> {
    vec![
        PresetSnapshot {
            id: PresetId::from_uuid(Uuid::from_u128(0xa310_5c7e_0d2b_4f69_8e44_1b6a_9c2d_7e05)),
            zone_id: ZoneId::from_uuid(LIVING_ROOM),
            room: "Living room".to_string(),
            name: "Day".to_string(),
            index: 0,
            settings: PresetSettings {
                co2: 800,
                speed: 3,
                speed_min_set: 1,
                speed_max_set: 5,
                t_set: 20,
                mode: PresetMode::Auto,
                is_on: true,
                heater_enabled: true,
            },
        },
        PresetSnapshot {
            id: PresetId::from_uuid(Uuid::from_u128(0x52d8_e1f0_6a3c_47b2_9d15_c8e7_4f0a_2b69)),
            zone_id: ZoneId::from_uuid(LIVING_ROOM),
            room: "Living room".to_string(),
            name: "Away".to_string(),
            index: 1,
            settings: PresetSettings {
                co2: 1200,
                speed: 1,
                speed_min_set: 0,
                speed_max_set: 2,
                t_set: 16,
                mode: PresetMode::Manual,
                is_on: true,
                heater_enabled: false,
            },
        },
        PresetSnapshot {
            id: PresetId::from_uuid(Uuid::from_u128(0x9b47_2e6d_c1a8_4053_b7f9_3d0e_8a5c_16e2)),
            zone_id: ZoneId::from_uuid(BEDROOM),
            room: "Bedroom".to_string(),
            name: "Night".to_string(),
            index: 0,
            settings: PresetSettings {
                co2: 650,
                speed: 2,
                speed_min_set: 1,
                speed_max_set: 3,
                t_set: 18,
                mode: PresetMode::Auto,
                is_on: true,
                heater_enabled: true,
            },
        },
    ]
}
