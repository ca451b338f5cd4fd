//! Zone: a room grouping breezers and air-quality sensors.

use serde::{Deserialize, Serialize};

use crate::id::ZoneId;

/// A zone as listed by the remote service.
///
/// Presets carry the zone id; the zone's name is what the user sees as the
/// preset's room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
}
