//! Timestamps recorded when a preset is synchronised with the remote service.

use chrono::{DateTime, Utc};

pub type Timestamp = DateTime<Utc>;

#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
