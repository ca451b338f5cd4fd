//! # breezehub-domain
//!
//! Pure domain model for the breezehub climate integration.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Presets** (per-zone schedule settings for ventilation breezers)
//! - Define **Zones** (rooms grouping breezers and sensors)
//! - Own the field limits a preset must respect
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod preset;
pub mod zone;
