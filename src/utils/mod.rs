//! Utility modules

pub mod params;
