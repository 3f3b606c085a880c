// Path Tracking module

pub mod controller;

pub use controller::{ControlMode, Controller};
