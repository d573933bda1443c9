//! Core abstractions shared by the navigation engine and devices.
//!
//! - [`hal`]: Collaborator traits a device implements ([`hal::DeviceDriver`])
//! - [`types`]: Sensor snapshots, motion commands, scenes and display values

pub mod hal;
pub mod types;
