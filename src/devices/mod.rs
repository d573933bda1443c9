//! Device implementations

#[cfg(feature = "mock")]
pub mod mock;

use crate::config::NavConfig;
use crate::core::hal::DeviceDriver;
use crate::error::{Error, Result};

/// Create a device driver based on configuration
pub fn create_device(config: &NavConfig) -> Result<Box<dyn DeviceDriver>> {
    match config.device.device_type.as_str() {
        #[cfg(feature = "mock")]
        "mock" => {
            let driver = mock::MockDriver::new(&config.device)?;
            Ok(Box::new(driver))
        }
        _ => Err(Error::UnknownDevice(config.device.device_type.clone())),
    }
}
