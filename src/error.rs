//! Error types for navcar

use crate::core::types::Channel;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// navcar error types
///
/// The navigation core itself never returns these: every fault inside a tick
/// degrades to a safe state. They surface from start-up (configuration,
/// device creation) and from collaborator implementations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// Device type named in the configuration is not available
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Analog channel read failed
    #[error("Sensor read failed on {channel:?}: {reason}")]
    SensorRead {
        /// Channel that failed
        channel: Channel,
        /// Failure description
        reason: String,
    },

    /// Worker channel disconnected
    #[error("Channel closed: {0}")]
    ChannelClosed(&'static str),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
