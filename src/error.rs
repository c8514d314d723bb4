use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI subsystem unavailable: {0}")]
    Enumeration(String),

    #[error("device index {index} out of range (0..{count})")]
    InvalidDeviceIndex { index: usize, count: usize },

    #[error("device {index} ({name}) unavailable: {reason}")]
    DeviceUnavailable {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("device {index} handle is closed")]
    HandleClosed { index: usize },
}
