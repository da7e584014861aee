use thiserror::Error;

use crate::domain::SignalGroup;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write signal group: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode signal group: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Consumer of emitted signal groups. Expiry enforcement is the consumer's job.
pub trait SignalSink: Send {
    fn on_signal_group(&mut self, group: &SignalGroup) -> Result<(), SinkError>;
}
