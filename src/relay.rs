use crate::error::Result;

/// Anything that can accept a forwarded MIDI message. The platform delivers
/// messages on its own thread, so sinks must be `Send`.
pub trait MessageSink: Send {
    fn accept(&mut self, message: &[u8]) -> Result<()>;
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}

/// Sink decorator that logs each message as hex before forwarding it,
/// unchanged, to the wrapped destination. Forwarding always uses immediate
/// delivery; the arrival timestamp is not preserved.
pub struct LogRelay<S> {
    sink: S,
}

impl<S: MessageSink> LogRelay<S> {
    pub fn new(sink: S) -> Self {
        LogRelay { sink }
    }
}

impl<S: MessageSink> MessageSink for LogRelay<S> {
    fn accept(&mut self, message: &[u8]) -> Result<()> {
        log::info!("midi received {}", to_hex(message));
        self.sink.accept(message)
    }
}
