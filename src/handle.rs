use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::devices::{DeviceEntry, CLIENT_NAME};
use crate::error::{Error, Result};
use crate::relay::MessageSink;

/// Open sink-side binding to a device: messages are pushed into it. Each
/// `open` call materializes an independent handle; closing is per-handle.
pub struct OutputHandle {
    index: usize,
    name: String,
    conn: Option<MidiOutputConnection>,
}

impl OutputHandle {
    pub(crate) fn open(entry: &DeviceEntry) -> Result<Self> {
        let descriptor = &entry.descriptor;
        let unavailable = |reason: String| Error::DeviceUnavailable {
            index: descriptor.index,
            name: descriptor.name.clone(),
            reason,
        };
        let port = entry
            .sink_port
            .as_ref()
            .ok_or_else(|| unavailable("no message sink endpoint".to_string()))?;
        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| unavailable(e.to_string()))?;
        let conn = midi_out
            .connect(port, "midiroute-sink")
            .map_err(|e| unavailable(e.to_string()))?;
        log::debug!("opened output device {}: {}", descriptor.index, descriptor.name);
        Ok(OutputHandle {
            index: descriptor.index,
            name: descriptor.name.clone(),
            conn: Some(conn),
        })
    }

    pub fn send(&mut self, message: &[u8]) -> Result<()> {
        let conn = self
            .conn
            .as_mut()
            .ok_or(Error::HandleClosed { index: self.index })?;
        conn.send(message).map_err(|e| Error::DeviceUnavailable {
            index: self.index,
            name: self.name.clone(),
            reason: e.to_string(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close();
            log::debug!("closed output device {}: {}", self.index, self.name);
        }
    }
}

impl MessageSink for OutputHandle {
    fn accept(&mut self, message: &[u8]) -> Result<()> {
        self.send(message)
    }
}

/// Open source-side binding to a device. The sink is bound when the stream
/// opens; every message the device produces is pushed into it until close.
pub struct InputHandle {
    index: usize,
    name: String,
    conn: Option<MidiInputConnection<()>>,
}

impl InputHandle {
    pub(crate) fn open(entry: &DeviceEntry, mut sink: Box<dyn MessageSink>) -> Result<Self> {
        let descriptor = &entry.descriptor;
        let unavailable = |reason: String| Error::DeviceUnavailable {
            index: descriptor.index,
            name: descriptor.name.clone(),
            reason,
        };
        let port = entry
            .source_port
            .as_ref()
            .ok_or_else(|| unavailable("no message source endpoint".to_string()))?;
        let mut midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| unavailable(e.to_string()))?;
        midi_in.ignore(Ignore::None);
        let index = descriptor.index;
        let conn = midi_in
            .connect(
                port,
                "midiroute-source",
                move |_stamp, message, _| {
                    // Runs on the platform's dispatch thread, which cannot
                    // carry a Result back to us.
                    if let Err(err) = sink.accept(message) {
                        log::error!("device {index}: dropping message: {err}");
                    }
                },
                (),
            )
            .map_err(|e| unavailable(e.to_string()))?;
        log::debug!("opened input device {}: {}", descriptor.index, descriptor.name);
        Ok(InputHandle {
            index: descriptor.index,
            name: descriptor.name.clone(),
            conn: Some(conn),
        })
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close();
            log::debug!("closed input device {}: {}", self.index, self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_handle() -> OutputHandle {
        OutputHandle {
            index: 3,
            name: "UM-ONE".to_string(),
            conn: None,
        }
    }

    #[test]
    fn send_on_closed_handle_fails_loudly() {
        let mut handle = closed_handle();
        match handle.send(&[0x90, 0x3C, 0x40]) {
            Err(Error::HandleClosed { index: 3 }) => {}
            Ok(()) => panic!("send on a closed handle should fail"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn accept_goes_through_send() {
        let mut handle = closed_handle();
        match handle.accept(&[0xF8]) {
            Err(Error::HandleClosed { index: 3 }) => {}
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn close_is_idempotent() {
        let mut handle = closed_handle();
        assert!(!handle.is_open());
        handle.close();
        handle.close();
        assert!(!handle.is_open());
    }
}
