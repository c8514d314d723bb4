use midir::{MidiInput, MidiInputPort, MidiOutput, MidiOutputPort};

use crate::error::{Error, Result};

pub(crate) const CLIENT_NAME: &str = "midiroute";

/// One row of the enumeration snapshot. Indices are assigned once per
/// enumeration and identify the device for the snapshot's lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub index: usize,
    pub name: String,
    /// Messages can be sent to this device: usable as the output leg.
    pub can_receive: bool,
    /// This device produces messages: usable as the input leg.
    pub can_transmit: bool,
}

pub(crate) struct DeviceEntry {
    pub(crate) descriptor: DeviceDescriptor,
    pub(crate) source_port: Option<MidiInputPort>,
    pub(crate) sink_port: Option<MidiOutputPort>,
}

pub struct DeviceRegistry {
    devices: Vec<DeviceEntry>,
}

impl DeviceRegistry {
    /// Snapshot every MIDI endpoint the platform reports right now. The
    /// platform lists source and sink endpoints separately; same-named ones
    /// are unified into a single device with both capability flags set.
    /// Re-running after hardware changes may return a different snapshot.
    pub fn enumerate() -> Result<Self> {
        let midi_in =
            MidiInput::new(CLIENT_NAME).map_err(|e| Error::Enumeration(e.to_string()))?;
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|e| Error::Enumeration(e.to_string()))?;

        let mut sources = Vec::new();
        for port in midi_in.ports() {
            let name = midi_in
                .port_name(&port)
                .map_err(|e| Error::Enumeration(e.to_string()))?;
            sources.push((name, port));
        }
        let mut sinks = Vec::new();
        for port in midi_out.ports() {
            let name = midi_out
                .port_name(&port)
                .map_err(|e| Error::Enumeration(e.to_string()))?;
            sinks.push((name, port));
        }

        let devices = unify(sources, sinks)
            .into_iter()
            .enumerate()
            .map(|(index, (name, source_port, sink_port))| DeviceEntry {
                descriptor: DeviceDescriptor {
                    index,
                    name,
                    can_receive: sink_port.is_some(),
                    can_transmit: source_port.is_some(),
                },
                source_port,
                sink_port,
            })
            .collect();
        Ok(DeviceRegistry { devices })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.iter().map(|entry| &entry.descriptor)
    }

    pub fn get(&self, index: usize) -> Result<&DeviceDescriptor> {
        self.entry(index).map(|entry| &entry.descriptor)
    }

    pub(crate) fn entry(&self, index: usize) -> Result<&DeviceEntry> {
        self.devices.get(index).ok_or(Error::InvalidDeviceIndex {
            index,
            count: self.devices.len(),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_entries(devices: Vec<DeviceEntry>) -> Self {
        DeviceRegistry { devices }
    }
}

/// Pair source and sink endpoints by name into one device list. Each sink
/// attaches to the first same-named device that lacks one, so duplicate
/// device names pair off one-to-one in enumeration order.
fn unify<S, K>(
    sources: Vec<(String, S)>,
    sinks: Vec<(String, K)>,
) -> Vec<(String, Option<S>, Option<K>)> {
    let mut devices: Vec<(String, Option<S>, Option<K>)> = sources
        .into_iter()
        .map(|(name, source)| (name, Some(source), None))
        .collect();
    for (name, sink) in sinks {
        match devices
            .iter_mut()
            .find(|(n, _, k)| *n == name && k.is_none())
        {
            Some(device) => device.2 = Some(sink),
            None => devices.push((name, None, Some(sink))),
        }
    }
    devices
}

pub fn device_row(device: &DeviceDescriptor) -> String {
    let flags = format!(
        "{}{}",
        if device.can_transmit { " [IN]" } else { "     " },
        if device.can_receive { " [OUT]" } else { "      " }
    );
    format!("{:2}: {:<60} {}", device.index, device.name, flags)
}
