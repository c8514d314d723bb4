use crate::devices::DeviceRegistry;
use crate::error::{Error, Result};
use crate::handle::{InputHandle, OutputHandle};
use crate::relay::LogRelay;

/// A live route. The output handle lives inside the relay bound to the
/// input stream, so releasing the input releases the whole chain.
pub struct RouteBinding {
    source_index: usize,
    sink_index: usize,
    input: InputHandle,
}

impl RouteBinding {
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn sink_index(&self) -> usize {
        self.sink_index
    }

    pub fn close(mut self) {
        self.input.close();
    }
}

pub struct Router {
    active: Option<RouteBinding>,
}

impl Router {
    pub fn new() -> Self {
        Router { active: None }
    }

    pub fn active(&self) -> Option<&RouteBinding> {
        self.active.as_ref()
    }

    /// Wire the input device's message stream into the output device,
    /// logging every message on the way. Argument order follows the usage
    /// string: output (sink) leg first, input (source) leg second.
    ///
    /// Index and capability validation happens before anything opens, and
    /// any previously installed binding is released before the new stream
    /// attaches, so a source never feeds two sinks at once.
    pub fn route(
        &mut self,
        out_index: usize,
        in_index: usize,
        registry: &DeviceRegistry,
    ) -> Result<&RouteBinding> {
        let sink = registry.get(out_index)?;
        let source = registry.get(in_index)?;

        if !sink.can_receive {
            return Err(Error::DeviceUnavailable {
                index: out_index,
                name: sink.name.clone(),
                reason: "device cannot receive messages".to_string(),
            });
        }
        if !source.can_transmit {
            return Err(Error::DeviceUnavailable {
                index: in_index,
                name: source.name.clone(),
                reason: "device cannot transmit messages".to_string(),
            });
        }

        if let Some(previous) = self.active.take() {
            log::debug!(
                "releasing route {} -> {}",
                previous.source_index,
                previous.sink_index
            );
            previous.close();
        }

        // The sink must be live before the source stream binds to it, so no
        // message can arrive without a destination. On a failed input open
        // the already-opened output is dropped, which closes it.
        let output = OutputHandle::open(registry.entry(out_index)?)?;
        let relay = LogRelay::new(output);
        let input = InputHandle::open(registry.entry(in_index)?, Box::new(relay))?;

        log::info!(
            "routing {} ({}) -> {} ({})",
            in_index,
            source.name,
            out_index,
            sink.name
        );
        Ok(self.active.insert(RouteBinding {
            source_index: in_index,
            sink_index: out_index,
            input,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DeviceDescriptor, DeviceEntry, DeviceRegistry};

    fn detached(index: usize, name: &str, can_receive: bool, can_transmit: bool) -> DeviceEntry {
        DeviceEntry {
            descriptor: DeviceDescriptor {
                index,
                name: name.to_string(),
                can_receive,
                can_transmit,
            },
            source_port: None,
            sink_port: None,
        }
    }

    // Mirrors a host with an in-only keyboard, an out-only synth, and a
    // duplex interface.
    fn three_device_registry() -> DeviceRegistry {
        DeviceRegistry::from_entries(vec![
            detached(0, "Keystation 61", false, true),
            detached(1, "FluidSynth", true, false),
            detached(2, "UM-ONE", true, true),
        ])
    }

    fn expect_err(result: Result<&RouteBinding>) -> Error {
        match result {
            Ok(_) => panic!("route unexpectedly succeeded"),
            Err(err) => err,
        }
    }

    #[test]
    fn out_of_range_output_index_is_rejected() {
        let registry = three_device_registry();
        let mut router = Router::new();
        match expect_err(router.route(5, 0, &registry)) {
            Error::InvalidDeviceIndex { index: 5, count: 3 } => {}
            other => panic!("unexpected error: {other}"),
        }
        assert!(router.active().is_none());
    }

    #[test]
    fn out_of_range_input_index_is_rejected() {
        let registry = three_device_registry();
        let mut router = Router::new();
        match expect_err(router.route(1, 7, &registry)) {
            Error::InvalidDeviceIndex { index: 7, count: 3 } => {}
            other => panic!("unexpected error: {other}"),
        }
        assert!(router.active().is_none());
    }

    #[test]
    fn transmit_only_device_cannot_be_the_sink() {
        let registry = three_device_registry();
        let mut router = Router::new();
        match expect_err(router.route(0, 2, &registry)) {
            Error::DeviceUnavailable { index: 0, .. } => {}
            other => panic!("unexpected error: {other}"),
        }
        assert!(router.active().is_none());
    }

    #[test]
    fn receive_only_device_cannot_be_the_source() {
        let registry = three_device_registry();
        let mut router = Router::new();
        match expect_err(router.route(1, 1, &registry)) {
            Error::DeviceUnavailable { index: 1, .. } => {}
            other => panic!("unexpected error: {other}"),
        }
        assert!(router.active().is_none());
    }

    #[test]
    fn vanished_endpoint_is_unavailable() {
        // Capability flags from the snapshot, but the endpoints are gone by
        // open time.
        let registry = three_device_registry();
        let mut router = Router::new();
        match expect_err(router.route(2, 2, &registry)) {
            Error::DeviceUnavailable { index: 2, .. } => {}
            other => panic!("unexpected error: {other}"),
        }
        assert!(router.active().is_none());
    }
}
