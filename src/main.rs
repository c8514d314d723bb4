use anyhow::{Context, Result};

use midiroute::{device_row, DeviceRegistry, Router};

const USAGE: &str = "Usage: midiroute [MIDI OUT device number] [MIDI IN device number]";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let registry = DeviceRegistry::enumerate().context("could not query the MIDI subsystem")?;

    if args.len() != 2 {
        println!("{USAGE}");
        for descriptor in registry.descriptors() {
            println!("{}", device_row(descriptor));
        }
        return Ok(());
    }

    let out_index: usize = args[0]
        .parse()
        .with_context(|| format!("MIDI OUT device number '{}' is not an integer", args[0]))?;
    let in_index: usize = args[1]
        .parse()
        .with_context(|| format!("MIDI IN device number '{}' is not an integer", args[1]))?;

    let mut router = Router::new();
    router
        .route(out_index, in_index, &registry)
        .context("could not establish the route")?;

    // Messages arrive on the platform's own thread; keep the process (and
    // with it the open handles) alive until externally terminated.
    loop {
        std::thread::park();
    }
}
