mod devices;
mod error;
mod handle;
mod relay;
mod router;

pub use devices::*;
pub use error::*;
pub use handle::*;
pub use relay::*;
pub use router::*;
