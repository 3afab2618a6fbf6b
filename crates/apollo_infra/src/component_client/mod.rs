mod definitions;
mod local_component_client;
mod noop_client;
pub mod remote_component_client;

pub use definitions::*;
pub use local_component_client::*;
pub use noop_client::*;
pub use remote_component_client::*;
