mod definitions;
mod empty_component_server;
mod local_component_server;
mod remote_component_server;

pub use definitions::*;
pub use empty_component_server::*;
pub use local_component_server::*;
pub use remote_component_server::*;
