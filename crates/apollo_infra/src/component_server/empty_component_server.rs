use std::marker::PhantomData;

use apollo_infra_utils::type_name::short_type_name;
use async_trait::async_trait;
use tracing::info;

use crate::component_server::ComponentServerStarter;

/// A server that never receives requests. Useful for components that are only ever driven
/// in-process by direct method calls and have no request/response channel wired up.
pub struct EmptyComponentServer<Component> {
    _phantom: PhantomData<Component>,
}

impl<Component> EmptyComponentServer<Component> {
    pub fn new() -> Self {
        Self { _phantom: PhantomData }
    }
}

impl<Component> Default for EmptyComponentServer<Component> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<Component: Send> ComponentServerStarter for EmptyComponentServer<Component> {
    async fn start(&mut self) {
        info!("No-op start for {}; this component has no server to run.", short_type_name::<Self>());
    }
}
