use async_trait::async_trait;

/// A component server is a wrapper around a component that drives its request/response loop.
/// Implementors run indefinitely once started; the component itself is oblivious to whether it
/// is being served locally (in-process channel) or remotely (over HTTP).
#[async_trait]
pub trait ComponentServerStarter {
    async fn start(&mut self);
}
