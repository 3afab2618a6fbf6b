pub mod component_client;
pub mod component_definitions;
pub mod component_server;
pub mod metrics;
pub mod otel_context;
pub mod requests;
pub mod serde_utils;
#[cfg(test)]
pub mod tests;
pub mod trace_util;
