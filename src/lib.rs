pub mod adapter;
pub mod app;
pub mod config;
pub mod core;
pub mod events;
pub mod heartbeat;
pub mod process;
pub mod resources;
pub mod runtime;
pub mod transport;

#[cfg(test)]
mod test_support;
