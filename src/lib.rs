pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod inventory;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod types;
