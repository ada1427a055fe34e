pub mod execution;
pub mod graph;
pub mod list_nodes;
pub mod logs;
pub mod model;
pub mod project;
pub mod registry;
pub mod schema;
pub mod sequence;
pub mod store;
pub mod templates;
pub mod validate;
pub mod visualize;

#[cfg(feature = "full")]
pub mod balances;
#[cfg(feature = "full")]
pub mod client;
#[cfg(feature = "full")]
pub mod config;
#[cfg(feature = "full")]
pub mod export;
#[cfg(feature = "full")]
pub mod generate;
#[cfg(feature = "full")]
pub mod run;
#[cfg(feature = "full")]
pub mod stop;

#[cfg(feature = "wasm")]
pub mod wasm;
