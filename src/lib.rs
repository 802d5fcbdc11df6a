#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod frame_dump;
pub mod graph;
pub mod label;
pub mod physics;
pub mod pipeline;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
