pub mod config;
pub mod constants;
pub mod error;
pub mod exec;
pub mod gateway;
pub mod geometry;
pub mod logging;
pub mod metadata;
pub mod pipeline;
pub mod raster;
pub mod timer;
