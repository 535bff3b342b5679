//! Command handlers.

pub mod build;
pub mod config;
pub mod render;
