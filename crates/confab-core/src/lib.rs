//! Core confab library (server client, wire types, config).

pub mod api;
pub mod config;
pub mod wire;
