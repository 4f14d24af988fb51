//! Net-worth projection and financial-independence planning engine.

pub mod api;
pub mod core;
