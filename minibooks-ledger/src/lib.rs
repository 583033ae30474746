//! minibooks-ledger: Double-entry ledger and financial statement engine.

pub mod config;
pub mod models;
pub mod services;
