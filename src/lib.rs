//! MCP gateway exposing the TryKitt.ai email verification and lookup API as tools.

pub mod cli;
pub mod clients;
pub mod core;
pub mod domain;
pub mod infra;
pub mod tools;
