//! Core types shared by the client and the tool surface.

pub mod error;

pub use error::KittError;
