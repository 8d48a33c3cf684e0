//! # Ports Module
//!
//! Inbound API of the Publisher.

pub mod inbound;

pub use inbound::*;
