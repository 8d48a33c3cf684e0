//! # Exploit Simulations
//!
//! Attacks a relayer or a malicious application could try against the
//! delivery path. Each test states the attack and asserts it fails
//! without moving funds.

pub mod relayer_race;
