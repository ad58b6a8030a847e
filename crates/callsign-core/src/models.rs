//! Domain models for Callsign.

pub mod user;
