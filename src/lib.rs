//! Pagestats - single-page web tools with page view statistics
//!
//! This crate serves a QR code creator or a random cat viewer, counts every
//! page view into hour, day and week buckets, and reports those counts as
//! JSON. Counters live in Redis when it is reachable and in process memory
//! otherwise.

pub mod config;
pub mod error;
pub mod http;
pub mod qr;
pub mod stats;
