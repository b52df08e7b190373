//! Transport layer (HTTP).
//!
//! Decodes inbound requests into metric names and hands them to the store.

pub mod http;
