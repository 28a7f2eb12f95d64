//! Inscription content adapter
//!
//! Downloads an inscription's body from its content URL and parses it as JSON.

mod client;

pub use client::{HttpContentFetcher, HttpContentConfig};
