//! Best-effort player lookup proxy.
//!
//! A lookup walks a fixed, ordered list of upstream endpoints, normalizes
//! whatever JSON shape comes back into a [`models::PlayerRecord`], and returns
//! the first success along with the endpoint that produced it.

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod prober;
pub mod routes;
pub mod upstream;
