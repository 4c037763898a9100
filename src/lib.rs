//! Data access for the Zentra Holdings website.
//!
//! Records live in Firebase when it is configured and always in a local
//! key-value mirror, which also answers whenever the remote store fails.
//! Public bookings and reviews trigger owner notifications sent through
//! Resend.

pub mod config;
pub mod email;
pub mod local;
pub mod models;
pub mod remote;
pub mod server;
pub mod store;
pub mod submit;

#[cfg(test)]
mod test_support;
