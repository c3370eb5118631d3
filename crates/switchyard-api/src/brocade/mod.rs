//! Brocade NOS driver plumbing: the REST client and its XML codec.

mod client;
pub mod xml;

pub use client::BrocadeClient;
