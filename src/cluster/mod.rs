//! Cluster transport module.
//!
//! This module provides the REST client used to read and write live
//! cluster state.

mod client;

pub use client::ClusterClient;
