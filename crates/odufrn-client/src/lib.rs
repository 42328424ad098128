//! odufrn Client - Portal and filesystem access for the downloader
//!
//! This crate provides the I/O implementations of the `odufrn-core` traits:
//!
//! - [`ckan`] - CKAN open data portals ([`PortalApi`](odufrn_core::PortalApi))
//! - [`fs`] - local disk ([`Storage`](odufrn_core::Storage))
//!
//! # Overview
//!
//! The client handles request building, response parsing and error
//! classification; all download decisions stay in `odufrn-core`.

pub mod ckan;
pub mod fs;

// Re-export main client types
pub use ckan::CkanClient;
pub use fs::LocalStorage;
