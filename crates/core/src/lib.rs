//! Core domain types and configuration for expunge.
//!
//! This crate defines the data model shared by the store, storage, and
//! engine crates:
//! - Namespaces and their subject/talk pairing
//! - Page ids, titles, keys, and purge targets
//! - Configuration for the purge policy, metadata store, and artifact storage

pub mod config;
pub mod error;
pub mod namespace;
pub mod page;

pub use error::{Error, Result};
pub use namespace::Namespace;
pub use page::{PageId, PageKey, PageTarget, PageTitle};
