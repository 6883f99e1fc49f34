//! # optikv Testkit
//!
//! Shared fixtures and conformance suites for optikv backends.
//!
//! This crate provides:
//! - [`TestItem`] / [`SubItem`] - a realistic payload type
//! - [`storer_suite`] / [`optimistic_locking_suite`] - the contract
//!   every backend must satisfy
//! - [`RemoteStub`] - an in-process model of a remote database adapter
//!
//! A new backend passes review when both suites run green against a
//! fresh instance:
//!
//! ```rust
//! use optikv_store::MemoryStore;
//! use optikv_testkit::{optimistic_locking_suite, storer_suite};
//!
//! let store = MemoryStore::new();
//! storer_suite(&store);
//! optimistic_locking_suite(&store);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod remote;
pub mod suite;

pub use fixtures::{SubItem, TestItem};
pub use remote::RemoteStub;
pub use suite::{optimistic_locking_suite, storer_suite};
