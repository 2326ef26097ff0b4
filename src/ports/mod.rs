//! Ports (trait boundaries) for external dependencies.
//!
//! Training owns these traits; progress reporting and storage implement
//! them in `pipeline::observers` and `adapters`.

pub mod observer;
pub mod repository;

pub use observer::Observer;
pub use repository::PolicyRepository;
