//! audiocare-core
//!
//! Shared vocabulary of the audiocare system: identifiers, ears, test
//! frequencies, modalities, tri-state checklist values, and storage key
//! conventions. Pure types, no I/O.

pub mod error;
pub mod ids;
pub mod keys;
pub mod models;
