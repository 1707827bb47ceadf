//! audiocare-storage
//!
//! Session persistence. A [`repository::SessionRepository`] trait with an
//! in-memory and a JSON-file implementation, tolerant decoding of records
//! written by earlier versions of the clinic app, and backup/restore bundles.

pub mod backup;
pub mod error;
pub mod file_store;
pub mod legacy;
pub mod repository;
