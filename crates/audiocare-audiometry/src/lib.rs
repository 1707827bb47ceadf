//! audiocare-audiometry
//!
//! Audiometric test data and the clinical rules derived from it. Pure data
//! and pure functions. No storage and no clock.
//!
//! - [`pure_tone`]: per-ear threshold tables (AC/BC/SF) with no-response flags
//!   and eagerly recomputed pure-tone averages.
//! - [`clinical`]: PTA averaging, air-bone gap, loss classification, masking
//!   and disability-eligibility checks. Every function is total.
//! - [`speech`], [`middle_ear`], [`sound_field`], [`verification`]: the other
//!   result sheets recorded during a fitting visit.

pub mod clinical;
pub mod error;
pub mod middle_ear;
pub mod pure_tone;
pub mod sound_field;
pub mod speech;
pub mod verification;
