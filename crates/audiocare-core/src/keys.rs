//! Storage key conventions.
//!
//! Pure string functions. These define the canonical layout of records in
//! whatever key-value backend persists sessions; nothing outside the storage
//! crate should build keys by hand.

use crate::ids::{CustomerId, VisitId};

pub const SESSIONS_PREFIX: &str = "sessions/";

pub const BACKUPS_PREFIX: &str = "backups/";

pub fn session(customer: &CustomerId, visit: &VisitId) -> String {
    format!("sessions/{customer}/{visit}.json")
}

pub fn customer_sessions_prefix(customer: &CustomerId) -> String {
    format!("sessions/{customer}/")
}

pub fn backup(timestamp: jiff::Timestamp) -> String {
    format!("backups/audiocare-backup-{}.json", timestamp.as_second())
}

/// Split a session key back into its customer and visit ids.
pub fn parse_session(key: &str) -> Option<(CustomerId, VisitId)> {
    let rest = key.strip_prefix(SESSIONS_PREFIX)?;
    let (customer, file) = rest.split_once('/')?;
    let visit = file.strip_suffix(".json")?;
    if customer.is_empty() || visit.is_empty() || visit.contains('/') {
        return None;
    }
    Some((CustomerId::from(customer), VisitId::from(visit)))
}
