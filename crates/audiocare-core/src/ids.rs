use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

/// Identifier of a customer record.
///
/// Stored as a plain string: records written by earlier versions of the
/// clinic app carry ids that are not UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerId(pub String);

/// Identifier of a single visit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VisitId(pub String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Mint a fresh random id.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Check that the id can be used as a single storage path segment.
            pub fn validate(&self) -> Result<(), CoreError> {
                let id = self.0.as_str();
                if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
                    return Err(CoreError::InvalidId(id.to_string()));
                }
                Ok(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(CustomerId);
string_id!(VisitId);
