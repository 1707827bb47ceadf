//! audiocare-export
//!
//! Read-only projection of sessions into flat column/value rows for
//! spreadsheet tools, plus JSON and TSV writers for collections of rows.

pub mod error;
pub mod row;
pub mod table;

pub use row::{ExportRow, flatten_session};
pub use table::ExportTable;
