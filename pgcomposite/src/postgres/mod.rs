//! Postgres type system and binary format.
//!
//! <https://www.postgresql.org/docs/current/rowtypes.html>
mod pg_type;
mod error;

pub use pg_type::{Oid, PgType, oid};
pub use error::ProtocolError;

/// Length prefix which indicates a `NULL` value in the binary format.
pub const NULL_LEN: i32 = -1;
