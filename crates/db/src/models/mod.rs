//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the operations that mutate it
//!
//! Enum-ish columns are stored as TEXT and surfaced as `String` on the row
//! structs; typed accessors convert through the `riftdraft-core` enums.

pub mod game;
pub mod ledger;
pub mod message;
pub mod participant;
pub mod session;
