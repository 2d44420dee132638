//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Datetimes are serialised as RFC 3339 strings.
//!
//! Everything served from a store is wrapped in [`crate::model::common::Served`],
//! so clients can always tell demo data from durable data.

pub mod auth;
pub mod ballot;
pub mod election;
pub mod profile;
pub mod tally;
