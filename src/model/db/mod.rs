//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.
//!
//! The fallback store keeps the very same types in memory.

mod election;
pub use election::{Candidate, Election};

mod profile;
pub use profile::VoterProfile;

mod vote;
pub use vote::Vote;
