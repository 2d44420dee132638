//! Types shared between the DB and API representations.

mod mode;
mod voter;

pub use mode::{Served, StoreMode};
pub use voter::{GovernmentIdType, VoterId};

use crate::model::mongodb::Id;

/// Elections are created by the administrative process and keyed by ObjectId.
pub type ElectionId = Id;
/// Candidates are keyed by ObjectId, independent of their election.
pub type CandidateId = Id;
/// Votes are keyed by ObjectId; the ID is chosen before the first insert attempt.
pub type VoteId = Id;
