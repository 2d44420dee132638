use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{CandidateId, ElectionId, VoteId},
    db::Vote,
    mongodb::id_as_hex,
};

/// The body of a vote-casting request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastRequest {
    #[serde(with = "id_as_hex")]
    pub candidate_id: CandidateId,
}

/// A voter's own record of their vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    #[serde(with = "id_as_hex")]
    pub vote_id: VoteId,
    #[serde(with = "id_as_hex")]
    pub election_id: ElectionId,
    #[serde(with = "id_as_hex")]
    pub candidate_id: CandidateId,
    pub cast_at: DateTime<Utc>,
}

impl From<Vote> for VoteReceipt {
    fn from(vote: Vote) -> Self {
        Self {
            vote_id: vote.id,
            election_id: vote.election_id,
            candidate_id: vote.candidate_id,
            cast_at: vote.cast_at,
        }
    }
}

/// Whether the voter has voted in an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotStatus {
    pub has_voted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<VoteReceipt>,
}

impl From<Option<Vote>> for BallotStatus {
    fn from(vote: Option<Vote>) -> Self {
        Self {
            has_voted: vote.is_some(),
            receipt: vote.map(Into::into),
        }
    }
}

/// The outcome of a vote-casting request.
///
/// Having already voted is an expected outcome, not a failure: clients
/// render it as a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CastOutcome {
    Recorded { receipt: VoteReceipt },
    AlreadyVoted { receipt: Option<VoteReceipt> },
}
