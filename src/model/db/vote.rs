use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{CandidateId, ElectionId, VoteId, VoterId};

/// A committed vote. Votes are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: VoteId,
    pub voter_id: VoterId,
    /// Foreign Key election ID; unique together with `voter_id`.
    pub election_id: ElectionId,
    /// Foreign Key candidate ID.
    pub candidate_id: CandidateId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
}

impl Vote {
    /// Create a new vote with a fresh ID, not yet stored anywhere.
    pub fn new(voter_id: VoterId, election_id: ElectionId, candidate_id: CandidateId) -> Self {
        Self {
            id: VoteId::new(),
            voter_id,
            election_id,
            candidate_id,
            cast_at: Utc::now(),
        }
    }
}
