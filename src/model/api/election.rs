use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{CandidateId, ElectionId},
    db::{Candidate, Election},
    mongodb::id_as_hex,
};

/// An API-friendly view of an election's top-level data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    #[serde(with = "id_as_hex")]
    pub id: ElectionId,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_active: bool,
}

impl From<Election> for ElectionSummary {
    fn from(election: Election) -> Self {
        Self {
            id: election.id,
            title: election.title,
            description: election.description,
            start_time: election.start_time,
            end_time: election.end_time,
            is_active: election.is_active,
        }
    }
}

/// An API-friendly candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDesc {
    #[serde(with = "id_as_hex")]
    pub id: CandidateId,
    #[serde(with = "id_as_hex")]
    pub election_id: ElectionId,
    pub name: String,
    pub party_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_ref: Option<String>,
}

impl From<Candidate> for CandidateDesc {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            election_id: candidate.election_id,
            name: candidate.name,
            party_name: candidate.party_name,
            description: candidate.description,
            symbol_ref: candidate.symbol_ref,
        }
    }
}

/// An election together with everyone standing in it: what a ballot page needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    #[serde(flatten)]
    pub election: ElectionSummary,
    pub candidates: Vec<CandidateDesc>,
}

impl From<(Election, Vec<Candidate>)> for ElectionDescription {
    fn from((election, candidates): (Election, Vec<Candidate>)) -> Self {
        Self {
            election: election.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}
