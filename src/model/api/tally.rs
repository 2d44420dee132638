use serde::{Deserialize, Serialize};

use crate::model::{
    common::{CandidateId, ElectionId},
    mongodb::id_as_hex,
};
use crate::voting::{percentage, Tally};

/// One line of a tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    #[serde(with = "id_as_hex")]
    pub candidate_id: CandidateId,
    /// Absent for votes whose candidate is no longer listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_name: Option<String>,
    pub votes: u64,
    pub percentage: u64,
}

/// Election results as shown to voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyDesc {
    #[serde(with = "id_as_hex")]
    pub election_id: ElectionId,
    pub total_votes: u64,
    /// Listed candidates, in catalog order, including those with no votes.
    pub candidates: Vec<CandidateTally>,
    /// Votes for candidate IDs the catalog does not list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlisted: Vec<CandidateTally>,
}

impl From<Tally> for TallyDesc {
    fn from(tally: Tally) -> Self {
        let total = tally.total_votes;
        let line = |candidate_id, votes| CandidateTally {
            candidate_id,
            name: None,
            party_name: None,
            votes,
            percentage: percentage(votes, total),
        };

        let mut unlisted = tally
            .unlisted()
            .map(|(id, votes)| line(id, votes))
            .collect::<Vec<_>>();
        unlisted.sort_by(|a, b| b.votes.cmp(&a.votes));

        let candidates = tally
            .candidates
            .iter()
            .map(|candidate| CandidateTally {
                name: Some(candidate.name.clone()),
                party_name: Some(candidate.party_name.clone()),
                ..line(candidate.id, tally.count(candidate.id))
            })
            .collect();

        Self {
            election_id: tally.election_id,
            total_votes: total,
            candidates,
            unlisted,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::model::db::{Candidate, Election};

    use super::*;

    #[test]
    fn listed_candidates_keep_catalog_order() {
        let election = Election::current_example();
        let a = Candidate::example(election.id, "A", "Party A");
        let b = Candidate::example(election.id, "B", "Party B");
        let orphan = CandidateId::new();
        let tally = Tally::new(
            election.id,
            vec![a.clone(), b.clone()],
            HashMap::from([(b.id, 2), (orphan, 1)]),
        );

        let desc = TallyDesc::from(tally);
        assert_eq!(desc.total_votes, 3);
        let lines = desc
            .candidates
            .iter()
            .map(|line| (line.candidate_id, line.votes, line.percentage))
            .collect::<Vec<_>>();
        assert_eq!(lines, vec![(a.id, 0, 0), (b.id, 2, 67)]);
        assert_eq!(desc.candidates[1].name.as_deref(), Some("B"));

        assert_eq!(desc.unlisted.len(), 1);
        assert_eq!(desc.unlisted[0].candidate_id, orphan);
        assert_eq!(desc.unlisted[0].name, None);
        assert_eq!(desc.unlisted[0].percentage, 33);
    }
}
