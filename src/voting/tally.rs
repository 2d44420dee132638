use std::collections::HashMap;

use crate::error::Result;
use crate::model::{
    common::{CandidateId, ElectionId, Served},
    db::Candidate,
};

use super::VotingCore;

/// Vote counts for one election, computed fresh from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub election_id: ElectionId,
    /// The candidates listed for the election, in catalog order.
    pub candidates: Vec<Candidate>,
    /// Votes per candidate ID. Every listed candidate has an entry, and so
    /// does every unlisted candidate ID that received votes.
    pub counts: HashMap<CandidateId, u64>,
    /// Sum of all counts.
    pub total_votes: u64,
}

impl Tally {
    pub fn new(
        election_id: ElectionId,
        candidates: Vec<Candidate>,
        mut counts: HashMap<CandidateId, u64>,
    ) -> Self {
        for candidate in &candidates {
            counts.entry(candidate.id).or_insert(0);
        }
        let total_votes = counts.values().sum();
        Self {
            election_id,
            candidates,
            counts,
            total_votes,
        }
    }

    pub fn count(&self, candidate: CandidateId) -> u64 {
        self.counts.get(&candidate).copied().unwrap_or(0)
    }

    pub fn percentage(&self, candidate: CandidateId) -> u64 {
        percentage(self.count(candidate), self.total_votes)
    }

    /// Candidate IDs that received votes but are not listed for the election.
    pub fn unlisted(&self) -> impl Iterator<Item = (CandidateId, u64)> + '_ {
        self.counts
            .iter()
            .filter(|(id, _)| !self.candidates.iter().any(|c| c.id == **id))
            .map(|(id, count)| (*id, *count))
    }
}

/// `count` as a whole-number percentage of `total`, rounded half up.
/// Zero if there are no votes at all.
pub fn percentage(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (count * 200 + total) / (total * 2)
}

impl VotingCore {
    /// Count the votes in an election, from whichever store holds it.
    ///
    /// Never cached: a voter always sees their own vote in the next tally.
    pub async fn compute_tally(&self, election_id: ElectionId) -> Result<Served<Tally>> {
        let (store, _) = self.locate(election_id).await?;
        let candidates = store.candidates(election_id).await?;
        let counts = store.count_votes(election_id).await?;
        Ok(Served::new(
            store.mode(),
            Tally::new(election_id, candidates, counts),
        ))
    }
}
