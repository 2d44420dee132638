use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Utc};
use log::{info, warn};

use crate::error::{Error, Result};
use crate::model::{
    common::{CandidateId, ElectionId, StoreMode, VoterId},
    db::{Candidate, Election, Vote, VoterProfile},
};

use super::Store;

/// A process-local stand-in for the primary store.
///
/// Everything lives in memory and vanishes with the process; nothing is ever
/// synchronised to the primary store. Results are always reported as
/// [`StoreMode::Fallback`] so that voters can be told they are in demo mode.
///
/// The lock is only ever held for synchronous work, never across an `.await`.
#[derive(Default)]
pub struct FallbackStore {
    state: Mutex<LocalState>,
}

#[derive(Default)]
struct LocalState {
    profiles: HashMap<VoterId, VoterProfile>,
    elections: Vec<Election>,
    candidates: Vec<Candidate>,
    votes: HashMap<(VoterId, ElectionId), Vote>,
}

impl FallbackStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with a single open demo election.
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        let election = Election {
            id: ElectionId::new(),
            title: "Demo Election".to_string(),
            description: "A practice ballot. Votes cast here are not recorded permanently."
                .to_string(),
            start_time: Utc::now() - Duration::days(1),
            end_time: Utc::now() + Duration::days(30),
            is_active: true,
        };
        let candidates = [
            ("Asha Verma", "Progressive Alliance", "Education and public health."),
            ("Ravi Nair", "People's Front", "Infrastructure and jobs."),
            ("Meera Iyer", "Independent", "Local governance and transparency."),
        ]
        .into_iter()
        .map(|(name, party, pitch)| Candidate {
            id: CandidateId::new(),
            election_id: election.id,
            name: name.to_string(),
            party_name: party.to_string(),
            description: Some(pitch.to_string()),
            symbol_ref: None,
        })
        .collect();
        info!("Seeded demo election {} ({})", election.title, election.id);
        store.insert_election(election, candidates);
        store
    }

    /// Add an election and its candidates.
    pub fn insert_election(&self, election: Election, candidates: Vec<Candidate>) {
        let mut state = self.state();
        state.elections.push(election);
        state.candidates.extend(candidates);
    }

    fn state(&self) -> MutexGuard<'_, LocalState> {
        // A panic mid-update cannot leave a half-written entry behind, as
        // every mutation is a single insert.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[rocket::async_trait]
impl Store for FallbackStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Fallback
    }

    async fn profile(&self, voter: &VoterId) -> Result<Option<VoterProfile>> {
        Ok(self.state().profiles.get(voter).cloned())
    }

    async fn create_profile(&self, profile: VoterProfile) -> Result<VoterProfile> {
        let mut state = self.state();
        let stored = state
            .profiles
            .entry(profile.voter_id.clone())
            .or_insert(profile);
        Ok(stored.clone())
    }

    async fn active_elections(&self) -> Result<Vec<Election>> {
        let mut elections = self
            .state()
            .elections
            .iter()
            .filter(|e| e.is_active)
            .cloned()
            .collect::<Vec<_>>();
        elections.sort_by_key(|e| e.start_time);
        Ok(elections)
    }

    async fn election(&self, election: ElectionId) -> Result<Option<Election>> {
        Ok(self
            .state()
            .elections
            .iter()
            .find(|e| e.id == election)
            .cloned())
    }

    async fn candidates(&self, election: ElectionId) -> Result<Vec<Candidate>> {
        Ok(self
            .state()
            .candidates
            .iter()
            .filter(|c| c.election_id == election)
            .cloned()
            .collect())
    }

    async fn candidate(
        &self,
        election: ElectionId,
        candidate: CandidateId,
    ) -> Result<Option<Candidate>> {
        Ok(self
            .state()
            .candidates
            .iter()
            .find(|c| c.id == candidate && c.election_id == election)
            .cloned())
    }

    async fn vote(&self, voter: &VoterId, election: ElectionId) -> Result<Option<Vote>> {
        Ok(self
            .state()
            .votes
            .get(&(voter.clone(), election))
            .cloned())
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<()> {
        let mut state = self.state();
        let key = (vote.voter_id.clone(), vote.election_id);
        if state.votes.contains_key(&key) {
            warn!(
                "Rejected second demo vote by voter {} in election {}",
                vote.voter_id, vote.election_id
            );
            return Err(Error::AlreadyVoted {
                voter: vote.voter_id.clone(),
                election: vote.election_id,
            });
        }
        state.votes.insert(key, vote.clone());
        Ok(())
    }

    async fn count_votes(&self, election: ElectionId) -> Result<HashMap<CandidateId, u64>> {
        let mut counts = HashMap::new();
        for vote in self
            .state()
            .votes
            .values()
            .filter(|v| v.election_id == election)
        {
            *counts.entry(vote.candidate_id).or_default() += 1;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn demo_data_is_one_active_election() {
        let store = FallbackStore::with_demo_data();
        let elections = store.active_elections().await.unwrap();
        assert_eq!(elections.len(), 1);
        assert_eq!(store.mode(), StoreMode::Fallback);

        let candidates = store.candidates(elections[0].id).await.unwrap();
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.election_id == elections[0].id));
    }

    #[rocket::async_test]
    async fn active_elections_skip_inactive_and_sort_by_start() {
        let store = FallbackStore::new();
        let later = Election::future_example();
        let now = Election::current_example();
        store.insert_election(later.clone(), vec![]);
        store.insert_election(Election::inactive_example(), vec![]);
        store.insert_election(now.clone(), vec![]);

        let active = store.active_elections().await.unwrap();
        assert_eq!(active, vec![now, later]);
    }

    #[rocket::async_test]
    async fn second_vote_is_rejected_and_first_kept() {
        let store = FallbackStore::new();
        let election = Election::current_example();
        let a = Candidate::example(election.id, "A", "Party A");
        let b = Candidate::example(election.id, "B", "Party B");
        store.insert_election(election.clone(), vec![a.clone(), b.clone()]);
        let voter = VoterId::new("voter-1");

        let first = Vote::new(voter.clone(), election.id, a.id);
        store.insert_vote(&first).await.unwrap();
        let second = store
            .insert_vote(&Vote::new(voter.clone(), election.id, b.id))
            .await;
        assert!(matches!(second, Err(Error::AlreadyVoted { .. })));

        assert_eq!(store.vote(&voter, election.id).await.unwrap(), Some(first));
        let counts = store.count_votes(election.id).await.unwrap();
        assert_eq!(counts.get(&a.id), Some(&1));
        assert_eq!(counts.get(&b.id), None);
    }

    #[rocket::async_test]
    async fn candidates_do_not_leak_across_elections() {
        let store = FallbackStore::new();
        let e1 = Election::current_example();
        let e2 = Election::current_example();
        let a = Candidate::example(e1.id, "A", "Party A");
        store.insert_election(e1.clone(), vec![a.clone()]);
        store.insert_election(e2.clone(), vec![]);

        assert!(store.candidate(e1.id, a.id).await.unwrap().is_some());
        assert!(store.candidate(e2.id, a.id).await.unwrap().is_none());
        assert!(store.candidates(e2.id).await.unwrap().is_empty());
    }
}
