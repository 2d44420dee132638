//! A misbehaving primary store for exercising degraded mode and retries
//! without a real database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::{Error, Result};
use crate::model::{
    common::{CandidateId, ElectionId, StoreMode, VoterId},
    db::{Candidate, Election, Vote, VoterProfile},
};

use super::{FallbackStore, Store};

/// Wraps an in-memory store but reports itself as the primary store, and can
/// be told to go offline or to lose the acknowledgement of committed votes.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: FallbackStore,
    offline: AtomicBool,
    lost_acks: AtomicU32,
    failed_inserts: AtomicU32,
    insert_attempts: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the server could not be selected.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    /// The next `n` vote inserts commit, then report a timeout anyway.
    pub fn lose_acks(&self, n: u32) {
        self.lost_acks.store(n, Ordering::SeqCst);
    }

    /// The next `n` vote inserts time out without committing anything.
    pub fn fail_inserts(&self, n: u32) {
        self.failed_inserts.store(n, Ordering::SeqCst);
    }

    /// How many times `insert_vote` has been called.
    pub fn insert_attempts(&self) -> u32 {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable(
                "Server selection timeout: no available servers".to_string(),
            ));
        }
        Ok(())
    }
}

#[rocket::async_trait]
impl Store for FlakyStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Primary
    }

    async fn profile(&self, voter: &VoterId) -> Result<Option<VoterProfile>> {
        self.check_online()?;
        self.inner.profile(voter).await
    }

    async fn create_profile(&self, profile: VoterProfile) -> Result<VoterProfile> {
        self.check_online()?;
        self.inner.create_profile(profile).await
    }

    async fn active_elections(&self) -> Result<Vec<Election>> {
        self.check_online()?;
        self.inner.active_elections().await
    }

    async fn election(&self, election: ElectionId) -> Result<Option<Election>> {
        self.check_online()?;
        self.inner.election(election).await
    }

    async fn candidates(&self, election: ElectionId) -> Result<Vec<Candidate>> {
        self.check_online()?;
        self.inner.candidates(election).await
    }

    async fn candidate(
        &self,
        election: ElectionId,
        candidate: CandidateId,
    ) -> Result<Option<Candidate>> {
        self.check_online()?;
        self.inner.candidate(election, candidate).await
    }

    async fn vote(&self, voter: &VoterId, election: ElectionId) -> Result<Option<Vote>> {
        self.check_online()?;
        self.inner.vote(voter, election).await
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<()> {
        self.check_online()?;
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.failed_inserts) {
            return Err(Error::TransientIo("Operation timed out".to_string()));
        }
        self.inner.insert_vote(vote).await?;
        if take_one(&self.lost_acks) {
            return Err(Error::TransientIo("Connection reset by peer".to_string()));
        }
        Ok(())
    }

    async fn count_votes(&self, election: ElectionId) -> Result<HashMap<CandidateId, u64>> {
        self.check_online()?;
        self.inner.count_votes(election).await
    }
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}
