//! The storage contract shared by the durable primary store and the
//! process-local fallback store.
//!
//! All voting rules live in [`crate::voting`]; a store only has to provide
//! these primitives, and in particular an atomic [`Store::insert_vote`].

use std::collections::HashMap;

use crate::error::Result;
use crate::model::{
    common::{CandidateId, ElectionId, StoreMode, VoterId},
    db::{Candidate, Election, Vote, VoterProfile},
};

mod fallback;
mod primary;
#[cfg(test)]
pub mod testing;

pub use fallback::FallbackStore;
pub use primary::MongoStore;

#[rocket::async_trait]
pub trait Store: Send + Sync {
    /// The mode reported for everything this store serves.
    fn mode(&self) -> StoreMode;

    /// Look up a voter's profile.
    async fn profile(&self, voter: &VoterId) -> Result<Option<VoterProfile>>;

    /// Insert the profile unless the voter already has one, and return the
    /// profile that ends up stored. Concurrent calls for the same voter all
    /// return the same profile.
    async fn create_profile(&self, profile: VoterProfile) -> Result<VoterProfile>;

    /// All active elections, in ascending order of start time.
    async fn active_elections(&self) -> Result<Vec<Election>>;

    async fn election(&self, election: ElectionId) -> Result<Option<Election>>;

    /// Candidates standing in the given election. Unknown elections have none.
    async fn candidates(&self, election: ElectionId) -> Result<Vec<Candidate>>;

    /// Look up a candidate, but only if it stands in the given election.
    async fn candidate(
        &self,
        election: ElectionId,
        candidate: CandidateId,
    ) -> Result<Option<Candidate>>;

    /// The voter's vote in the given election, if any.
    async fn vote(&self, voter: &VoterId, election: ElectionId) -> Result<Option<Vote>>;

    /// Atomically record a vote.
    ///
    /// Fails with [`crate::error::Error::AlreadyVoted`] if any vote already exists
    /// for the same voter and election, in which case nothing is written.
    async fn insert_vote(&self, vote: &Vote) -> Result<()>;

    /// Number of votes per candidate in the given election, for every
    /// candidate ID that received at least one vote.
    async fn count_votes(&self, election: ElectionId) -> Result<HashMap<CandidateId, u64>>;
}
