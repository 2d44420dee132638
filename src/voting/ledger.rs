use chrono::Utc;
use log::{info, warn};
use rocket::tokio::time::sleep;

use crate::error::{Error, Result};
use crate::model::{
    common::{CandidateId, ElectionId, Served, VoterId},
    db::Vote,
};

use super::VotingCore;

impl VotingCore {
    /// Has the voter voted in this election?
    pub async fn has_voted(
        &self,
        voter: &VoterId,
        election_id: ElectionId,
    ) -> Result<Served<bool>> {
        Ok(self.vote_of(voter, election_id).await?.map(|vote| vote.is_some()))
    }

    /// The voter's own vote in this election, if they have cast one.
    pub async fn vote_of(
        &self,
        voter: &VoterId,
        election_id: ElectionId,
    ) -> Result<Served<Option<Vote>>> {
        let (store, _) = self.locate(election_id).await?;
        let vote = store.vote(voter, election_id).await?;
        Ok(Served::new(store.mode(), vote))
    }

    /// Record the voter's vote for a candidate in an election.
    ///
    /// The vote is written with a single conditional insert, so at most one vote
    /// per voter and election is ever committed. A second vote fails with
    /// [`Error::AlreadyVoted`]. Transient failures are retried with the same
    /// vote ID; if an earlier attempt turns out to have committed, that vote is
    /// returned. If every attempt fails transiently the outcome is unknown, and
    /// calling again is safe.
    pub async fn cast_vote(
        &self,
        voter: &VoterId,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<Served<Vote>> {
        let (store, election) = self.locate(election_id).await?;
        if !election.accepts_votes_at(Utc::now(), self.policy.enforce_voting_window) {
            return Err(Error::ElectionClosed(election_id));
        }
        if store.candidate(election_id, candidate_id).await?.is_none() {
            return Err(Error::UnknownCandidate {
                election: election_id,
                candidate: candidate_id,
            });
        }

        let vote = Vote::new(voter.clone(), election_id, candidate_id);
        let mut attempt = 1;
        loop {
            match store.insert_vote(&vote).await {
                Ok(()) => break,
                Err(err @ Error::AlreadyVoted { .. }) if attempt > 1 => {
                    // An earlier attempt may have committed before failing.
                    match store.vote(voter, election_id).await? {
                        Some(committed) if committed.id == vote.id => break,
                        _ => return Err(err),
                    }
                }
                Err(err) if err.is_transient() && attempt < self.policy.cast_attempts => {
                    warn!(
                        "Attempt {attempt} to record vote {} failed ({err}), retrying",
                        vote.id
                    );
                    sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }

        let mode = store.mode();
        info!(
            "Recorded vote {} in election {election_id} ({mode:?} store)",
            vote.id
        );
        Ok(Served::new(mode, vote))
    }
}
