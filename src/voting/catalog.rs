use crate::error::{Error, Result};
use crate::model::{
    common::{ElectionId, Served},
    db::{Candidate, Election},
};

use super::VotingCore;

impl VotingCore {
    /// All active elections, earliest start first.
    ///
    /// If the primary store has none, or cannot be reached, the fallback
    /// store's elections are served instead, tagged as demo data.
    pub async fn list_active_elections(&self) -> Result<Served<Vec<Election>>> {
        self.read(
            "active elections",
            |store| store.active_elections(),
            |elections: &Vec<Election>| !elections.is_empty(),
        )
        .await
    }

    /// The candidates standing in an election. No candidates is not an error.
    ///
    /// Candidates come from the store holding the election, so they always
    /// match what [`Self::cast_vote`] accepts and [`Self::compute_tally`] counts.
    /// Only when no store holds the election is the candidate list read on its
    /// own, with an empty primary list falling back to the fallback store's
    /// candidates for the same election ID.
    pub async fn list_candidates(
        &self,
        election_id: ElectionId,
    ) -> Result<Served<Vec<Candidate>>> {
        match self.locate(election_id).await {
            Ok((store, _)) => {
                let candidates = store.candidates(election_id).await?;
                Ok(Served::new(store.mode(), candidates))
            }
            Err(Error::UnknownElection(_)) => {
                self.read(
                    "candidates",
                    move |store| store.candidates(election_id),
                    |candidates: &Vec<Candidate>| !candidates.is_empty(),
                )
                .await
            }
            Err(err) => Err(err),
        }
    }

    /// A single election with its candidates, both from the store that holds it.
    pub async fn election(
        &self,
        election_id: ElectionId,
    ) -> Result<Served<(Election, Vec<Candidate>)>> {
        let (store, election) = self.locate(election_id).await?;
        let candidates = store.candidates(election_id).await?;
        Ok(Served::new(store.mode(), (election, candidates)))
    }
}
