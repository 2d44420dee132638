use std::collections::HashMap;

use log::{debug, warn};
use mongodb::{
    bson::{doc, from_document, Document},
    error::Error as DbError,
    options::FindOptions,
    Database,
};
use rocket::futures::TryStreamExt;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{
    common::{CandidateId, ElectionId, StoreMode, VoterId},
    db::{Candidate, Election, Vote, VoterProfile},
    mongodb::{is_duplicate_key_error, Coll},
};

use super::Store;

/// The durable store, backed by MongoDB.
///
/// The one-vote-per-voter-per-election rule is enforced by the unique index
/// created in [`crate::model::mongodb::ensure_indexes_exist`].
#[derive(Clone)]
pub struct MongoStore {
    profiles: Coll<VoterProfile>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
}

impl MongoStore {
    pub fn from_db(db: &Database) -> Self {
        Self {
            profiles: Coll::from_db(db),
            elections: Coll::from_db(db),
            candidates: Coll::from_db(db),
            votes: Coll::from_db(db),
        }
    }
}

/// One row of the tally aggregation.
#[derive(Deserialize)]
struct CandidateCount {
    #[serde(rename = "_id")]
    candidate_id: CandidateId,
    count: u64,
}

#[rocket::async_trait]
impl Store for MongoStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Primary
    }

    async fn profile(&self, voter: &VoterId) -> Result<Option<VoterProfile>> {
        let profile = self
            .profiles
            .find_one(doc! { "_id": voter.clone() }, None)
            .await?;
        Ok(profile)
    }

    async fn create_profile(&self, profile: VoterProfile) -> Result<VoterProfile> {
        match self.profiles.insert_one(&profile, None).await {
            Ok(_) => Ok(profile),
            Err(err) if is_duplicate_key_error(&err) => {
                // Someone else provisioned this voter first; theirs wins.
                debug!("Profile for voter {} already exists", profile.voter_id);
                self.profile(&profile.voter_id).await?.ok_or_else(|| {
                    Error::TransientIo(format!(
                        "Profile for voter {} conflicted but could not be read back",
                        profile.voter_id
                    ))
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn active_elections(&self) -> Result<Vec<Election>> {
        let by_start_time = FindOptions::builder().sort(doc! { "start_time": 1 }).build();
        let elections = self
            .elections
            .find(doc! { "is_active": true }, by_start_time)
            .await?
            .try_collect()
            .await?;
        Ok(elections)
    }

    async fn election(&self, election: ElectionId) -> Result<Option<Election>> {
        Ok(self.elections.find_one(election.as_doc(), None).await?)
    }

    async fn candidates(&self, election: ElectionId) -> Result<Vec<Candidate>> {
        let candidates = self
            .candidates
            .find(doc! { "election_id": election }, None)
            .await?
            .try_collect()
            .await?;
        Ok(candidates)
    }

    async fn candidate(
        &self,
        election: ElectionId,
        candidate: CandidateId,
    ) -> Result<Option<Candidate>> {
        let filter = doc! {
            "_id": candidate,
            "election_id": election,
        };
        Ok(self.candidates.find_one(filter, None).await?)
    }

    async fn vote(&self, voter: &VoterId, election: ElectionId) -> Result<Option<Vote>> {
        let filter = doc! {
            "voter_id": voter.clone(),
            "election_id": election,
        };
        Ok(self.votes.find_one(filter, None).await?)
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<()> {
        match self.votes.insert_one(vote, None).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key_error(&err) => {
                warn!(
                    "Rejected second vote by voter {} in election {}",
                    vote.voter_id, vote.election_id
                );
                Err(Error::AlreadyVoted {
                    voter: vote.voter_id.clone(),
                    election: vote.election_id,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn count_votes(&self, election: ElectionId) -> Result<HashMap<CandidateId, u64>> {
        let pipeline = [
            doc! { "$match": { "election_id": election } },
            doc! { "$group": { "_id": "$candidate_id", "count": { "$sum": 1 } } },
        ];
        let rows = self
            .votes
            .aggregate(pipeline, None)
            .await?
            .try_collect::<Vec<Document>>()
            .await?;

        let mut counts = HashMap::with_capacity(rows.len());
        for row in rows {
            let row: CandidateCount = from_document(row).map_err(DbError::from)?;
            counts.insert(row.candidate_id, row.count);
        }
        Ok(counts)
    }
}
