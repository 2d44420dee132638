use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{CandidateId, ElectionId};

/// An election, as stored in the database.
///
/// Elections are written by the administrative process; this service only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    /// Unique ID.
    #[serde(rename = "_id")]
    pub id: ElectionId,
    /// Election title.
    pub title: String,
    /// Free-text description shown to voters.
    #[serde(default)]
    pub description: String,
    /// Displayed start of voting.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    /// Displayed end of voting.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_time: DateTime<Utc>,
    /// Only active elections are listed to voters and accept votes.
    pub is_active: bool,
}

impl Election {
    /// Does this election accept votes at the given time?
    ///
    /// The `[start_time, end_time]` window only counts if `enforce_window` is set;
    /// otherwise the dates are informational and `is_active` alone decides.
    pub fn accepts_votes_at(&self, now: DateTime<Utc>, enforce_window: bool) -> bool {
        self.is_active && (!enforce_window || (self.start_time <= now && now <= self.end_time))
    }
}

/// A candidate standing in exactly one election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique ID.
    #[serde(rename = "_id")]
    pub id: CandidateId,
    /// Foreign Key election ID.
    pub election_id: ElectionId,
    pub name: String,
    pub party_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reference to the party symbol image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_ref: Option<String>,
}
