use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{common::GovernmentIdType, db::VoterProfile};

/// An API-friendly voter profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDesc {
    pub voter_id: String,
    pub full_name: String,
    pub government_id_type: GovernmentIdType,
    pub government_id: String,
    pub date_of_birth: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<VoterProfile> for ProfileDesc {
    fn from(profile: VoterProfile) -> Self {
        Self {
            voter_id: profile.voter_id.to_string(),
            full_name: profile.full_name,
            government_id_type: profile.government_id_type,
            government_id: profile.government_id,
            date_of_birth: profile.date_of_birth,
            phone_number: profile.phone_number,
            created_at: profile.created_at,
        }
    }
}
