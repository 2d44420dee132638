use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{GovernmentIdType, VoterId};

/// A voter's profile, provisioned once from their registration claims.
///
/// Keyed by voter ID, so the database guarantees one profile per voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterProfile {
    #[serde(rename = "_id")]
    pub voter_id: VoterId,
    pub full_name: String,
    pub government_id_type: GovernmentIdType,
    pub government_id: String,
    pub date_of_birth: NaiveDate,
    /// Phone number in E.164 format, if one was registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}
