use chrono::{NaiveDate, Utc};
use phonenumber::PhoneNumber;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{GovernmentIdType, VoterId},
    db::VoterProfile,
};

/// Registration attributes collected by the identity gateway at sign-up.
///
/// Every field is optional on the wire; [`RegistrationClaims::to_profile`]
/// decides whether they are complete enough to provision a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub government_id: Option<String>,
    /// One of `voter_id`, `aadhaar`, `pan`, `passport`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub government_id_type: Option<String>,
    /// ISO 8601 date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// International format, e.g. `+919876543210`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl RegistrationClaims {
    /// Build a new profile for the given voter.
    ///
    /// Fails with [`Error::IncompleteRegistration`] naming every required field that
    /// is missing, blank or malformed, plus the phone number if one was given but
    /// cannot be parsed.
    pub fn to_profile(&self, voter_id: VoterId) -> Result<VoterProfile> {
        let mut invalid = Vec::new();

        let full_name = non_blank(&self.full_name);
        if full_name.is_none() {
            invalid.push("full_name");
        }
        let government_id = non_blank(&self.government_id);
        if government_id.is_none() {
            invalid.push("government_id");
        }
        let government_id_type = non_blank(&self.government_id_type)
            .and_then(|kind| kind.parse::<GovernmentIdType>().ok());
        if government_id_type.is_none() {
            invalid.push("government_id_type");
        }
        let date_of_birth = non_blank(&self.date_of_birth)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok());
        if date_of_birth.is_none() {
            invalid.push("date_of_birth");
        }
        let phone_number = match non_blank(&self.phone_number) {
            Some(number) => match number.parse::<PhoneNumber>() {
                Ok(number) => Some(number.to_string()),
                Err(_) => {
                    invalid.push("phone_number");
                    None
                }
            },
            None => None,
        };

        match (full_name, government_id, government_id_type, date_of_birth) {
            (Some(full_name), Some(government_id), Some(government_id_type), Some(date_of_birth))
                if invalid.is_empty() =>
            {
                Ok(VoterProfile {
                    voter_id,
                    full_name: full_name.to_string(),
                    government_id_type,
                    government_id: government_id.to_string(),
                    date_of_birth,
                    phone_number,
                    created_at: Utc::now(),
                })
            }
            _ => Err(Error::IncompleteRegistration(invalid)),
        }
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
