use std::fmt::{Display, Formatter};
use std::str::FromStr;

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// The opaque, stable voter identifier supplied by the identity gateway.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VoterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<VoterId> for Bson {
    fn from(id: VoterId) -> Self {
        Bson::String(id.0)
    }
}

/// The kinds of government identity document accepted at registration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernmentIdType {
    VoterId,
    Aadhaar,
    Pan,
    Passport,
}

impl FromStr for GovernmentIdType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voter_id" => Ok(Self::VoterId),
            "aadhaar" => Ok(Self::Aadhaar),
            "pan" => Ok(Self::Pan),
            "passport" => Ok(Self::Passport),
            _ => Err(()),
        }
    }
}
