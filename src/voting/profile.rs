use log::info;

use crate::error::Result;
use crate::model::{
    api::auth::RegistrationClaims,
    common::{Served, VoterId},
    db::VoterProfile,
};

use super::VotingCore;

impl VotingCore {
    /// Return the voter's profile, provisioning it from their registration
    /// claims on first use.
    ///
    /// Claims are ignored once a profile exists. Profiles are only ever read
    /// from and written to the primary store when one is configured: an outage
    /// is reported rather than registering the voter somewhere temporary.
    pub async fn get_or_create_profile(
        &self,
        voter: &VoterId,
        claims: &RegistrationClaims,
    ) -> Result<Served<VoterProfile>> {
        let store = self.profile_store();
        if let Some(profile) = store.profile(voter).await? {
            return Ok(Served::new(store.mode(), profile));
        }

        let profile = claims.to_profile(voter.clone())?;
        let profile = store.create_profile(profile).await?;
        info!("Provisioned profile for voter {voter}");
        Ok(Served::new(store.mode(), profile))
    }
}
