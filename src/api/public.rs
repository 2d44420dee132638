use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{
        election::{CandidateDesc, ElectionDescription, ElectionSummary},
        tally::TallyDesc,
    },
    common::{ElectionId, Served},
};
use crate::voting::VotingCore;

pub fn routes() -> Vec<Route> {
    routes![elections, election, candidates, tally]
}

#[get("/elections")]
async fn elections(core: &State<VotingCore>) -> Result<Json<Served<Vec<ElectionSummary>>>> {
    let served = core.list_active_elections().await?;
    Ok(Json(
        served.map(|elections| elections.into_iter().map(Into::into).collect()),
    ))
}

#[get("/elections/<election_id>")]
async fn election(
    election_id: ElectionId,
    core: &State<VotingCore>,
) -> Result<Json<Served<ElectionDescription>>> {
    let served = core.election(election_id).await?;
    Ok(Json(served.map(Into::into)))
}

#[get("/elections/<election_id>/candidates")]
async fn candidates(
    election_id: ElectionId,
    core: &State<VotingCore>,
) -> Result<Json<Served<Vec<CandidateDesc>>>> {
    let served = core.list_candidates(election_id).await?;
    Ok(Json(
        served.map(|candidates| candidates.into_iter().map(Into::into).collect()),
    ))
}

#[get("/elections/<election_id>/tally")]
async fn tally(
    election_id: ElectionId,
    core: &State<VotingCore>,
) -> Result<Json<Served<TallyDesc>>> {
    let served = core.compute_tally(election_id).await?;
    Ok(Json(served.map(Into::into)))
}
