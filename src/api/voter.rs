use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::logging::RequestId;
use crate::model::{
    api::{
        auth::VoterToken,
        ballot::{BallotStatus, CastOutcome, CastRequest},
        profile::ProfileDesc,
    },
    common::{ElectionId, Served},
};
use crate::voting::VotingCore;

pub fn routes() -> Vec<Route> {
    routes![profile, ballot_status, cast_vote]
}

/// The voter's profile, created from their registration claims on first visit.
#[get("/voter/profile")]
async fn profile(
    token: VoterToken,
    core: &State<VotingCore>,
) -> Result<Json<Served<ProfileDesc>>> {
    let served = core
        .get_or_create_profile(&token.voter_id, &token.registration)
        .await?;
    Ok(Json(served.map(Into::into)))
}

#[get("/voter/elections/<election_id>/vote")]
async fn ballot_status(
    token: VoterToken,
    election_id: ElectionId,
    core: &State<VotingCore>,
) -> Result<Json<Served<BallotStatus>>> {
    let served = core.vote_of(&token.voter_id, election_id).await?;
    Ok(Json(served.map(Into::into)))
}

/// Cast a vote. Having already voted is reported as an outcome in its own
/// right, together with the voter's existing receipt.
#[post("/voter/elections/<election_id>/vote", data = "<request>", format = "json")]
async fn cast_vote(
    token: VoterToken,
    election_id: ElectionId,
    request: Json<CastRequest>,
    core: &State<VotingCore>,
    request_id: &RequestId,
) -> Result<Json<Served<CastOutcome>>> {
    match core
        .cast_vote(&token.voter_id, election_id, request.candidate_id)
        .await
    {
        Ok(served) => Ok(Json(served.map(|vote| CastOutcome::Recorded {
            receipt: vote.into(),
        }))),
        Err(Error::AlreadyVoted { .. }) => {
            info!("req{request_id}: voter {} had already voted", token.voter_id);
            let existing = core.vote_of(&token.voter_id, election_id).await?;
            Ok(Json(existing.map(|vote| CastOutcome::AlreadyVoted {
                receipt: vote.map(Into::into),
            })))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mongodb::Database;
    use rocket::{
        http::{ContentType, Cookie, Status},
        local::asynchronous::{Client, LocalResponse},
        serde::json::{json, serde_json},
    };
    use serde::de::DeserializeOwned;

    use crate::api::testing::{bearer, demo_client, voter_cookie};
    use crate::model::{
        api::auth::{RegistrationClaims, AUTH_TOKEN_COOKIE},
        common::{CandidateId, StoreMode},
        db::{Candidate, Election, Vote},
        mongodb::Coll,
    };
    use crate::store::testing::FlakyStore;
    use crate::store::FallbackStore;
    use crate::voting::testing::{fast_policy, two_way_race};

    use super::*;

    async fn body<T: DeserializeOwned>(response: LocalResponse<'_>) -> T {
        let raw = response.into_string().await.unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    fn vote_for(candidate: CandidateId) -> String {
        json!({ "candidate_id": candidate.to_string() }).to_string()
    }

    #[rocket::async_test]
    async fn profile_is_created_then_returned() {
        let (client, ..) = demo_client().await;

        let response = client
            .get(uri!(profile))
            .cookie(voter_cookie("voter-1"))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let first = body::<Served<ProfileDesc>>(response).await;
        assert_eq!(first.mode, StoreMode::Fallback);
        assert_eq!(first.data.voter_id, "voter-1");
        assert_eq!(first.data.full_name, "Priya Sharma");

        // Later tokens need not carry the claims at all.
        let response = client
            .get(uri!(profile))
            .header(bearer("voter-1", None))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let second = body::<Served<ProfileDesc>>(response).await;
        assert_eq!(second.data, first.data);
    }

    #[rocket::async_test]
    async fn incomplete_registration_is_unprocessable() {
        let (client, ..) = demo_client().await;
        let claims = RegistrationClaims {
            government_id: None,
            ..RegistrationClaims::example()
        };

        let response = client
            .get(uri!(profile))
            .header(bearer("voter-1", Some(claims)))
            .dispatch()
            .await;
        assert_eq!(Status::UnprocessableEntity, response.status());
    }

    #[rocket::async_test]
    async fn missing_or_forged_tokens_are_unauthorized() {
        let (client, election, ..) = demo_client().await;

        let response = client.get(uri!(profile)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());

        let response = client
            .get(uri!(ballot_status(election.id)))
            .cookie(Cookie::new(AUTH_TOKEN_COOKIE, "not.a.token"))
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[rocket::async_test]
    async fn unmanaged_config_is_a_server_error() {
        let core = VotingCore::demo(Arc::new(FallbackStore::new()), fast_policy());
        let rocket = rocket::build()
            .mount("/", crate::api::routes())
            .manage(core);
        let client = Client::tracked(rocket).await.unwrap();

        let response = client
            .get(uri!(profile))
            .cookie(voter_cookie("voter-1"))
            .dispatch()
            .await;
        assert_eq!(Status::InternalServerError, response.status());
    }

    #[rocket::async_test]
    async fn cast_then_status_then_already_voted() {
        let (client, election, a, b) = demo_client().await;

        let response = client
            .get(uri!(ballot_status(election.id)))
            .cookie(voter_cookie("voter-1"))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let status = body::<Served<BallotStatus>>(response).await;
        assert!(!status.data.has_voted);

        let response = client
            .post(uri!(cast_vote(election.id)))
            .cookie(voter_cookie("voter-1"))
            .header(ContentType::JSON)
            .body(vote_for(a.id))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let receipt = match body::<Served<CastOutcome>>(response).await.data {
            CastOutcome::Recorded { receipt } => receipt,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(receipt.candidate_id, a.id);

        let response = client
            .get(uri!(ballot_status(election.id)))
            .cookie(voter_cookie("voter-1"))
            .dispatch()
            .await;
        let status = body::<Served<BallotStatus>>(response).await;
        assert!(status.data.has_voted);
        assert_eq!(status.data.receipt.as_ref(), Some(&receipt));

        // A second attempt is a confirmation carrying the original receipt.
        let response = client
            .post(uri!(cast_vote(election.id)))
            .cookie(voter_cookie("voter-1"))
            .header(ContentType::JSON)
            .body(vote_for(b.id))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let outcome = body::<Served<CastOutcome>>(response).await.data;
        assert_eq!(
            outcome,
            CastOutcome::AlreadyVoted {
                receipt: Some(receipt)
            }
        );
    }

    #[rocket::async_test]
    async fn foreign_candidate_is_a_bad_request() {
        let (client, election, ..) = demo_client().await;

        let response = client
            .post(uri!(cast_vote(election.id)))
            .cookie(voter_cookie("voter-1"))
            .header(ContentType::JSON)
            .body(vote_for(CandidateId::new()))
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        let response = client
            .get(uri!(ballot_status(election.id)))
            .cookie(voter_cookie("voter-1"))
            .dispatch()
            .await;
        assert!(!body::<Served<BallotStatus>>(response).await.data.has_voted);
    }

    #[rocket::async_test]
    async fn closed_election_is_forbidden() {
        let closed = Election::inactive_example();
        let candidate = Candidate::example(closed.id, "A", "Party A");
        let fallback = FallbackStore::new();
        fallback.insert_election(closed.clone(), vec![candidate.clone()]);
        let core = VotingCore::demo(Arc::new(fallback), fast_policy());
        let client = Client::tracked(crate::rocket_for(core)).await.unwrap();

        let response = client
            .post(uri!(cast_vote(closed.id)))
            .cookie(voter_cookie("voter-1"))
            .header(ContentType::JSON)
            .body(vote_for(candidate.id))
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
    }

    #[rocket::async_test]
    async fn primary_outage_is_service_unavailable_for_votes() {
        let (election, a, b) = two_way_race();
        let primary = Arc::new(FlakyStore::new());
        primary.inner.insert_election(election.clone(), vec![a.clone(), b]);
        primary.go_offline();
        let core = VotingCore::new(primary, Arc::new(FallbackStore::new()), fast_policy());
        let client = Client::tracked(crate::rocket_for(core)).await.unwrap();

        let response = client
            .post(uri!(cast_vote(election.id)))
            .cookie(voter_cookie("voter-1"))
            .header(ContentType::JSON)
            .body(vote_for(a.id))
            .dispatch()
            .await;
        assert_eq!(Status::ServiceUnavailable, response.status());
    }

    #[backend_test]
    async fn votes_are_recorded_in_mongodb(
        client: Client,
        db: Database,
        stored_votes: Coll<Vote>,
    ) {
        let election = Election::current_example();
        let candidate = Candidate::example(election.id, "Ravi Nair", "People's Front");
        Coll::<Election>::from_db(&db)
            .insert_one(&election, None)
            .await
            .unwrap();
        Coll::<Candidate>::from_db(&db)
            .insert_one(&candidate, None)
            .await
            .unwrap();

        for _ in 0..2 {
            let response = client
                .post(uri!(cast_vote(election.id)))
                .cookie(voter_cookie("voter-1"))
                .header(ContentType::JSON)
                .body(vote_for(candidate.id))
                .dispatch()
                .await;
            assert_eq!(Status::Ok, response.status());
            assert_eq!(
                body::<Served<CastOutcome>>(response).await.mode,
                StoreMode::Primary
            );
        }

        let votes = stored_votes
            .count_documents(mongodb::bson::doc! { "election_id": election.id }, None)
            .await
            .unwrap();
        assert_eq!(votes, 1);
    }
}
