use jsonwebtoken::errors::Error as JwtError;
use log::{debug, error};
use mongodb::error::{Error as DbError, ErrorKind};
use rocket::{
    http::{Status, StatusClass},
    response::Responder,
};
use thiserror::Error;

use crate::model::common::{CandidateId, ElectionId, VoterId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Registration claims are missing or malformed; the voter must re-register.
    #[error("Incomplete registration, missing or invalid: {}", .0.join(", "))]
    IncompleteRegistration(Vec<&'static str>),
    /// The voter already has a vote recorded for this election.
    #[error("Voter '{voter}' has already voted in election '{election}'")]
    AlreadyVoted {
        voter: VoterId,
        election: ElectionId,
    },
    #[error("Candidate '{candidate}' does not stand in election '{election}'")]
    UnknownCandidate {
        election: ElectionId,
        candidate: CandidateId,
    },
    #[error("No election with ID '{0}'")]
    UnknownElection(ElectionId),
    #[error("Election '{0}' is not accepting votes")]
    ElectionClosed(ElectionId),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    /// The operation may or may not have taken effect.
    #[error("Transient I/O failure: {0}")]
    TransientIo(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// The server is missing state it needs to handle the request.
    #[error("Server misconfigured: {0}")]
    Misconfigured(String),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Db(DbError),
}

impl Error {
    /// Can a read that failed with this error be served from the fallback store instead?
    pub fn permits_fallback(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::TransientIo(_))
    }

    /// Is it safe and worthwhile to retry the failed operation?
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientIo(_))
    }
}

impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. } | ErrorKind::DnsResolve { .. } => {
                Self::StoreUnavailable(err.to_string())
            }
            ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. } => {
                Self::TransientIo(err.to_string())
            }
            _ => Self::Db(err),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = match self {
            Self::IncompleteRegistration(_) => Status::UnprocessableEntity,
            Self::AlreadyVoted { .. } => Status::Conflict,
            Self::UnknownCandidate { .. } => Status::BadRequest,
            Self::UnknownElection(_) => Status::NotFound,
            Self::ElectionClosed(_) => Status::Forbidden,
            Self::StoreUnavailable(_) | Self::TransientIo(_) => Status::ServiceUnavailable,
            Self::Unauthorized(_) | Self::Jwt(_) => Status::Unauthorized,
            Self::Misconfigured(_) | Self::Db(_) => Status::InternalServerError,
        };
        match status.class() {
            StatusClass::ServerError => error!("{self}"),
            _ => debug!("{self}"),
        }
        Err(status)
    }
}
