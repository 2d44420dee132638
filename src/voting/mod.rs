//! The election and vote-casting rules, defined once over [`Store`].
//!
//! [`VotingCore`] owns the only decision about which store serves a request.
//! Reads go to the primary store and are substituted from the fallback store
//! when the primary is missing, failing, or empty. Writes always go to the
//! store that holds the election; a vote for a primary-store election is never
//! quietly diverted to the fallback store.

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use rand::Rng;
use rocket::futures::future::BoxFuture;

use crate::error::{Error, Result};
use crate::model::{
    common::{ElectionId, Served},
    db::Election,
};
use crate::store::{FallbackStore, Store};

mod catalog;
mod ledger;
mod profile;
mod tally;

pub use tally::{percentage, Tally};

/// Tunable voting rules.
#[derive(Debug, Clone)]
pub struct VotingPolicy {
    /// Total attempts at recording a vote when the store reports a transient failure.
    pub cast_attempts: u32,
    /// Base delay between attempts; grows linearly, plus jitter.
    pub retry_backoff: Duration,
    /// Reject votes outside an election's `[start_time, end_time]`.
    pub enforce_voting_window: bool,
    /// Serve reads from the fallback store when the primary store fails or is empty.
    pub demo_fallback: bool,
}

impl Default for VotingPolicy {
    fn default() -> Self {
        Self {
            cast_attempts: 3,
            retry_backoff: Duration::from_millis(100),
            enforce_voting_window: false,
            demo_fallback: true,
        }
    }
}

pub struct VotingCore {
    primary: Option<Arc<dyn Store>>,
    fallback: Arc<FallbackStore>,
    policy: VotingPolicy,
}

impl VotingCore {
    /// A core backed by a durable primary store, with degraded-mode fallback.
    pub fn new(primary: Arc<dyn Store>, fallback: Arc<FallbackStore>, policy: VotingPolicy) -> Self {
        Self {
            primary: Some(primary),
            fallback,
            policy,
        }
    }

    /// A core with no primary store at all: everything is demo data.
    pub fn demo(fallback: Arc<FallbackStore>, policy: VotingPolicy) -> Self {
        Self {
            primary: None,
            fallback,
            policy,
        }
    }

    pub fn policy(&self) -> &VotingPolicy {
        &self.policy
    }

    /// Is there no primary store at all?
    pub fn is_demo(&self) -> bool {
        self.primary.is_none()
    }

    /// The store profiles live in: the primary store if there is one.
    fn profile_store(&self) -> &dyn Store {
        match self.primary.as_deref() {
            Some(primary) => primary,
            None => self.fallback_store(),
        }
    }

    fn fallback_store(&self) -> &dyn Store {
        self.fallback.as_ref()
    }

    /// Serve a read from the primary store, or from the fallback store if the
    /// primary is absent, or (when allowed) unreachable or has nothing `usable`.
    async fn read<'a, T>(
        &'a self,
        what: &str,
        op: impl Fn(&'a dyn Store) -> BoxFuture<'a, Result<T>>,
        usable: impl Fn(&T) -> bool,
    ) -> Result<Served<T>> {
        if let Some(primary) = self.primary.as_deref() {
            match op(primary).await {
                Ok(data) if usable(&data) || !self.policy.demo_fallback => {
                    return Ok(Served::new(primary.mode(), data));
                }
                Ok(_) => warn!("Primary store has no {what}, serving demo data"),
                Err(err) if err.permits_fallback() && self.policy.demo_fallback => {
                    warn!("Primary store failed to read {what} ({err}), serving demo data")
                }
                Err(err) => return Err(err),
            }
        }
        let fallback = self.fallback_store();
        let data = op(fallback).await?;
        Ok(Served::new(fallback.mode(), data))
    }

    /// Find the store holding the given election, and the election itself.
    ///
    /// An unreachable primary store is only worked around if the election is
    /// known to the fallback store; otherwise the outage is reported, since the
    /// election may well exist in the primary store.
    async fn locate(&self, election_id: ElectionId) -> Result<(&dyn Store, Election)> {
        let mut outage = None;
        if let Some(primary) = self.primary.as_deref() {
            match primary.election(election_id).await {
                Ok(Some(election)) => return Ok((primary, election)),
                Ok(None) => {}
                Err(err) if err.permits_fallback() => outage = Some(err),
                Err(err) => return Err(err),
            }
        }
        if self.primary.is_none() || self.policy.demo_fallback {
            let fallback = self.fallback_store();
            if let Some(election) = fallback.election(election_id).await? {
                return Ok((fallback, election));
            }
        }
        Err(outage.unwrap_or(Error::UnknownElection(election_id)))
    }

    /// Delay before the given retry attempt (1-based).
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.policy.retry_backoff * attempt;
        let jitter_ms = self.policy.retry_backoff.as_millis() as u64 / 2;
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}
