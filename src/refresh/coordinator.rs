//! The refresh coordinator: at most one call to the refresh endpoint is in
//! flight at any time. Requests that observe an expired credential while an
//! episode is running queue behind it and receive the episode's outcome in
//! arrival order.

use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, oneshot};
use tracing::debug;

use crate::credentials::CredentialStore;
use crate::errors::{Error, RefreshError};
use crate::session::SessionSignal;
use crate::telemetry::refresh::RefreshTelemetry;

pub(crate) const REFRESH_PATH: &str = "auth/refresh/";

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: Option<String>,
    /// Present when the backend rotates refresh tokens.
    refresh: Option<String>,
}

type Waiter = oneshot::Sender<Result<String, RefreshError>>;

enum RefreshState {
    Idle,
    /// One episode running; queued waiters resolve with its outcome, FIFO.
    Refreshing(Vec<Waiter>),
}

pub struct RefreshCoordinator {
    http: reqwest::Client,
    refresh_url: reqwest::Url,
    store: Arc<CredentialStore>,
    session: Arc<SessionSignal>,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(
        http: reqwest::Client,
        base_url: &reqwest::Url,
        store: Arc<CredentialStore>,
        session: Arc<SessionSignal>,
    ) -> Result<Self, Error> {
        let refresh_url = base_url
            .join(REFRESH_PATH)
            .map_err(|e| Error::Config(format!("Invalid refresh URL: {e}")))?;
        Ok(Self {
            http,
            refresh_url,
            store,
            session,
            state: Mutex::new(RefreshState::Idle),
        })
    }

    /// Entry point for a request whose credential was just rejected. The
    /// first caller of an episode performs the refresh call; everyone else
    /// enqueues and awaits the fan-out. On failure the session is terminated
    /// once, inside this coordinator, before the triggering caller returns.
    pub async fn obtain_fresh_token(&self) -> Result<String, RefreshError> {
        {
            let mut state = self.state.lock().await;
            match &mut *state {
                RefreshState::Refreshing(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    drop(state);
                    return match rx.await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(RefreshError::Interrupted),
                    };
                }
                // Claim the episode before the first await so no concurrent
                // caller can start a second refresh call.
                RefreshState::Idle => *state = RefreshState::Refreshing(Vec::new()),
            }
        }

        let outcome = self.run_refresh_call().await;

        let waiters = {
            let mut state = self.state.lock().await;
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing(waiters) => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };
        debug!(waiters = waiters.len(), "refresh episode resolved");
        for waiter in waiters {
            // A waiter whose caller went away is simply skipped.
            let _ = waiter.send(outcome.clone());
        }

        if outcome.is_err() {
            self.session.terminate().await;
        }
        outcome
    }

    /// The single network call of an episode. Writes the rotated pair into
    /// the store before the outcome fans out.
    async fn run_refresh_call(&self) -> Result<String, RefreshError> {
        let telemetry = RefreshTelemetry::new("auth.refresh");
        let Some(refresh) = self.store.refresh().await else {
            let err = RefreshError::MissingRefreshToken;
            telemetry.emit_failure(&err, SystemTime::now());
            return Err(err);
        };

        telemetry.emit_start(SystemTime::now());
        let response = match self
            .http
            .post(self.refresh_url.clone())
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let err = RefreshError::Transport(Arc::new(err));
                telemetry.emit_failure(&err, SystemTime::now());
                return Err(err);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = RefreshError::Rejected { status, body };
            telemetry.emit_failure(&err, SystemTime::now());
            return Err(err);
        }

        let parsed: RefreshResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(_) => {
                let err = RefreshError::MalformedResponse;
                telemetry.emit_failure(&err, SystemTime::now());
                return Err(err);
            }
        };
        let access = match parsed.access {
            Some(access) if !access.is_empty() => access,
            _ => {
                let err = RefreshError::MalformedResponse;
                telemetry.emit_failure(&err, SystemTime::now());
                return Err(err);
            }
        };

        if let Err(err) = self
            .store
            .store_refreshed(access.clone(), parsed.refresh)
            .await
        {
            // The in-memory pair is already rotated; a persistence failure
            // only costs durability across restarts.
            tracing::warn!(error = %err, "failed to persist refreshed credentials");
        }
        telemetry.emit_success(SystemTime::now());
        Ok(access)
    }
}
