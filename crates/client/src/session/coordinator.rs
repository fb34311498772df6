//! Single-flight token refresh coordinator
//!
//! The coordinator owns session credentials and is their only writer. Its
//! state machine has three states:
//!
//! - `Idle`: no refresh in flight
//! - `Refreshing`: one exchange is on the wire; further 401-triggered
//!   callers subscribe to its outcome instead of starting a second exchange
//! - `Failed`: the exchange itself failed; every refresh request short
//!   circuits to `SessionExpired` until a new login installs credentials
//!
//! The single-flight invariant: at most one refresh-token round-trip is in
//! flight at any time, and all concurrent callers observe the same outcome.

use std::sync::Arc;

use async_trait::async_trait;
use murmur_domain::types::auth::{RefreshRequest, TokenPair};
use murmur_domain::types::common::ApiEnvelope;
use murmur_domain::{ApiError, ApiResult};
use reqwest::Method;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use super::credentials::SessionCredentials;
use super::store::{CredentialStore, StoreError};
use crate::http::descriptor::RequestDescriptor;
use crate::http::transport::Transport;
use crate::notify::{NoticeKind, NotificationSink};

/// Message surfaced when recovery fails and the session is cleared
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Callback fired once when an irrecoverable auth failure logs the user out
pub type LogoutHook = Arc<dyn Fn() + Send + Sync>;

/// Outcome shared between the refresh leader and its waiters
type RefreshOutcome = ApiResult<String>;

/// Performs the refresh-token exchange against the auth backend
///
/// Split out as a trait so the coordinator's state machine is testable
/// without a network.
#[async_trait]
pub trait AuthExchange: Send + Sync {
    /// Exchange a refresh token for a new token pair
    async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenPair>;
}

/// Coordinator state; `Refreshing` carries the channel its waiters watch
enum RefreshState {
    Idle,
    Refreshing { done: watch::Receiver<Option<RefreshOutcome>> },
    Failed { reason: String },
}

/// Decides, under the state lock, what the current caller does
enum Role {
    Leader(watch::Sender<Option<RefreshOutcome>>),
    Waiter(watch::Receiver<Option<RefreshOutcome>>),
}

/// Owner of session credentials and the refresh state machine
pub struct SessionCoordinator {
    state: Mutex<RefreshState>,
    credentials: RwLock<Option<SessionCredentials>>,
    store: Arc<dyn CredentialStore>,
    exchange: Arc<dyn AuthExchange>,
    notifier: Arc<dyn NotificationSink>,
    logout_hook: Option<LogoutHook>,
}

impl SessionCoordinator {
    /// Create a coordinator over the given collaborators
    pub fn new(
        store: Arc<dyn CredentialStore>,
        exchange: Arc<dyn AuthExchange>,
        notifier: Arc<dyn NotificationSink>,
        logout_hook: Option<LogoutHook>,
    ) -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            credentials: RwLock::new(None),
            store,
            exchange,
            notifier,
            logout_hook,
        }
    }

    /// Load persisted credentials into memory
    ///
    /// Call once on startup. Returns whether credentials were found.
    ///
    /// # Errors
    /// Returns an error if the store itself fails; a store with nothing
    /// persisted is not an error.
    pub async fn initialize(&self) -> Result<bool, StoreError> {
        match self.store.load().await? {
            Some(credentials) => {
                *self.credentials.write().await = Some(credentials);
                info!("session restored from credential store");
                Ok(true)
            }
            None => {
                debug!("no persisted session found");
                Ok(false)
            }
        }
    }

    /// Install freshly issued credentials (after login or registration)
    ///
    /// Also resets a `Failed` state machine back to `Idle`: a new login is
    /// the only exit from the terminal failure state.
    pub async fn install(&self, pair: &TokenPair) {
        let credentials = SessionCredentials::from_token_pair(pair);

        *self.credentials.write().await = Some(credentials.clone());
        if let Err(e) = self.store.save(&credentials).await {
            warn!(error = %e, "failed to persist session credentials");
        }

        *self.state.lock().await = RefreshState::Idle;
        info!("session credentials installed");
    }

    /// Drop the session (logout)
    pub async fn clear(&self) {
        *self.credentials.write().await = None;
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear persisted credentials");
        }

        *self.state.lock().await = RefreshState::Idle;
        info!("session cleared");
    }

    /// Current access token, if a session exists
    pub async fn access_token(&self) -> Option<String> {
        self.credentials.read().await.as_ref().map(|c| c.access_token.clone())
    }

    /// Whether a session currently exists
    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Obtain a fresh access token, collapsing concurrent callers onto one
    /// exchange
    ///
    /// The first caller in `Idle` becomes the leader and performs the
    /// network round-trip; everyone arriving while `Refreshing` suspends on
    /// the same outcome. In `Failed` the call short-circuits.
    ///
    /// # Errors
    /// `SessionExpired` when there are no credentials, the exchange fails,
    /// or the state machine is already `Failed`.
    pub async fn refresh_access_token(&self) -> ApiResult<String> {
        let role = {
            let mut state = self.state.lock().await;
            match &*state {
                RefreshState::Failed { reason } => {
                    debug!(reason = %reason, "refresh requested while session is failed");
                    return Err(ApiError::SessionExpired);
                }
                RefreshState::Refreshing { done } => Role::Waiter(done.clone()),
                RefreshState::Idle => {
                    let (tx, rx) = watch::channel(None);
                    *state = RefreshState::Refreshing { done: rx };
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Waiter(mut done) => {
                debug!("refresh already in flight, suspending until it settles");
                let settled = done
                    .wait_for(Option::is_some)
                    .await
                    .map_err(|_| ApiError::SessionExpired)?
                    .clone();
                match settled {
                    Some(outcome) => outcome,
                    None => Err(ApiError::SessionExpired),
                }
            }
            Role::Leader(tx) => {
                let outcome = self.perform_refresh().await;

                {
                    let mut state = self.state.lock().await;
                    *state = match &outcome {
                        Ok(_) => RefreshState::Idle,
                        Err(_) => RefreshState::Failed {
                            reason: "refresh-token exchange failed".to_string(),
                        },
                    };
                }

                // Waiters observe the settled outcome through the channel.
                let _ = tx.send(Some(outcome.clone()));
                outcome
            }
        }
    }

    /// Run the exchange and apply its result to the session
    async fn perform_refresh(&self) -> RefreshOutcome {
        let refresh_token =
            self.credentials.read().await.as_ref().map(|c| c.refresh_token.clone());

        let Some(refresh_token) = refresh_token else {
            // No session to recover or to tear down; don't fire logout side
            // effects for a user who was never signed in.
            debug!("401 received with no stored credentials");
            return Err(ApiError::SessionExpired);
        };

        match self.exchange.refresh(&refresh_token).await {
            Ok(pair) => {
                let credentials = SessionCredentials::from_token_pair(&pair);
                let access = credentials.access_token.clone();

                *self.credentials.write().await = Some(credentials.clone());
                if let Err(e) = self.store.save(&credentials).await {
                    warn!(error = %e, "failed to persist refreshed credentials");
                }

                info!("access token refreshed");
                Ok(access)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.expire_session().await;
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Clear the session and fire the one-time logout side effects
    async fn expire_session(&self) {
        *self.credentials.write().await = None;
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear persisted credentials");
        }

        self.notifier.notify(NoticeKind::Error, SESSION_EXPIRED_MESSAGE);
        if let Some(hook) = &self.logout_hook {
            hook();
        }
    }
}

/// Production [`AuthExchange`] posting to `/auth/refresh`
///
/// Talks to the transport directly: the refresh call must not pass through
/// the regular dispatch pipeline, or a 401 from the token endpoint would
/// recurse into another refresh.
pub(crate) struct HttpAuthExchange {
    transport: Arc<Transport>,
}

impl HttpAuthExchange {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl AuthExchange for HttpAuthExchange {
    async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenPair> {
        let request = RequestDescriptor::builder(Method::POST, "/auth/refresh")
            .json(&RefreshRequest { refresh_token: refresh_token.to_string() })?
            .build();

        let response = self.transport.execute(&request).await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), "refresh endpoint rejected the exchange");
            return Err(ApiError::Client {
                status: status.as_u16(),
                code: format!("HTTP_{}", status.as_u16()),
                message: "token refresh rejected".to_string(),
                details: None,
            });
        }

        let envelope: ApiEnvelope<TokenPair> = response.json().await.map_err(|e| {
            ApiError::Unknown { message: format!("failed to parse refresh response: {e}") }
        })?;

        envelope
            .into_data()
            .ok_or_else(|| ApiError::Unknown { message: "refresh response missing data".to_string() })
    }
}
