//! Session store
//!
//! Holds the authenticated identity, if any, derived purely from server
//! responses. "Not logged in" is a normal steady state and is never
//! reported as an error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayResult;
use crate::gateway::{api, Gateway};
use crate::models::Identity;

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const LOGOUT_FAILED: &str = "Logout failed";

/// What a logout does when the server call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoutPolicy {
    /// Local intent wins: identity is cleared whatever the server says
    #[default]
    Optimistic,
    /// Identity is cleared only once the server acknowledges the logout
    Confirmed,
}

impl FromStr for LogoutPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "optimistic" => Ok(LogoutPolicy::Optimistic),
            "confirmed" => Ok(LogoutPolicy::Confirmed),
            other => Err(format!(
                "unknown logout policy '{}', expected optimistic or confirmed",
                other
            )),
        }
    }
}

impl fmt::Display for LogoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoutPolicy::Optimistic => write!(f, "optimistic"),
            LogoutPolicy::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// Where the session currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Anonymous,
    Authenticated(Identity),
    /// Waiting for the server to acknowledge a confirmed logout
    LoggingOut(Identity),
}

/// Login/registration form contents
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl CredentialForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.email.is_empty() && self.password.is_empty()
    }
}

impl fmt::Debug for CredentialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Owner of the authenticated identity.
#[derive(Debug, Default)]
pub struct SessionStore {
    phase: SessionPhase,
    policy: LogoutPolicy,
    /// Form the shell fills before submitting login or register
    pub form: CredentialForm,
    error: Option<String>,
}

impl SessionStore {
    pub fn new(policy: LogoutPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Current identity; still present while a confirmed logout is pending
    pub fn identity(&self) -> Option<&Identity> {
        match &self.phase {
            SessionPhase::Authenticated(identity) | SessionPhase::LoggingOut(identity) => {
                Some(identity)
            }
            SessionPhase::Anonymous => None,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn policy(&self) -> LogoutPolicy {
        self.policy
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    /// Last error of a session action
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Ask the server whether the cookie session is authenticated
    ///
    /// Any failure leaves the session anonymous without recording an error.
    pub async fn check_session(&mut self, gateway: &dyn Gateway) {
        match api::auth_status(gateway).await {
            Ok(status) => match (status.authenticated, status.user) {
                (true, Some(identity)) => {
                    tracing::info!("Session authenticated as {}", identity.username);
                    self.phase = SessionPhase::Authenticated(identity);
                }
                _ => {
                    tracing::debug!("Session not authenticated");
                    self.phase = SessionPhase::Anonymous;
                }
            },
            Err(e) => {
                tracing::debug!("Session check failed, treating as anonymous: {}", e);
                self.phase = SessionPhase::Anonymous;
            }
        }
    }

    /// Submit login credentials
    ///
    /// Returns `true` on success. On failure the server message (or
    /// [`LOGIN_FAILED`]) is recorded and the identity is left untouched.
    pub async fn login(&mut self, gateway: &dyn Gateway, username: &str, password: &str) -> bool {
        self.error = None;
        let result = api::login(gateway, username, password).await;
        self.settle_auth(result, username, LOGIN_FAILED)
    }

    /// Register a new account; success also logs the user in
    pub async fn register(
        &mut self,
        gateway: &dyn Gateway,
        username: &str,
        email: &str,
        password: &str,
    ) -> bool {
        self.error = None;
        let result = api::register(gateway, username, email, password).await;
        self.settle_auth(result, username, REGISTRATION_FAILED)
    }

    /// Submit the credential form as a login
    pub async fn submit_login(&mut self, gateway: &dyn Gateway) -> bool {
        let form = self.form.clone();
        self.login(gateway, &form.username, &form.password).await
    }

    /// Submit the credential form as a registration
    pub async fn submit_register(&mut self, gateway: &dyn Gateway) -> bool {
        let form = self.form.clone();
        self.register(gateway, &form.username, &form.email, &form.password)
            .await
    }

    fn settle_auth(
        &mut self,
        result: GatewayResult<crate::models::AuthResponse>,
        submitted_username: &str,
        fallback: &str,
    ) -> bool {
        match result {
            Ok(resp) => {
                let identity = resp.identity().unwrap_or_else(|| Identity {
                    username: submitted_username.to_string(),
                });
                tracing::info!("Authenticated as {}", identity.username);
                self.phase = SessionPhase::Authenticated(identity);
                self.form.clear();
                true
            }
            Err(e) => {
                tracing::warn!("{}: {}", fallback, e);
                self.error = Some(e.message_or(fallback));
                false
            }
        }
    }

    /// Start a logout
    ///
    /// Under [`LogoutPolicy::Confirmed`] the session enters
    /// [`SessionPhase::LoggingOut`] until [`SessionStore::complete_logout`].
    pub fn begin_logout(&mut self) {
        self.error = None;
        if let (LogoutPolicy::Confirmed, SessionPhase::Authenticated(identity)) =
            (self.policy, &self.phase)
        {
            self.phase = SessionPhase::LoggingOut(identity.clone());
        }
    }

    /// Apply the outcome of the logout request
    pub fn complete_logout(&mut self, result: GatewayResult<()>) {
        match (self.policy, result) {
            (_, Ok(())) => {
                tracing::info!("Logged out");
                self.phase = SessionPhase::Anonymous;
            }
            (LogoutPolicy::Optimistic, Err(e)) => {
                tracing::warn!("Logout request failed, clearing local session anyway: {}", e);
                self.phase = SessionPhase::Anonymous;
            }
            (LogoutPolicy::Confirmed, Err(e)) => {
                tracing::warn!("Logout request failed, keeping session: {}", e);
                if let SessionPhase::LoggingOut(identity) = &self.phase {
                    self.phase = SessionPhase::Authenticated(identity.clone());
                }
                self.error = Some(e.message_or(LOGOUT_FAILED));
            }
        }
    }

    /// Terminate the session on the server and locally
    pub async fn logout(&mut self, gateway: &dyn Gateway) {
        self.begin_logout();
        let result = api::logout(gateway).await;
        self.complete_logout(result);
    }
}
