//! Login form submission lifecycle.
//!
//! `LoginFlow` posts the submitted credentials, stores the resulting
//! session and sends the user to the landing page for their role. Page
//! effects go through the injected `Notifier`, `Navigator` and
//! `SubmitControl`, so the flow works the same behind a browser shim, a
//! terminal or a test double.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{ApiError, RequestClient};
use crate::auth::Credentials;

use super::{FormSubmission, NavigationTarget, PageResolver};

// ============================================================================
// Constants
// ============================================================================

/// Label shown on the submit control while a login is in flight
pub const BUSY_LABEL: &str = "Signing in...";

pub const SUCCESS_MESSAGE: &str = "Login successful! Redirecting...";

/// Shown when the backend rejects a login without saying why
pub const GENERIC_FAILURE_MESSAGE: &str = "Login failed. Please try again.";

/// How long transient notices stay visible
pub const NOTICE_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            duration: NOTICE_DURATION,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            duration: NOTICE_DURATION,
        }
    }
}

/// Displays notices to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Moves the user to another page
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &NavigationTarget);
}

/// The form's submit button
pub trait SubmitControl: Send + Sync {
    /// Disable and show `label` instead of the normal caption
    fn set_busy(&self, label: &str);
    /// Enable and restore the normal caption
    fn reset(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Submitting,
    Succeeded,
    /// Last attempt failed; accepts a new submission like `Idle`
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Redirected(NavigationTarget),
    Rejected(String),
    /// Another submission was in flight, or the login already succeeded
    Ignored,
}

pub struct LoginFlow {
    api: RequestClient,
    resolver: PageResolver,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    control: Arc<dyn SubmitControl>,
    state: Mutex<LoginState>,
}

impl LoginFlow {
    /// The session written on success is the one `api` was built with
    pub fn new(
        api: RequestClient,
        resolver: PageResolver,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        control: Arc<dyn SubmitControl>,
    ) -> Self {
        Self {
            api,
            resolver,
            notifier,
            navigator,
            control,
            state: Mutex::new(LoginState::Idle),
        }
    }

    pub fn state(&self) -> LoginState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: LoginState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Move to `Submitting` unless a submission is in flight or done
    fn begin(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            LoginState::Idle | LoginState::Failed => {
                *state = LoginState::Submitting;
                true
            }
            LoginState::Submitting | LoginState::Succeeded => false,
        }
    }

    /// Handle one submission of the login form.
    ///
    /// Every failure ends as a notice and a re-enabled submit control; only
    /// a successful login leaves the control disabled.
    pub async fn handle_submit(&self, submission: &mut FormSubmission) -> LoginOutcome {
        submission.prevent_default();
        let credentials = Credentials::from_fields(submission.fields());

        if !self.begin() {
            debug!(state = ?self.state(), "Ignoring login submission");
            return LoginOutcome::Ignored;
        }
        let in_flight = InFlight::start(self);

        match self.attempt(&credentials).await {
            Ok(target) => {
                in_flight.succeed();
                self.notifier.notify(Notice::success(SUCCESS_MESSAGE));
                self.navigator.navigate(&target);
                LoginOutcome::Redirected(target)
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Login failed");
                let message = e.to_string();
                self.notifier.notify(Notice::error(message.clone()));
                drop(in_flight);
                LoginOutcome::Rejected(message)
            }
        }
    }

    async fn attempt(&self, credentials: &Credentials) -> Result<NavigationTarget, ApiError> {
        credentials.validate()?;

        let response = self.api.login(credentials).await?;
        if !response.success {
            return Err(ApiError::RequestFailed {
                status: None,
                message: response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            });
        }

        let role = response.user.as_ref().and_then(|u| u.role.clone());
        if let Err(e) = self
            .api
            .session()
            .establish(response.user, response.csrf_token)
            .await
        {
            warn!(error = %e, "Failed to persist session");
        }

        let target = self.resolver.for_role(role.as_deref()).clone();
        info!(role = ?role, destination = ?target.destination, "Login successful");
        Ok(target)
    }
}

/// A submission between `begin` and its outcome.
///
/// Unless marked successful, dropping it (including when the submit future
/// is cancelled mid-request) moves the flow to `Failed` and re-enables the
/// submit control.
struct InFlight<'a> {
    flow: &'a LoginFlow,
    succeeded: bool,
}

impl<'a> InFlight<'a> {
    fn start(flow: &'a LoginFlow) -> Self {
        flow.control.set_busy(BUSY_LABEL);
        Self {
            flow,
            succeeded: false,
        }
    }

    fn succeed(mut self) {
        self.succeeded = true;
        self.flow.set_state(LoginState::Succeeded);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.succeeded {
            self.flow.set_state(LoginState::Failed);
            self.flow.control.reset();
        }
    }
}
