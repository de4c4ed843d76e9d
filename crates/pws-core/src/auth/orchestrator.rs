//! Login and logout use cases.
//!
//! Every call ends in exactly one notification and never returns an error:
//! server rejections, malformed replies and transport failures are all
//! reported to the user and then dropped. Requests run as detached Tokio
//! tasks, so once dispatched they always finish and notify, whether or not
//! the caller keeps the returned `RequestHandle`.
//!
//! Overlapping logins are not serialized. Whichever response resolves last
//! decides the stored session; dispatching a login while another is pending
//! is logged as a warning.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::credentials::{LoginForm, LoginReply};
use crate::notify::{Notifier, Severity};
use crate::session::SessionStore;
use crate::transport::{Transport, LOGIN_ENDPOINT, SUBMISSIONS_ENDPOINT};

/// Prefix of the welcome message; the username follows it
pub const WELCOME_PREFIX: &str = "Welcome back, ";

/// Shown when the server turns the credentials down
pub const SIGN_IN_ERROR_MESSAGE: &str = "Sign in error";

/// Shown when the login request could not be completed
pub const LOGIN_CONNECTION_ERROR_MESSAGE: &str = "Internal error while signing in: make sure your \
    internet connection is working and, if the error persists, contact an administrator.";

/// Shown when a background request could not be completed
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error";

/// Shown on logout
pub const FAREWELL_MESSAGE: &str = "Goodbye";

/// How a login attempt ended. Informational; the user has already been notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted and the session stored
    Established,
    /// Credentials refused, or the reply could not be understood
    Rejected,
    /// The request never completed
    Unreachable,
}

/// Handle to a dispatched request.
///
/// Awaiting it yields the request's result. Dropping it detaches the request,
/// which still runs to completion and notifies the user.
pub struct RequestHandle<T> {
    task: JoinHandle<T>,
    // Result reported if the task itself died (panic or runtime shutdown)
    on_abort: fn() -> T,
}

impl<T> Future for RequestHandle<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        match Pin::new(&mut this.task).poll(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(e)) => {
                error!(error = %e, "Request task did not finish");
                Poll::Ready((this.on_abort)())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Decrements the in-flight login count when a login task finishes.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct AuthOrchestrator {
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    logins_in_flight: Arc<AtomicUsize>,
}

impl AuthOrchestrator {
    pub fn new(
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            transport,
            notifier,
            logins_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Number of logins dispatched but not yet finished
    pub fn logins_in_flight(&self) -> usize {
        self.logins_in_flight.load(Ordering::SeqCst)
    }

    /// Dispatch a login with the credentials in `form`.
    ///
    /// The form is emptied before this returns. A single `login` request is
    /// spawned on the current Tokio runtime; it applies its outcome to the
    /// session and notifies the user even if the handle is dropped.
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn login(&self, form: &mut LoginForm) -> RequestHandle<LoginOutcome> {
        let request = form.take();

        let pending = self.logins_in_flight.fetch_add(1, Ordering::SeqCst);
        if pending > 0 {
            warn!(pending = pending, "Login dispatched while another is pending, last response wins");
        }
        let in_flight = InFlight(Arc::clone(&self.logins_in_flight));

        let session = Arc::clone(&self.session);
        let transport = Arc::clone(&self.transport);
        let notifier = Arc::clone(&self.notifier);

        let task = tokio::spawn(async move {
            let _in_flight = in_flight;
            let username = request.username.clone();
            debug!(username = %username, "Sending login request");

            match transport.post(LOGIN_ENDPOINT, request.to_body()).await {
                Ok(body) => match LoginReply::interpret(&body) {
                    LoginReply::Accepted { token } => {
                        session.establish(&token, &username);
                        let current = session.current_username().unwrap_or(username);
                        info!(username = %current, "Login successful");
                        notifier.notify_once(Severity::Success, &format!("{}{}", WELCOME_PREFIX, current));
                        LoginOutcome::Established
                    }
                    LoginReply::Rejected => {
                        info!(username = %username, "Login rejected by server");
                        notifier.notify_once(Severity::Danger, SIGN_IN_ERROR_MESSAGE);
                        LoginOutcome::Rejected
                    }
                    LoginReply::Malformed(reason) => {
                        warn!(username = %username, reason = %reason, "Malformed login response, treating as rejection");
                        notifier.notify_once(Severity::Danger, SIGN_IN_ERROR_MESSAGE);
                        LoginOutcome::Rejected
                    }
                },
                Err(e) => {
                    error!(error = %e, "Login request failed");
                    notifier.notify_once(Severity::Danger, LOGIN_CONNECTION_ERROR_MESSAGE);
                    LoginOutcome::Unreachable
                }
            }
        });

        RequestHandle {
            task,
            on_abort: || LoginOutcome::Unreachable,
        }
    }

    /// Drop the session. Local only; always succeeds.
    pub fn logout(&self) {
        self.session.clear();
        info!("Logged out");
        self.notifier.notify_once(Severity::Success, FAREWELL_MESSAGE);
    }

    /// Fetch submissions and run `on_complete` once they have arrived.
    ///
    /// The payload is not used yet. On failure the user is notified and
    /// `on_complete` is never called. Like `login`, the request is spawned
    /// and is not cancelled by dropping the handle.
    pub fn load_submissions<F>(&self, on_complete: F) -> RequestHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        let notifier = Arc::clone(&self.notifier);

        let task = tokio::spawn(async move {
            match transport.post(SUBMISSIONS_ENDPOINT, json!({})).await {
                Ok(_) => {
                    debug!("Submissions loaded");
                    on_complete();
                }
                Err(e) => {
                    error!(error = %e, "Failed to load submissions");
                    notifier.notify_once(Severity::Danger, CONNECTION_ERROR_MESSAGE);
                }
            }
        });

        RequestHandle { task, on_abort: || () }
    }
}
