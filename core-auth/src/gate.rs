//! # Auth Gate
//!
//! Owns the single cached session and coalesces every caller that needs a
//! credential while none is cached into one interactive sign-in flow.
//!
//! ## Overview
//!
//! ```text
//!                request_token                sign_in_requested (ok)
//!   NoSession ─────────────────▶ SignInInFlight ─────────────────────▶ SessionCached
//!       ▲                            │   │                                  │
//!       │      sign_in_cancelled     │   │ sign_in_requested (err)          │
//!       └────────────────────────────┘   └─▶ per SignInFailurePolicy        │
//!       └────────────────────────── invalidate / sign_out ◀─────────────────┘
//! ```
//!
//! - With a cached session, `request_token` resumes the caller on its queue
//!   immediately and no UI is shown.
//! - Without one, the caller is parked in the [`CallbackRegistry`]. The
//!   registration that takes the registry from empty to one entry launches the
//!   sign-in surface; later ones simply join it.
//! - The host's sign-in surface reports back through
//!   [`AuthGate::sign_in_requested`], [`AuthGate::sign_in_cancelled`] and
//!   [`AuthGate::register_requested`], which resolve every parked caller.
//!
//! ## Locking
//!
//! Session state and the registry are only mutated while the state lock is
//! held, always taken before the registry's own lock. Neither lock is held
//! while continuations are dispatched, while the presenter is called, or
//! across a network await.
//!
//! ## Usage
//!
//! ```ignore
//! let key = RequesterKey::new();
//! gate.request_token(
//!     key,
//!     |credential, user| println!("signed in as {}", user.email),
//!     |err| eprintln!("no token: {}", err),
//! );
//!
//! // or, from async code
//! let (credential, user) = gate.acquire_token(key).await?;
//! ```

use crate::error::{AuthError, Result};
use crate::registry::{CallbackRegistry, Scheduled};
use crate::types::{BasicCredential, GateState, RegistrationForm, RequesterKey, Session, User};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::{CallbackQueue, InlineQueue, SignInFlowId, SignInPresenter};
use core_runtime::config::{CoreConfig, ServiceConfig, SignInFailurePolicy};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::logging::redact_if_sensitive;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

/// Continuation resumed with the credential and the identity it belongs to.
pub type SuccessFn = Box<dyn FnOnce(BasicCredential, User) + Send + 'static>;

/// Continuation resumed when no credential can be produced.
pub type FailureFn = Box<dyn FnOnce(AuthError) + Send + 'static>;

#[derive(Default)]
struct GateInner {
    session: Option<Session>,
    active_flow: Option<SignInFlowId>,
}

/// Coalescing, re-entrant credential provider.
pub struct AuthGate {
    service: ServiceConfig,
    http_client: Arc<dyn HttpClient>,
    presenter: Arc<dyn SignInPresenter>,
    default_queue: Arc<dyn CallbackQueue>,
    event_bus: EventBus,
    failure_policy: SignInFailurePolicy,
    inner: Mutex<GateInner>,
    registry: CallbackRegistry<SuccessFn, FailureFn>,
    next_flow: AtomicU64,
}

impl AuthGate {
    /// Creates a gate with no cached session.
    ///
    /// # Arguments
    ///
    /// * `service` - Base URLs; the gate talks to `auth_url`
    /// * `http_client` - Transport for login and registration
    /// * `presenter` - Host sign-in surface
    /// * `default_queue` - Queue used by [`request_token`](Self::request_token)
    /// * `event_bus` - Receives [`AuthEvent`]s
    pub fn new(
        service: ServiceConfig,
        http_client: Arc<dyn HttpClient>,
        presenter: Arc<dyn SignInPresenter>,
        default_queue: Arc<dyn CallbackQueue>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            service,
            http_client,
            presenter,
            default_queue,
            event_bus,
            failure_policy: SignInFailurePolicy::default(),
            inner: Mutex::new(GateInner::default()),
            registry: CallbackRegistry::new(),
            next_flow: AtomicU64::new(1),
        }
    }

    /// Creates a gate from the assembled core configuration.
    pub fn from_config(config: &CoreConfig, event_bus: EventBus) -> Self {
        Self::new(
            config.service.clone(),
            Arc::clone(&config.http_client),
            Arc::clone(&config.presenter),
            Arc::clone(&config.callback_queue),
            event_bus,
        )
        .with_failure_policy(config.sign_in_failure_policy)
    }

    pub fn with_failure_policy(mut self, policy: SignInFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    // ------------------------------------------------------------------
    // Token requests
    // ------------------------------------------------------------------

    /// Request a credential, resuming on the gate's default queue.
    pub fn request_token<S, F>(&self, key: RequesterKey, on_success: S, on_failure: F)
    where
        S: FnOnce(BasicCredential, User) + Send + 'static,
        F: FnOnce(AuthError) + Send + 'static,
    {
        let queue = Arc::clone(&self.default_queue);
        self.request_token_on(key, queue, on_success, on_failure);
    }

    /// Request a credential, resuming on `queue`.
    ///
    /// Exactly one of the two continuations eventually runs, on `queue`.
    pub fn request_token_on<S, F>(
        &self,
        key: RequesterKey,
        queue: Arc<dyn CallbackQueue>,
        on_success: S,
        on_failure: F,
    ) where
        S: FnOnce(BasicCredential, User) + Send + 'static,
        F: FnOnce(AuthError) + Send + 'static,
    {
        let launched = {
            let mut inner = self.inner.lock();

            if let Some(session) = inner.session.clone() {
                drop(inner);
                debug!(requester = %key, "Serving cached session");
                queue.dispatch(Box::new(move || on_success(session.credential, session.user)));
                return;
            }

            let pending =
                self.registry
                    .register(key, queue, Box::new(on_success), Box::new(on_failure));

            if pending == 1 {
                let flow = SignInFlowId(self.next_flow.fetch_add(1, Ordering::Relaxed));
                inner.active_flow = Some(flow);
                Some(flow)
            } else {
                debug!(requester = %key, pending, "Joined sign-in already in flight");
                None
            }
        };

        // A cancel can drain `flow` before this present; see `SignInPresenter`.
        if let Some(flow) = launched {
            info!(requester = %key, %flow, "Launching interactive sign-in");
            let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SigningIn {
                flow_id: flow.0,
            }));
            self.presenter.present_sign_in(flow);
        }
    }

    /// Async form of [`request_token`](Self::request_token).
    ///
    /// The continuations run inline on whichever thread resolves them and
    /// forward the outcome over a oneshot channel.
    pub async fn acquire_token(&self, key: RequesterKey) -> Result<(BasicCredential, User)> {
        let (tx, rx) = oneshot::channel();
        let on_success_tx = Arc::new(Mutex::new(Some(tx)));
        let on_failure_tx = Arc::clone(&on_success_tx);

        self.request_token_on(
            key,
            InlineQueue::shared(),
            move |credential, user| {
                if let Some(tx) = on_success_tx.lock().take() {
                    let _ = tx.send(Ok((credential, user)));
                }
            },
            move |err| {
                if let Some(tx) = on_failure_tx.lock().take() {
                    let _ = tx.send(Err(err));
                }
            },
        );

        rx.await.map_err(|_| {
            AuthError::Internal("token request dropped before it was resolved".to_string())
        })?
    }

    // ------------------------------------------------------------------
    // Sign-in surface callbacks
    // ------------------------------------------------------------------

    /// The user submitted the sign-in form.
    ///
    /// Verifies the credential against `POST {auth_url}/login`. On success the
    /// session is cached, every parked requester is resumed with it and the
    /// surface is dismissed. On failure the configured
    /// [`SignInFailurePolicy`] decides what happens to parked requesters; the
    /// error is always returned so the surface can show it.
    #[instrument(skip_all, fields(email = %redact_if_sensitive("email", email)))]
    pub async fn sign_in_requested(&self, email: &str, password: &str) -> Result<User> {
        let credential = BasicCredential::new(email, password);
        let request = credential.apply(HttpRequest::new(
            HttpMethod::Post,
            self.auth_endpoint("login")?,
        ));

        match self.send(request, AuthError::InvalidCredentials).await {
            Ok(user) => {
                let released = self.establish_session(credential, user.clone());
                info!(user_id = user.id, released, "Signed in");
                let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedIn {
                    user_id: user.id,
                    released,
                }));
                Ok(user)
            }
            Err(err) => {
                self.handle_sign_in_failure(&err);
                Err(err)
            }
        }
    }

    /// The user dismissed the sign-in surface.
    ///
    /// Every parked requester is resumed with [`AuthError::UserCancelled`].
    #[instrument(skip(self))]
    pub fn sign_in_cancelled(&self) {
        let released = self.fail_pending(AuthError::UserCancelled);
        info!(released, "Sign-in cancelled");
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::SignInCancelled { released }));
    }

    /// The user submitted the registration form.
    ///
    /// Creates the account with `POST {auth_url}/users`. A new account signs
    /// the user in exactly like a successful sign-in. A failure only concerns
    /// this attempt: parked requesters keep waiting.
    #[instrument(skip_all, fields(email = %redact_if_sensitive("email", &form.email)))]
    pub async fn register_requested(&self, form: RegistrationForm) -> Result<User> {
        let credential = form.credential();
        let request = credential
            .apply(HttpRequest::new(HttpMethod::Post, self.auth_endpoint("users")?))
            .json(&form)
            .map_err(|e| AuthError::Internal(format!("Failed to encode registration: {}", e)))?;

        let user = self.send(request, AuthError::EmailTaken).await.map_err(|err| {
            warn!(error = %err, "Registration failed");
            err
        })?;

        let released = self.establish_session(credential, user.clone());
        info!(user_id = user.id, released, "Registered");
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::Registered {
            user_id: user.id,
            released,
        }));
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Forget the cached session. The next token request shows the sign-in
    /// surface again. Requests already in flight are not affected.
    pub fn invalidate(&self) {
        let cleared = self.inner.lock().session.take().is_some();
        if cleared {
            info!("Session invalidated");
            let _ = self
                .event_bus
                .emit(CoreEvent::Auth(AuthEvent::SessionInvalidated));
        }
    }

    /// Forget the cached session only if it still holds `credential`.
    ///
    /// Returns `true` if the session was cleared. A request that was rejected
    /// with an old credential cannot discard a session established after it
    /// was sent.
    pub fn invalidate_credential(&self, credential: &BasicCredential) -> bool {
        let cleared = {
            let mut inner = self.inner.lock();
            let current = inner
                .session
                .as_ref()
                .is_some_and(|session| &session.credential == credential);
            if current {
                inner.session = None;
            }
            current
        };

        if cleared {
            info!("Session invalidated after rejection");
            let _ = self
                .event_bus
                .emit(CoreEvent::Auth(AuthEvent::SessionInvalidated));
        } else {
            debug!("Rejected credential is no longer cached");
        }
        cleared
    }

    pub fn sign_out(&self) {
        let had_session = self.inner.lock().session.take().is_some();
        info!(had_session, "Signed out");
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedOut));
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn state(&self) -> GateState {
        let inner = self.inner.lock();
        if inner.session.is_some() {
            GateState::SessionCached
        } else if inner.active_flow.is_some() {
            GateState::SignInInFlight
        } else {
            GateState::NoSession
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner
            .lock()
            .session
            .as_ref()
            .map(|session| session.user.clone())
    }

    /// Requesters parked behind the sign-in surface.
    pub fn pending_count(&self) -> usize {
        self.registry.count()
    }

    /// The sign-in flow currently presented, if any.
    pub fn active_flow(&self) -> Option<SignInFlowId> {
        self.inner.lock().active_flow
    }

    pub fn failure_policy(&self) -> SignInFailurePolicy {
        self.failure_policy
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn auth_endpoint(&self, path: &str) -> Result<String> {
        self.service
            .auth_endpoint(path)
            .map(String::from)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn send(&self, request: HttpRequest, on_not_found: AuthError) -> Result<User> {
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::NetworkProblem(e.to_string()))?;
        decode_user(&response, on_not_found)
    }

    /// Cache the session, resume parked requesters and close the surface.
    fn establish_session(&self, credential: BasicCredential, user: User) -> usize {
        let session = Session { credential, user };
        let (successes, flow) = {
            let mut inner = self.inner.lock();
            inner.session = Some(session.clone());
            (self.registry.drain_successes(), inner.active_flow.take())
        };

        let released = successes.len();
        deliver_successes(successes, &session);
        if let Some(flow) = flow {
            self.presenter.dismiss_sign_in(flow);
        }
        released
    }

    /// Resume every parked requester with `err` and close the surface.
    fn fail_pending(&self, err: AuthError) -> usize {
        let (failures, flow) = {
            let mut inner = self.inner.lock();
            (self.registry.drain_failures(), inner.active_flow.take())
        };

        let released = failures.len();
        deliver_failures(failures, &err);
        if let Some(flow) = flow {
            self.presenter.dismiss_sign_in(flow);
        }
        released
    }

    fn handle_sign_in_failure(&self, err: &AuthError) {
        let released = match self.failure_policy {
            SignInFailurePolicy::FailPending => self.fail_pending(err.clone()),
            SignInFailurePolicy::KeepWaiting => 0,
        };
        warn!(error = %err, released, policy = ?self.failure_policy, "Sign-in failed");
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignInFailed {
            message: err.to_string(),
            released,
        }));
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("state", &self.state())
            .field("pending", &self.registry.count())
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

fn decode_user(response: &HttpResponse, on_not_found: AuthError) -> Result<User> {
    if response.is_success() {
        response
            .json::<User>()
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    } else if response.status == 404 {
        Err(on_not_found)
    } else {
        Err(AuthError::Unknown {
            status: Some(response.status),
        })
    }
}

fn deliver_successes(successes: Vec<Scheduled<SuccessFn>>, session: &Session) {
    for (on_success, queue) in successes {
        let credential = session.credential.clone();
        let user = session.user.clone();
        queue.dispatch(Box::new(move || on_success(credential, user)));
    }
}

fn deliver_failures(failures: Vec<Scheduled<FailureFn>>, err: &AuthError) {
    for (on_failure, queue) in failures {
        let err = err.clone();
        queue.dispatch(Box::new(move || on_failure(err)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    const USER_JSON: &str =
        r#"{"id":7,"email":"a@b.com","first_name":"Ann","last_name":"Bee","phone_number":"555"}"#;

    #[derive(Default)]
    struct ScriptedHttp {
        responses: Mutex<VecDeque<BridgeResult<HttpResponse>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttp {
        fn respond(self, status: u16, body: &str) -> Self {
            self.responses
                .lock()
                .push_back(Ok(HttpResponse::new(status, body.as_bytes().to_vec())));
            self
        }

        fn fail(self) -> Self {
            self.responses
                .lock()
                .push_back(Err(BridgeError::Connection("offline".to_string())));
            self
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttp {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.requests.lock().push(request);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(BridgeError::NotAvailable("no scripted response".into())))
        }
    }

    #[derive(Default)]
    struct CountingPresenter {
        presented: AtomicUsize,
        dismissed: AtomicUsize,
    }

    impl SignInPresenter for CountingPresenter {
        fn present_sign_in(&self, _flow: SignInFlowId) {
            self.presented.fetch_add(1, Ordering::SeqCst);
        }

        fn dismiss_sign_in(&self, _flow: SignInFlowId) {
            self.dismissed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn gate(http: ScriptedHttp) -> (AuthGate, Arc<ScriptedHttp>, Arc<CountingPresenter>) {
        let http = Arc::new(http);
        let presenter = Arc::new(CountingPresenter::default());
        let gate = AuthGate::new(
            ServiceConfig::new("https://auth.example.com", "https://api.example.com").unwrap(),
            http.clone(),
            presenter.clone(),
            InlineQueue::shared(),
            EventBus::new(16),
        );
        (gate, http, presenter)
    }

    #[test]
    fn test_first_request_launches_sign_in() {
        let (gate, _, presenter) = gate(ScriptedHttp::default());
        assert_eq!(gate.state(), GateState::NoSession);

        gate.request_token(RequesterKey::new(), |_, _| {}, |_| {});
        gate.request_token(RequesterKey::new(), |_, _| {}, |_| {});

        assert_eq!(gate.state(), GateState::SignInInFlight);
        assert_eq!(gate.pending_count(), 2);
        assert_eq!(presenter.presented.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_in_posts_basic_credential_to_login() {
        let (gate, http, _) = gate(ScriptedHttp::default().respond(200, USER_JSON));

        let user = gate.sign_in_requested("a@b.com", "pw").await.unwrap();
        assert_eq!(user.id, 7);

        let requests = http.requests.lock();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "https://auth.example.com/login");
        assert_eq!(
            requests[0].headers.get("Authorization"),
            Some(&"Basic YUBiLmNvbTpwdw==".to_string())
        );
        assert_eq!(gate.state(), GateState::SessionCached);
    }

    #[tokio::test]
    async fn test_sign_in_status_mapping() {
        let (gate, _, _) = gate(
            ScriptedHttp::default()
                .respond(404, "")
                .respond(500, "")
                .respond(200, "not json")
                .fail(),
        );

        assert_eq!(
            gate.sign_in_requested("a@b.com", "pw").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            gate.sign_in_requested("a@b.com", "pw").await,
            Err(AuthError::Unknown { status: Some(500) })
        );
        assert!(matches!(
            gate.sign_in_requested("a@b.com", "pw").await,
            Err(AuthError::InvalidResponse(_))
        ));
        assert!(matches!(
            gate.sign_in_requested("a@b.com", "pw").await,
            Err(AuthError::NetworkProblem(_))
        ));
        assert_eq!(gate.state(), GateState::NoSession);
    }

    #[tokio::test]
    async fn test_failed_sign_in_fails_waiters_by_default() {
        let (gate, _, presenter) = gate(ScriptedHttp::default().respond(404, ""));
        let failures = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&failures);
        gate.request_token(RequesterKey::new(), |_, _| {}, move |err| sink.lock().push(err));

        let _ = gate.sign_in_requested("a@b.com", "wrong").await;

        assert_eq!(*failures.lock(), vec![AuthError::InvalidCredentials]);
        assert_eq!(gate.pending_count(), 0);
        assert_eq!(gate.state(), GateState::NoSession);
        assert_eq!(presenter.dismissed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keep_waiting_policy_leaves_waiters_parked() {
        let (gate, _, presenter) = gate(ScriptedHttp::default().respond(404, "").respond(200, USER_JSON));
        let gate = gate.with_failure_policy(SignInFailurePolicy::KeepWaiting);
        let resolved = Arc::new(AtomicUsize::new(0));

        let hits = Arc::clone(&resolved);
        gate.request_token(
            RequesterKey::new(),
            move |_, _| {
                hits.fetch_add(1, Ordering::SeqCst);
            },
            |_| panic!("waiter must not fail"),
        );

        let _ = gate.sign_in_requested("a@b.com", "wrong").await;
        assert_eq!(gate.pending_count(), 1);
        assert_eq!(gate.state(), GateState::SignInInFlight);
        assert_eq!(presenter.dismissed.load(Ordering::SeqCst), 0);

        gate.sign_in_requested("a@b.com", "pw").await.unwrap();
        assert_eq!(resolved.load(Ordering::SeqCst), 1);
        assert_eq!(presenter.dismissed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_registration_email_taken_keeps_waiters() {
        let (gate, http, _) = gate(ScriptedHttp::default().respond(404, ""));
        gate.request_token(RequesterKey::new(), |_, _| {}, |_| {});

        let form = RegistrationForm {
            email: "a@b.com".into(),
            password: "pw".into(),
            first_name: "Ann".into(),
            last_name: "Bee".into(),
            phone_number: "555".into(),
        };
        assert_eq!(gate.register_requested(form).await, Err(AuthError::EmailTaken));
        assert_eq!(gate.pending_count(), 1);

        let requests = http.requests.lock();
        assert_eq!(requests[0].url, "https://auth.example.com/users");
        assert!(requests[0].body.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_credential_ignores_stale_credential() {
        let (gate, _, _) = gate(ScriptedHttp::default().respond(200, USER_JSON));
        gate.sign_in_requested("a@b.com", "pw").await.unwrap();

        assert!(!gate.invalidate_credential(&BasicCredential::new("a@b.com", "old")));
        assert_eq!(gate.state(), GateState::SessionCached);

        assert!(gate.invalidate_credential(&BasicCredential::new("a@b.com", "pw")));
        assert_eq!(gate.state(), GateState::NoSession);
        assert!(gate.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_and_next_request_presents() {
        let presenter = Arc::new(CountingPresenter::default());
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let gate = AuthGate::new(
            ServiceConfig::new("https://auth.example.com", "https://api.example.com").unwrap(),
            Arc::new(ScriptedHttp::default().respond(200, USER_JSON)),
            presenter.clone(),
            InlineQueue::shared(),
            bus,
        );

        gate.sign_in_requested("a@b.com", "pw").await.unwrap();
        assert_eq!(gate.state(), GateState::SessionCached);

        gate.sign_out();
        assert_eq!(gate.state(), GateState::NoSession);
        assert!(gate.current_user().is_none());

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(seen.last(), Some(&CoreEvent::Auth(AuthEvent::SignedOut)));

        gate.request_token(RequesterKey::new(), |_, _| {}, |_| {});
        assert_eq!(gate.state(), GateState::SignInInFlight);
        assert_eq!(gate.active_flow(), Some(SignInFlowId(1)));
        assert_eq!(presenter.presented.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_acquire_token_resolves_after_sign_in() {
        let (gate, _, _) = gate(ScriptedHttp::default().respond(200, USER_JSON));
        let gate = Arc::new(gate);

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.acquire_token(RequesterKey::new()).await })
        };
        while gate.pending_count() == 0 {
            tokio::task::yield_now().await;
        }

        gate.sign_in_requested("a@b.com", "pw").await.unwrap();
        let (credential, user) = waiter.await.unwrap().unwrap();
        assert_eq!(credential.email(), "a@b.com");
        assert_eq!(user.id, 7);
    }

    #[tokio::test]
    async fn test_acquire_token_reports_cancellation() {
        let (gate, _, _) = gate(ScriptedHttp::default());
        let gate = Arc::new(gate);

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.acquire_token(RequesterKey::new()).await })
        };
        while gate.pending_count() == 0 {
            tokio::task::yield_now().await;
        }

        gate.sign_in_cancelled();
        assert_eq!(waiter.await.unwrap(), Err(AuthError::UserCancelled));
    }
}
