//! Per-domain generation orchestration.
//!
//! A [`GenerationOrchestrator`] owns at most one current [`RequestSession`].
//! `submit()` validates, starts a session, calls the service once and settles
//! the session that issued the call. If that session was replaced in the
//! meantime (by `reset()`), the late outcome lands on the detached session and
//! never reaches observers. Dropping the `submit()` future fails its session
//! as cancelled.

use crate::domain::{GenerationDomain, Validate};
use crate::error::{ErrorInfo, ErrorKind, StudioError};
use crate::service::GenerationService;
use crate::session::{RequestSession, SessionId, SessionSnapshot, SessionStatus};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub type DomainSession<D> =
    RequestSession<<D as GenerationDomain>::Request, <D as GenerationDomain>::Output>;

pub type DomainSnapshot<D> =
    SessionSnapshot<<D as GenerationDomain>::Request, <D as GenerationDomain>::Output>;

/// Lock a mutex, recovering the data if a holder panicked.
///
/// Session state stays consistent across a panic because every transition
/// is a single assignment under the lock.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// What happened to a `submit()` call that passed validation.
#[derive(Debug, Clone)]
pub enum SubmitOutcome<D: GenerationDomain> {
    /// The service answered and the session is now current and fulfilled.
    Fulfilled(DomainSnapshot<D>),
    /// The service failed (or the call was cancelled). The session is current and failed.
    Failed(DomainSnapshot<D>),
    /// A session was already pending. Nothing was sent; this is that session.
    AlreadyPending(DomainSnapshot<D>),
    /// The session settled after being detached by `reset()`. Observers never saw it.
    Superseded(DomainSnapshot<D>),
}

impl<D: GenerationDomain> SubmitOutcome<D> {
    pub fn snapshot(&self) -> &DomainSnapshot<D> {
        match self {
            SubmitOutcome::Fulfilled(s)
            | SubmitOutcome::Failed(s)
            | SubmitOutcome::AlreadyPending(s)
            | SubmitOutcome::Superseded(s) => s,
        }
    }

    pub fn into_snapshot(self) -> DomainSnapshot<D> {
        match self {
            SubmitOutcome::Fulfilled(s)
            | SubmitOutcome::Failed(s)
            | SubmitOutcome::AlreadyPending(s)
            | SubmitOutcome::Superseded(s) => s,
        }
    }

    pub fn result(&self) -> Option<&D::Output> {
        match self {
            SubmitOutcome::Fulfilled(s) => s.result.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            SubmitOutcome::Failed(s) => s.error.as_ref(),
            _ => None,
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, SubmitOutcome::Fulfilled(_))
    }
}

struct ActiveSession<D: GenerationDomain> {
    session: Arc<Mutex<DomainSession<D>>>,
    cancel: CancellationToken,
}

struct Inner<D: GenerationDomain> {
    service: Arc<dyn GenerationService>,
    // Lock order: current, then session.
    current: Mutex<Option<ActiveSession<D>>>,
    snapshots: watch::Sender<DomainSnapshot<D>>,
    shutdown: CancellationToken,
}

/// Fails the session if the `submit()` future is dropped before it settles,
/// so the domain never stays pending with nobody awaiting the call.
struct SettleOnDrop<'a, D: GenerationDomain> {
    orchestrator: &'a GenerationOrchestrator<D>,
    session: Arc<Mutex<DomainSession<D>>>,
    armed: bool,
}

impl<D: GenerationDomain> SettleOnDrop<'_, D> {
    fn settle(mut self, outcome: Result<D::Output, ErrorInfo>) -> SubmitOutcome<D> {
        self.armed = false;
        self.orchestrator.settle(&self.session, outcome)
    }
}

impl<D: GenerationDomain> Drop for SettleOnDrop<'_, D> {
    fn drop(&mut self) {
        if self.armed {
            debug!(domain = D::NAME, "submission dropped while pending");
            self.orchestrator.settle(
                &self.session,
                Err(ErrorInfo::cancelled("submission dropped before completion")),
            );
        }
    }
}

/// Validates input, guards against overlapping submissions and dispatches
/// one domain's requests to the generation service.
///
/// Cloning is cheap and yields a handle to the same orchestrator, so a
/// submission can be spawned while other handles observe or reset it.
pub struct GenerationOrchestrator<D: GenerationDomain> {
    inner: Arc<Inner<D>>,
}

impl<D: GenerationDomain> Clone for GenerationOrchestrator<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: GenerationDomain> GenerationOrchestrator<D> {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self::with_shutdown(service, CancellationToken::new())
    }

    /// In-flight calls are cancelled when `shutdown` is.
    pub fn with_shutdown(service: Arc<dyn GenerationService>, shutdown: CancellationToken) -> Self {
        let (snapshots, _) = watch::channel(SessionSnapshot::idle());
        Self {
            inner: Arc::new(Inner {
                service,
                current: Mutex::new(None),
                snapshots,
                shutdown,
            }),
        }
    }

    /// Submit a request and wait for it to settle.
    ///
    /// Returns `Err` only for validation failures, in which case no session
    /// is created and the service is not called. Service failures are
    /// reported through [`SubmitOutcome::Failed`].
    #[instrument(skip_all, fields(domain = D::NAME))]
    pub async fn submit(&self, request: D::Request) -> Result<SubmitOutcome<D>, StudioError> {
        if let Err(err) = request.validate() {
            debug!(error = %err, "submission rejected");
            return Err(err);
        }

        let (session, cancel, session_id) = {
            let mut current = lock(&self.inner.current);
            if let Some(active) = current.as_ref() {
                let pending = lock(&active.session);
                if pending.is_pending() {
                    debug!(session.id = %pending.id(), "submission ignored, session in flight");
                    return Ok(SubmitOutcome::AlreadyPending(pending.snapshot()));
                }
            }

            let started = RequestSession::start(request.clone());
            let session_id = started.id().clone();
            let snapshot = started.snapshot();
            let session = Arc::new(Mutex::new(started));
            let cancel = self.inner.shutdown.child_token();

            *current = Some(ActiveSession {
                session: Arc::clone(&session),
                cancel: cancel.clone(),
            });
            self.inner.snapshots.send_replace(snapshot);
            (session, cancel, session_id)
        };

        info!(session.id = %session_id, "generation started");
        let guard = SettleOnDrop {
            orchestrator: self,
            session,
            armed: true,
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ErrorInfo::cancelled("generation cancelled")),
            result = D::dispatch(self.inner.service.as_ref(), &request) => {
                result.map_err(ErrorInfo::from)
            }
        };

        Ok(guard.settle(outcome))
    }

    fn settle(
        &self,
        session: &Arc<Mutex<DomainSession<D>>>,
        outcome: Result<D::Output, ErrorInfo>,
    ) -> SubmitOutcome<D> {
        let current = lock(&self.inner.current);
        let is_current = current
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(&active.session, session));

        let mut guard = lock(session);
        let settled = match outcome {
            Ok(result) => guard.resolve(result),
            Err(error) => guard.reject(error),
        };
        if let Err(err) = settled {
            warn!(session.id = %guard.id(), error = %err, "session settled twice");
        }
        let snapshot = guard.snapshot();
        let duration = guard.duration();
        drop(guard);

        if !is_current {
            debug!(
                session.id = ?snapshot.session_id,
                session.status = %snapshot.status,
                "superseded session settled"
            );
            return SubmitOutcome::Superseded(snapshot);
        }

        self.inner.snapshots.send_replace(snapshot.clone());
        drop(current);

        match snapshot.status {
            SessionStatus::Fulfilled => {
                info!(
                    session.id = ?snapshot.session_id,
                    session.duration = ?duration,
                    "generation fulfilled"
                );
                SubmitOutcome::Fulfilled(snapshot)
            }
            _ => {
                match &snapshot.error {
                    Some(error) if error.kind == ErrorKind::Cancelled => warn!(
                        session.id = ?snapshot.session_id,
                        "generation cancelled"
                    ),
                    error => error!(
                        session.id = ?snapshot.session_id,
                        session.duration = ?duration,
                        error = ?error,
                        "generation failed"
                    ),
                }
                SubmitOutcome::Failed(snapshot)
            }
        }
    }

    /// Return the domain to `Idle`, discarding result and error.
    ///
    /// A pending call is cancelled and its session detached.
    #[instrument(skip_all, fields(domain = D::NAME))]
    pub fn reset(&self) {
        let mut current = lock(&self.inner.current);
        if let Some(active) = current.take() {
            let pending = lock(&active.session).is_pending();
            if pending {
                active.cancel.cancel();
            }
            debug!(cancelled = pending, "domain reset");
        }
        self.inner.snapshots.send_replace(SessionSnapshot::idle());
    }

    /// Cancel the in-flight call, if any. The session fails with
    /// [`crate::error::ErrorKind::Cancelled`] once `submit()` observes it.
    pub fn cancel(&self) -> bool {
        let current = lock(&self.inner.current);
        match current.as_ref() {
            Some(active) if lock(&active.session).is_pending() => {
                active.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Read-only view of the current session.
    pub fn snapshot(&self) -> DomainSnapshot<D> {
        let current = lock(&self.inner.current);
        match current.as_ref() {
            Some(active) => lock(&active.session).snapshot(),
            None => SessionSnapshot::idle(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.snapshot().status
    }

    pub fn is_pending(&self) -> bool {
        self.status() == SessionStatus::Pending
    }

    pub fn current_session_id(&self) -> Option<SessionId> {
        self.snapshot().session_id
    }

    /// Receive a snapshot after every transition of the current session.
    pub fn subscribe(&self) -> watch::Receiver<DomainSnapshot<D>> {
        self.inner.snapshots.subscribe()
    }
}

impl<D: GenerationDomain> std::fmt::Debug for GenerationOrchestrator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOrchestrator")
            .field("domain", &D::NAME)
            .field("status", &self.status())
            .finish()
    }
}
