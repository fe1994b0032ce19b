use {
    crate::domain::{id::OrderId, order::Order, provider::OrderProvider},
    crate::services::poller::{self, PollOutcome, PollPolicy, PollResult},
    std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    tokio::sync::watch,
};

/// What the presentation layer renders from.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileState {
    Idle,
    Polling,
    Settled {
        outcome: PollOutcome,
        order: Option<Order>,
    },
}

impl ReconcileState {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }
}

struct PollSession {
    order_id: OrderId,
    cancel_tx: watch::Sender<bool>,
}

/// Binds confirmation polling to the lifetime of whatever is showing
/// it: one live session at a time, cancellation on every exit path,
/// explicit retry with a fresh budget.
pub struct Reconciler {
    provider: Arc<dyn OrderProvider>,
    policy: PollPolicy,
    state_tx: watch::Sender<ReconcileState>,
    /// Id of the session allowed to publish state. Bumping it makes a
    /// superseded session inert; state writes go through the channel
    /// lock so a retired session can never publish after the bump.
    live_session: Arc<AtomicU64>,
    next_session: u64,
    session: Option<PollSession>,
}

impl Reconciler {
    pub fn new(provider: Arc<dyn OrderProvider>, policy: PollPolicy) -> Self {
        let (state_tx, _) = watch::channel(ReconcileState::Idle);
        Self {
            provider,
            policy,
            state_tx,
            live_session: Arc::new(AtomicU64::new(0)),
            next_session: 0,
            session: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ReconcileState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> ReconcileState {
        self.state_tx.borrow().clone()
    }

    /// Start watching `order_id`. Starting the same order again is a
    /// no-op, whether the session is still polling or already settled;
    /// [`Reconciler::retry`] is the explicit way to run it over. A
    /// different order replaces the session.
    pub fn start(&mut self, order_id: OrderId) {
        if let Some(session) = &self.session {
            if session.order_id == order_id {
                return;
            }
        }
        self.spawn_session(order_id);
    }

    /// Cancel whatever is running and watch the last order again with a
    /// full attempt budget.
    pub fn retry(&mut self) {
        let Some(order_id) = self.session.as_ref().map(|s| s.order_id.clone()) else {
            return;
        };
        self.spawn_session(order_id);
    }

    /// Cancel the active session. The poller observes the signal at its
    /// next check point and settles as cancelled.
    pub fn cancel(&mut self) {
        if let Some(session) = &self.session {
            let _ = session.cancel_tx.send(true);
        }
    }

    fn spawn_session(&mut self, order_id: OrderId) {
        self.retire_current();

        self.next_session += 1;
        let session_id = self.next_session;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let provider = Arc::clone(&self.provider);
        let live = Arc::clone(&self.live_session);
        let state = self.state_tx.clone();
        let policy = self.policy;
        let id = order_id.clone();

        // Publish the handover under the channel lock so no retired
        // session can sneak a write in between.
        state.send_if_modified(|_| {
            live.store(session_id, Ordering::Release);
            false
        });

        tokio::spawn(async move {
            publish(&state, &live, session_id, ReconcileState::Polling);
            tracing::info!(order_id = %id, attempts = policy.max_attempts, "payment watch started");

            let PollResult {
                outcome,
                last_order,
            } = poller::wait_for_payment(provider.as_ref(), &id, cancel_rx, policy).await;

            tracing::info!(order_id = %id, %outcome, "payment watch settled");
            publish(
                &state,
                &live,
                session_id,
                ReconcileState::Settled {
                    outcome,
                    order: last_order,
                },
            );
        });

        self.session = Some(PollSession {
            order_id,
            cancel_tx,
        });
    }

    fn retire_current(&mut self) {
        if let Some(session) = self.session.take() {
            // A settled session has already dropped its receiver.
            let _ = session.cancel_tx.send(true);
        }
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn publish(
    state: &watch::Sender<ReconcileState>,
    live: &AtomicU64,
    session_id: u64,
    next: ReconcileState,
) {
    state.send_if_modified(|current| {
        if live.load(Ordering::Acquire) != session_id {
            return false;
        }
        *current = next;
        true
    });
}
