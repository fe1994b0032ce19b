use {
    crate::domain::{
        id::OrderId,
        order::{Order, OrderStatus},
        provider::OrderProvider,
    },
    std::{fmt, time::Duration},
    tokio::sync::watch,
};

/// Attempt budget for one confirmation wait. Callers supply their own;
/// the default is the 3-minute window the checkout flow uses.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_millis(3000),
        }
    }
}

/// How one confirmation wait ended. Exactly one of these is produced
/// per wait. `Cancelled` means the wait itself was called off, not that
/// the order was cancelled; `TimedOut` means the budget ran out before
/// the backend reported a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Paid,
    Failed,
    Cancelled,
    TimedOut,
}

impl PollOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timeout",
        }
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollResult {
    pub outcome: PollOutcome,
    /// Snapshot of the order as fetched on the settling attempt. Absent
    /// for `Cancelled` and `TimedOut`.
    pub last_order: Option<Order>,
}

impl PollResult {
    fn cancelled() -> Self {
        Self {
            outcome: PollOutcome::Cancelled,
            last_order: None,
        }
    }
}

/// A closed channel counts as cancellation: whoever held the handle is
/// gone, so nobody is left to consume an outcome.
fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow() || cancel.has_changed().is_err()
}

/// Poll the backend until `order_id` settles, the caller cancels, or
/// the attempt budget runs out.
///
/// Attempts are strictly sequential. Cancellation is checked before
/// every attempt and re-checked once a fetch resolves, so a
/// cancellation that races an in-flight fetch wins over whatever the
/// fetch brought back. Fetch errors of any kind are logged and treated
/// as "not yet resolved"; nothing escapes this function.
pub async fn wait_for_payment(
    provider: &dyn OrderProvider,
    order_id: &OrderId,
    mut cancel: watch::Receiver<bool>,
    policy: PollPolicy,
) -> PollResult {
    for attempt in 1..=policy.max_attempts {
        if is_cancelled(&cancel) {
            return PollResult::cancelled();
        }

        match provider.fetch_order(order_id).await {
            Ok(order) => {
                if is_cancelled(&cancel) {
                    return PollResult::cancelled();
                }
                match order.status {
                    OrderStatus::Paid => {
                        return PollResult {
                            outcome: PollOutcome::Paid,
                            last_order: Some(order),
                        };
                    }
                    OrderStatus::Failed => {
                        return PollResult {
                            outcome: PollOutcome::Failed,
                            last_order: Some(order),
                        };
                    }
                    // Anything else, a cancelled order included, is not
                    // yet resolved; only the budget ends the wait.
                    status => {
                        tracing::debug!(order_id = %order_id, attempt, %status, "not confirmed yet");
                    }
                }
            }
            Err(e) => {
                // A single failed attempt never aborts the sequence.
                tracing::warn!(order_id = %order_id, attempt, error = %e, "status check failed, will retry");
            }
        }

        if attempt < policy.max_attempts {
            tokio::select! {
                // Re-checked at the top of the next iteration.
                _ = cancel.changed() => {}
                _ = tokio::time::sleep(policy.interval) => {}
            }
        }
    }

    PollResult {
        outcome: PollOutcome::TimedOut,
        last_order: None,
    }
}
