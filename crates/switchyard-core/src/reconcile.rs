// ── Networking action reconciler ──
//
// One action, one session: plan, resolve the owning switch, open, apply,
// disconnect. Retries are the caller's business; the outcome of every
// action is reported so the caller can decide what to resubmit.

use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::{NetworkingAction, Port};
use crate::registry::SwitchRegistry;

/// Result of one action in a batch.
#[derive(Debug)]
pub struct ActionOutcome {
    pub action: NetworkingAction,
    pub result: Result<(), CoreError>,
}

impl ActionOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Applies pending actions to the switches of a registry.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    registry: &'a SwitchRegistry,
}

impl<'a> Reconciler<'a> {
    pub fn new(registry: &'a SwitchRegistry) -> Self {
        Self { registry }
    }

    /// Apply one action.
    ///
    /// Invariants are checked before any connection is made. The session is
    /// always disconnected; a disconnect failure is logged and only reported
    /// when the apply itself succeeded.
    pub async fn apply(&self, action: &NetworkingAction) -> Result<(), CoreError> {
        action.plan()?;
        let port = action.port()?;
        let switch = self.registry.owner_of(port)?;

        let mut session = switch.session().await?;
        let applied = session.apply_networking(action).await;
        let closed = session.disconnect().await;
        settle(switch.label(), applied, closed)?;

        info!(switch = switch.label(), port = %port.label, channel = %action.channel, "action reconciled");
        Ok(())
    }

    /// Strip every VLAN from `port`, under the same disconnect rules as
    /// [`apply`](Self::apply).
    pub async fn revert(&self, port: &Port) -> Result<(), CoreError> {
        let switch = self.registry.owner_of(port)?;

        let mut session = switch.session().await?;
        let reverted = session.revert_port(port).await;
        let closed = session.disconnect().await;
        settle(switch.label(), reverted, closed)
    }

    /// Apply actions in order, each with its own session. Never stops early.
    pub async fn apply_all(&self, actions: Vec<NetworkingAction>) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(actions.len());
        for action in actions {
            let result = self.apply(&action).await;
            if let Err(ref err) = result {
                warn!(nic = %action.nic.label, channel = %action.channel, error = %err, retryable = err.is_retryable(), "action failed");
            }
            outcomes.push(ActionOutcome { action, result });
        }
        outcomes
    }
}

/// Combine an operation's result with the disconnect that followed it.
fn settle(
    switch: &str,
    result: Result<(), CoreError>,
    closed: Result<(), CoreError>,
) -> Result<(), CoreError> {
    match (result, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(switch, error = %close_err, "disconnect after failed operation also failed");
            Err(err)
        }
        (Ok(()), Err(close_err)) => {
            warn!(switch, error = %close_err, "disconnect failed after operation");
            Err(close_err)
        }
    }
}
