//! Search unit - one spawned backend call
//!
//! Racer and aggregator both fan out by spawning one unit per backend.
//! Units report on a bounded channel sized to the number of units, so a
//! send never waits: a straggler's result lands in the buffer (or is
//! rejected because the receiver is gone) and the task exits. Nothing is
//! left blocked once the consumer stops listening.

use std::sync::Arc;

use contracts::{Answer, ContractError, Query, SearchBackend};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// One report from a unit
#[derive(Debug)]
pub(crate) struct Arrival {
    /// Position of the backend in the submitted sequence
    pub slot: usize,
    pub outcome: Result<Answer, ContractError>,
}

/// Channel sized so that every unit can report without waiting
pub(crate) fn arrival_channel(units: usize) -> (mpsc::Sender<Arrival>, mpsc::Receiver<Arrival>) {
    mpsc::channel(units.max(1))
}

/// Spawn one backend call, detached
///
/// The unit stops early only if `cancel` fires while the backend is still
/// working.
pub(crate) fn spawn_unit<S>(
    backend: Arc<S>,
    query: Query,
    slot: usize,
    tx: mpsc::Sender<Arrival>,
    cancel: CancellationToken,
)
where
    S: SearchBackend + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                trace!(category = %backend.category(), slot, "Unit cancelled");
                return;
            }
            outcome = backend.search(&query) => outcome,
        };

        if tx.send(Arrival { slot, outcome }).await.is_err() {
            trace!(
                category = %backend.category(),
                slot,
                "Consumer gone, straggler result discarded"
            );
        }
    });
}
