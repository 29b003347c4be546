/*!
 * Reconciliation: replay the durable queue against the remote bridge
 *
 * One pass is best-effort and order-preserving with an all-or-nothing
 * persistence outcome. If the remote application is down nothing is
 * touched, not even the queue file. If a call fails partway, the pass
 * stops and the whole queue stays on disk, so actions applied before the
 * failure will be applied again on the next successful pass (at-least-once
 * semantics, no idempotence key).
 */

use tracing::{debug, info};

use crate::bridge::BridgeClient;
use crate::config::GraphConfig;
use crate::error::Result;
use crate::queue::{Action, Queue};

/// Run one reconciliation pass and return the number of actions applied.
///
/// Dispatch is strictly FIFO and sequential; the first remote failure
/// aborts the pass and propagates. After a fully successful pass the queue
/// is cleared, except that entries of unrecognized kinds are persisted
/// back untouched: a newer producer's actions are never dropped by an
/// older reconciler.
pub fn reconcile(bridge: &dyn BridgeClient, config: &GraphConfig) -> Result<usize> {
    if !bridge.probe_availability() {
        debug!("remote endpoint unavailable, leaving queue untouched");
        return Ok(0);
    }

    let mut queue = Queue::load(config)?;
    let snapshot = queue.snapshot().to_vec();

    let mut applied = 0usize;
    let mut skipped = 0usize;
    for action in &snapshot {
        match action {
            Action::CreatePage { name, content } => {
                bridge.create_page(name, content)?;
                applied += 1;
            }
            Action::InsertBlock {
                parent_uuid,
                content,
                sibling,
            } => {
                bridge.insert_block(parent_uuid, content, *sibling)?;
                applied += 1;
            }
            Action::Unknown { kind, .. } => {
                debug!(kind, "skipping action of unrecognized kind");
                skipped += 1;
            }
        }
    }

    if applied > 0 {
        if skipped > 0 {
            queue.retain_unknown()?;
        } else {
            queue.clear()?;
        }
        info!(applied, skipped, "reconciliation pass complete");
    }

    Ok(applied)
}
