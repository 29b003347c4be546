/*!
 * Tether - offline-first bridge for a local Logseq graph
 *
 * Writes entries directly to the graph's text files on disk, or queues
 * structured actions durably and replays them against the Logseq HTTP
 * plugin API once the application is running:
 * - Atomic temp + rename persistence for pages, journals and the queue
 * - Boolean availability probing (a down application is never an error)
 * - Order-preserving, all-or-nothing-per-run reconciliation
 * - Listing and naive term search across pages and journals
 */

pub mod bridge;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod queue;
pub mod reconcile;
pub mod store;

// Re-export commonly used types
pub use bridge::{BridgeClient, HttpBridge};
pub use config::GraphConfig;
pub use error::{Result, TetherError};
pub use queue::{Action, Queue};
pub use reconcile::reconcile;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
