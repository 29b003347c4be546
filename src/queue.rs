/*!
 * Durable action queue
 *
 * Pending remote operations are persisted as a single JSON file per graph:
 * a pretty-printed array of `{"type": ..., "payload": {...}}` records, `[]`
 * when empty. Every mutation rewrites the whole file through the atomic
 * temp + rename protocol, so the file on disk always parses to a
 * well-formed (possibly empty) sequence.
 *
 * Kinds the queue does not recognize are carried as `Action::Unknown`:
 * they round-trip byte-for-byte and are skipped, never dropped, by a
 * reconciler that does not understand them.
 */

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::GraphConfig;
use crate::error::{Result, TetherError};
use crate::store::atomic_write;

const KIND_CREATE_PAGE: &str = "create_page";
const KIND_INSERT_BLOCK: &str = "insert_block";

/// One deferred operation against the remote application
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreatePage {
        name: String,
        content: String,
    },
    InsertBlock {
        parent_uuid: String,
        content: String,
        sibling: bool,
    },
    /// A kind this build does not understand; preserved verbatim
    Unknown { kind: String, payload: Value },
}

impl Action {
    /// Build a `create_page` action; the page name is required
    pub fn create_page(name: &str, content: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(TetherError::Validation(
                "create_page requires a non-empty page name".to_string(),
            ));
        }
        Ok(Action::CreatePage {
            name: name.to_string(),
            content: content.to_string(),
        })
    }

    /// Build an `insert_block` action; the parent block uuid is required
    pub fn insert_block(parent_uuid: &str, content: &str, sibling: bool) -> Result<Self> {
        if parent_uuid.trim().is_empty() {
            return Err(TetherError::Validation(
                "insert_block requires a non-empty parent block uuid".to_string(),
            ));
        }
        Ok(Action::InsertBlock {
            parent_uuid: parent_uuid.to_string(),
            content: content.to_string(),
            sibling,
        })
    }

    /// The on-disk `type` tag for this action
    pub fn kind(&self) -> &str {
        match self {
            Action::CreatePage { .. } => KIND_CREATE_PAGE,
            Action::InsertBlock { .. } => KIND_INSERT_BLOCK,
            Action::Unknown { kind, .. } => kind,
        }
    }

    fn to_record(&self) -> ActionRecord {
        match self {
            Action::CreatePage { name, content } => ActionRecord {
                kind: KIND_CREATE_PAGE.to_string(),
                payload: serde_json::json!({ "name": name, "content": content }),
            },
            Action::InsertBlock {
                parent_uuid,
                content,
                sibling,
            } => ActionRecord {
                kind: KIND_INSERT_BLOCK.to_string(),
                payload: serde_json::json!({
                    "parent_uuid": parent_uuid,
                    "content": content,
                    "sibling": sibling,
                }),
            },
            Action::Unknown { kind, payload } => ActionRecord {
                kind: kind.clone(),
                payload: payload.clone(),
            },
        }
    }

    fn from_record(record: ActionRecord) -> std::result::Result<Self, String> {
        let ActionRecord { kind, payload } = record;
        if kind == KIND_CREATE_PAGE {
            let name = required_str(&payload, &kind, "name")?;
            if name.trim().is_empty() {
                return Err(format!("{} record has an empty `name`", kind));
            }
            let content = optional_str(&payload, &kind, "content")?;
            Ok(Action::CreatePage { name, content })
        } else if kind == KIND_INSERT_BLOCK {
            let parent_uuid = required_str(&payload, &kind, "parent_uuid")?;
            if parent_uuid.trim().is_empty() {
                return Err(format!("{} record has an empty `parent_uuid`", kind));
            }
            let content = required_str(&payload, &kind, "content")?;
            let sibling = optional_bool(&payload, &kind, "sibling", true)?;
            Ok(Action::InsertBlock {
                parent_uuid,
                content,
                sibling,
            })
        } else {
            Ok(Action::Unknown { kind, payload })
        }
    }
}

/// Wire shape of one queue entry
#[derive(Debug, Serialize, Deserialize)]
struct ActionRecord {
    #[serde(rename = "type")]
    kind: String,
    payload: Value,
}

fn required_str(payload: &Value, kind: &str, field: &str) -> std::result::Result<String, String> {
    match payload.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(format!("{} record field `{}` is not a string", kind, field)),
        None => Err(format!(
            "{} record is missing required field `{}`",
            kind, field
        )),
    }
}

fn optional_str(payload: &Value, kind: &str, field: &str) -> std::result::Result<String, String> {
    match payload.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Ok(String::new()),
        Some(_) => Err(format!("{} record field `{}` is not a string", kind, field)),
    }
}

fn optional_bool(
    payload: &Value,
    kind: &str,
    field: &str,
    default: bool,
) -> std::result::Result<bool, String> {
    match payload.get(field) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Null) | None => Ok(default),
        Some(_) => Err(format!("{} record field `{}` is not a boolean", kind, field)),
    }
}

/// File-backed FIFO of pending actions.
///
/// A handle is transient; the file is the only durable state. One logical
/// queue per graph, single writer at a time. Concurrent invocations racing
/// on the same file are out of scope (last rename wins).
#[derive(Debug)]
pub struct Queue {
    path: PathBuf,
    scratch_dir: PathBuf,
    actions: Vec<Action>,
}

impl Queue {
    /// Open the queue for a graph, reading current on-disk state.
    ///
    /// An absent file is an empty queue. A present file that does not parse
    /// is `CorruptQueue`; it is never silently discarded or truncated, since
    /// that would lose pending work.
    pub fn load(config: &GraphConfig) -> Result<Self> {
        let path = config.queue_path();
        let mut queue = Queue {
            path,
            scratch_dir: config.scratch_dir(),
            actions: Vec::new(),
        };

        if queue.path.exists() {
            let raw = fs::read_to_string(&queue.path)?;
            let records: Vec<ActionRecord> =
                serde_json::from_str(&raw).map_err(|e| TetherError::CorruptQueue {
                    path: queue.path.clone(),
                    reason: e.to_string(),
                })?;
            for record in records {
                let action =
                    Action::from_record(record).map_err(|reason| TetherError::CorruptQueue {
                        path: queue.path.clone(),
                        reason,
                    })?;
                queue.actions.push(action);
            }
        }

        Ok(queue)
    }

    /// Append an action and persist the full sequence
    pub fn enqueue(&mut self, action: Action) -> Result<()> {
        debug!(kind = action.kind(), "enqueueing action");
        self.actions.push(action);
        self.persist()
    }

    /// Drop every action and persist `[]`; idempotent on an empty queue
    pub fn clear(&mut self) -> Result<()> {
        self.actions.clear();
        self.persist()
    }

    /// Keep only `Unknown` actions and persist; used after a reconciliation
    /// pass that applied every kind it understands
    pub fn retain_unknown(&mut self) -> Result<()> {
        self.actions
            .retain(|action| matches!(action, Action::Unknown { .. }));
        self.persist()
    }

    /// Stable view of the current in-memory contents
    pub fn snapshot(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let records: Vec<ActionRecord> = self.actions.iter().map(Action::to_record).collect();
        let body = serde_json::to_string_pretty(&records)?;
        atomic_write(&self.path, &self.scratch_dir, &body)
    }
}
