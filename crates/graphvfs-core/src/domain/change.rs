//! Change events produced by the delta engine

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Classification of a remote change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Created,
    Changed,
    Deleted,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeType::Created => "created",
            ChangeType::Changed => "changed",
            ChangeType::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// One change with its drive-root-relative path (`""` is the root itself)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub change_type: ChangeType,
    pub path: String,
}

impl ChangeEvent {
    pub fn new(change_type: ChangeType, path: impl Into<String>) -> Self {
        Self {
            change_type,
            path: path.into(),
        }
    }
}

/// All events of one poll round, in server page order
pub type ChangeBatch = Arc<Vec<ChangeEvent>>;
