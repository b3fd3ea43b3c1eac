//! Delta snapshots and per-round path reconstruction
//!
//! A [`DeltaSnapshot`] holds the items of one delta page sequence keyed by
//! id. Paths are never stored on items: they are derived from parent
//! references each round by [`SnapshotPaths`], whose cache lives only as long
//! as the round that created it.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use graphvfs_core::domain::{join_relative, DeltaToken, DriveItem, ItemId, ParentReference};
use graphvfs_core::ports::DeltaPage;
use tracing::{debug, warn};

// ============================================================================
// DeltaSnapshot
// ============================================================================

/// Items from one delta round in server page order, plus the round's cursor
/// and server timestamp
#[derive(Debug, Clone)]
pub struct DeltaSnapshot {
    items: Vec<DriveItem>,
    /// id → position of the item's latest entry in `items`
    index: HashMap<ItemId, usize>,
    cursor: Option<DeltaToken>,
    timestamp: DateTime<Utc>,
}

impl DeltaSnapshot {
    /// Builds a snapshot from raw items
    ///
    /// An id that appears more than once is looked up by its last entry,
    /// which is the most recent state the server reported.
    pub fn new(items: Vec<DriveItem>, cursor: Option<DeltaToken>, timestamp: DateTime<Utc>) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id.clone(), pos))
            .collect();
        Self {
            items,
            index,
            cursor,
            timestamp,
        }
    }

    /// Items in server page order
    pub fn items(&self) -> &[DriveItem] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&DriveItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cursor for the next round, if the server sent one
    pub fn cursor(&self) -> Option<&DeltaToken> {
        self.cursor.as_ref()
    }

    /// Server time of the round's final page
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Starts a path resolution pass over this snapshot
    pub fn paths(&self) -> SnapshotPaths<'_> {
        SnapshotPaths::new(self)
    }
}

impl From<DeltaPage> for DeltaSnapshot {
    fn from(page: DeltaPage) -> Self {
        Self::new(page.items, page.cursor, page.server_time)
    }
}

// ============================================================================
// SnapshotPaths
// ============================================================================

/// Resolves root-relative item paths within one snapshot
///
/// Rules, applied while walking up from an item:
/// - a materialized parent path ends the walk: `parentPath/name`
/// - the drive root resolves to `""`
/// - an id-only parent is looked up in the same snapshot and the walk
///   continues from it
/// - a parent missing from the snapshot ends the walk with the names
///   collected so far
/// - a parent cycle is logged and cut at the repeated item
///
/// An item without a name of its own (Graph omits it on some tombstones)
/// has no path: joining an empty name would yield its parent's path.
///
/// Every item passed through on the way is cached, so resolving all items of
/// a round touches each parent link once.
pub struct SnapshotPaths<'a> {
    snapshot: &'a DeltaSnapshot,
    cache: HashMap<ItemId, String>,
}

impl<'a> SnapshotPaths<'a> {
    pub fn new(snapshot: &'a DeltaSnapshot) -> Self {
        Self {
            snapshot,
            cache: HashMap::new(),
        }
    }

    /// Path of the snapshot item with id `id`
    ///
    /// `None` if the item is not part of the snapshot or has no name.
    pub fn path_by_id(&mut self, id: &ItemId) -> Option<String> {
        let snapshot = self.snapshot;
        let item = snapshot.get(id)?;
        self.path_of(item)
    }

    /// Root-relative path of `item` (`""` for the drive root)
    ///
    /// `item` does not need to belong to the snapshot; only its ancestors
    /// are looked up there. Returns `None` for a nameless non-root item.
    pub fn path_of<'b>(&mut self, item: &'b DriveItem) -> Option<String>
    where
        'a: 'b,
    {
        if let Some(cached) = self.cache.get(&item.id) {
            return Some(cached.clone());
        }
        if item.is_root {
            return Some(String::new());
        }
        if item.name.is_empty() {
            return None;
        }

        let snapshot = self.snapshot;

        // Items walked through, innermost first
        let mut chain: Vec<&'b DriveItem> = Vec::new();
        let mut visited: HashSet<&'b ItemId> = HashSet::new();
        let mut current = item;

        let base = loop {
            if let Some(cached) = self.cache.get(&current.id) {
                break cached.clone();
            }
            if !visited.insert(&current.id) {
                warn!(item = %item.id, at = %current.id, "Parent cycle detected, cutting path");
                break String::new();
            }
            if current.is_root {
                self.cache.insert(current.id.clone(), String::new());
                break String::new();
            }

            chain.push(current);
            match &current.parent {
                ParentReference::Path { path, .. } => break path.trim_matches('/').to_string(),
                ParentReference::Root => break String::new(),
                ParentReference::IdOnly { id } => match snapshot.get(id) {
                    Some(parent) => current = parent,
                    None => {
                        debug!(item = %item.id, parent = %id, "Parent not in snapshot");
                        break String::new();
                    }
                },
            }
        };

        let mut path = base;
        for link in chain.iter().rev() {
            path = join_relative(&path, &link.name);
            self.cache.insert(link.id.clone(), path.clone());
        }
        Some(path)
    }
}
