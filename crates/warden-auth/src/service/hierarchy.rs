//! Menu hierarchy index and closure resolution
//!
//! The maps are built from a flat snapshot of menus. Closures are computed
//! with an explicit worklist and a visited set, so a cycle in persisted data
//! ends the walk instead of looping forever.

use std::collections::{BTreeSet, HashMap, VecDeque};

use warden_persistence::model::MenuInfo;

/// Child id -> parent id, only for menus that have a parent
pub type ParentIdMap = HashMap<i64, i64>;

/// Parent id -> direct child ids
pub type ChildIdMap = HashMap<i64, BTreeSet<i64>>;

pub fn parent_id_map(menus: &[MenuInfo]) -> ParentIdMap {
    menus
        .iter()
        .filter_map(|m| m.parent_id.map(|parent_id| (m.id, parent_id)))
        .collect()
}

pub fn child_id_map(menus: &[MenuInfo]) -> ChildIdMap {
    let mut map = ChildIdMap::new();
    for menu in menus {
        if let Some(parent_id) = menu.parent_id {
            map.entry(parent_id).or_default().insert(menu.id);
        }
    }
    map
}

/// `id` and every menu on the path from it to its root.
pub fn ancestors_of(id: i64, parents: &ParentIdMap) -> BTreeSet<i64> {
    let mut visited = BTreeSet::from([id]);
    let mut current = id;

    while let Some(&parent) = parents.get(&current) {
        if !visited.insert(parent) {
            break;
        }
        current = parent;
    }

    visited
}

/// `id` and every menu in the subtree below it.
pub fn descendants_of(id: i64, children: &ChildIdMap) -> BTreeSet<i64> {
    let mut visited = BTreeSet::from([id]);
    let mut queue = VecDeque::from([id]);

    while let Some(current) = queue.pop_front() {
        let Some(direct) = children.get(&current) else {
            continue;
        };
        for child in direct {
            if visited.insert(*child) {
                queue.push_back(*child);
            }
        }
    }

    visited
}
