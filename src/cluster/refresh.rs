use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use tracing::info;

/// Number of views a single diff pass added and removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Changes {
    pub(crate) added: usize,
    pub(crate) removed: usize,
}

impl std::ops::AddAssign for Changes {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.removed += rhs.removed;
    }
}

/// Add and remove views, but never touch a view whose key survives.
///
/// Views read through to the current snapshot, so a surviving view needs no update. Replacing it
/// would hand out a second object for the same key while callers still hold the first.
pub(crate) fn refresh_no_clobber<K, V, U, F>(
    scope: &str,
    target: &mut BTreeMap<K, Arc<V>>,
    updates: &BTreeMap<K, U>,
    mut make: F,
) -> Changes
where
    K: Ord + Clone + Debug,
    F: FnMut(&K) -> V,
{
    let before = target.len();
    target.retain(|key, _| {
        let keep = updates.contains_key(key);
        if !keep {
            info!(scope, ?key, "Removing");
        }
        keep
    });
    let removed = before - target.len();

    let mut added = 0;
    for key in updates.keys() {
        if !target.contains_key(key) {
            info!(scope, ?key, "Adding");
            target.insert(key.clone(), Arc::new(make(key)));
            added += 1;
        }
    }

    Changes { added, removed }
}
