use crate::data::{Slot, SlotId};
use crate::time::TimeWindow;
use itertools::Itertools;
use log::trace;
use std::collections::BTreeSet;

/// Writes needed to turn a stored slot set into a requested one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotDiff {
    /// Requested windows with no stored counterpart, ascending
    pub to_insert: Vec<TimeWindow>,
    /// Stored slots with no requested counterpart, ascending by window
    pub to_delete: Vec<SlotId>,
}

impl SlotDiff {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }
}

/// Compares `existing` against `incoming` by exact `(start, end)` identity.
///
/// Windows that only overlap are different slots. A changed window is a delete
/// plus an insert. Duplicates are collapsed: repeated incoming windows are
/// inserted once, and a window stored more than once keeps only its first row.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use slotplan_libs::data::{Slot, SlotId};
/// use slotplan_libs::diff::diff;
/// use slotplan_libs::time::TimeWindow;
///
/// let at = |h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap();
/// let morning = TimeWindow::new(at(10), at(11)).unwrap();
/// let lunch = TimeWindow::new(at(12), at(13)).unwrap();
/// let evening = TimeWindow::new(at(18), at(19)).unwrap();
///
/// let stored = vec![Slot::new(SlotId(1), morning), Slot::new(SlotId(2), evening)];
/// let result = diff(&stored, &[morning, lunch]);
///
/// assert_eq!(result.to_insert, vec![lunch]);
/// assert_eq!(result.to_delete, vec![SlotId(2)]);
/// ```
pub fn diff<'a, E, I>(existing: E, incoming: I) -> SlotDiff
where
    E: IntoIterator<Item = &'a Slot>,
    I: IntoIterator<Item = &'a TimeWindow>,
{
    let incoming: BTreeSet<TimeWindow> = incoming.into_iter().copied().collect();

    let mut kept = BTreeSet::new();
    let mut to_delete = Vec::new();

    for slot in existing
        .into_iter()
        .sorted_by(|a, b| a.window.cmp(&b.window).then(a.id.cmp(&b.id)))
    {
        if incoming.contains(&slot.window) && kept.insert(slot.window) {
            continue;
        }
        trace!("Slot {} no longer requested", slot.id);
        to_delete.push(slot.id);
    }

    let to_insert = incoming.difference(&kept).copied().collect_vec();

    SlotDiff {
        to_insert,
        to_delete,
    }
}
