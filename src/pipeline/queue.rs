//! Run triggers and the coalescing run queue.
//!
//! At most one run is pending at any time. Triggers that arrive while a
//! run is in progress merge into that pending run, so a burst of changes
//! costs one follow-up run covering all of them.

use std::collections::BTreeSet;

use crate::fileset::SetKind;

/// Why a run was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Run every task (startup, config reload).
    Full,
    /// Run tasks reading these sets, plus their dependents.
    Changed(BTreeSet<SetKind>),
}

impl Trigger {
    pub fn changed(kinds: impl IntoIterator<Item = SetKind>) -> Self {
        Self::Changed(kinds.into_iter().collect())
    }

    /// Union of two triggers. `Full` absorbs everything.
    pub fn merge(self, other: Trigger) -> Trigger {
        match (self, other) {
            (Self::Full, _) | (_, Self::Full) => Self::Full,
            (Self::Changed(mut a), Self::Changed(b)) => {
                a.extend(b);
                Self::Changed(a)
            }
        }
    }
}

/// Depth-one queue of pending triggers.
#[derive(Debug, Default)]
pub struct RunQueue {
    pending: Option<Trigger>,
}

impl RunQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trigger, merging with any pending one.
    pub fn push(&mut self, trigger: Trigger) {
        self.pending = Some(match self.pending.take() {
            Some(pending) => pending.merge(trigger),
            None => trigger,
        });
    }

    /// Take the pending trigger, leaving the queue empty.
    pub fn take(&mut self) -> Option<Trigger> {
        self.pending.take()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_changed_is_union() {
        let merged = Trigger::changed([SetKind::Styles]).merge(Trigger::changed([SetKind::Markup]));
        assert_eq!(merged, Trigger::changed([SetKind::Styles, SetKind::Markup]));
    }

    #[test]
    fn test_full_absorbs() {
        assert_eq!(
            Trigger::changed([SetKind::Images]).merge(Trigger::Full),
            Trigger::Full
        );
        assert_eq!(
            Trigger::Full.merge(Trigger::changed([SetKind::Images])),
            Trigger::Full
        );
    }

    #[test]
    fn test_many_pushes_one_pending_run() {
        let mut queue = RunQueue::new();
        queue.push(Trigger::changed([SetKind::Styles]));
        queue.push(Trigger::changed([SetKind::Scripts]));
        queue.push(Trigger::changed([SetKind::Styles]));

        assert_eq!(
            queue.take(),
            Some(Trigger::changed([SetKind::Styles, SetKind::Scripts]))
        );
        assert!(queue.is_empty());
        assert_eq!(queue.take(), None);
    }
}
