use std::{
    collections::{BTreeSet, HashMap},
    hash::Hash,
};

use time::OffsetDateTime;

/// Pending "cooldown elapsed" events, at most one per visitor.
#[derive(Debug)]
pub struct CooldownSchedule<V> {
    deadlines: HashMap<V, OffsetDateTime>,
    queue: BTreeSet<(OffsetDateTime, V)>,
}

impl<V: Copy + Eq + Hash + Ord> Default for CooldownSchedule<V> {
    fn default() -> Self {
        CooldownSchedule {
            deadlines: HashMap::new(),
            queue: BTreeSet::new(),
        }
    }
}

impl<V: Copy + Eq + Hash + Ord> CooldownSchedule<V> {
    pub fn new() -> CooldownSchedule<V> {
        Self::default()
    }

    /// Replaces any event already pending for the visitor.
    pub fn schedule(&mut self, visitor: V, unlock_at: OffsetDateTime) {
        self.cancel(visitor);
        self.deadlines.insert(visitor, unlock_at);
        self.queue.insert((unlock_at, visitor));
    }

    pub fn cancel(&mut self, visitor: V) -> bool {
        match self.deadlines.remove(&visitor) {
            Some(deadline) => {
                self.queue.remove(&(deadline, visitor));
                true
            }
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<OffsetDateTime> {
        self.queue.first().map(|(deadline, _)| *deadline)
    }

    /// Earliest first.
    pub fn take_due(&mut self, now: OffsetDateTime) -> Vec<V> {
        let mut due = Vec::new();

        while let Some(&(deadline, visitor)) = self.queue.first() {
            if deadline > now {
                break;
            }

            self.queue.pop_first();
            self.deadlines.remove(&visitor);
            due.push(visitor);
        }

        due
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, Duration, OffsetDateTime};

    use super::CooldownSchedule;

    const NOW: OffsetDateTime = datetime!(2020-04-20 16:20:00 UTC);

    #[test]
    fn empty() {
        let mut schedule = CooldownSchedule::<u64>::new();

        assert!(schedule.is_empty());
        assert_eq!(schedule.next_deadline(), None);
        assert!(schedule.take_due(NOW).is_empty());
    }

    #[test]
    fn takes_due_visitors_in_order() {
        let mut schedule = CooldownSchedule::new();
        schedule.schedule(3u64, NOW + Duration::minutes(3));
        schedule.schedule(1u64, NOW + Duration::minutes(1));
        schedule.schedule(2u64, NOW + Duration::minutes(2));

        assert_eq!(schedule.next_deadline(), Some(NOW + Duration::minutes(1)));
        assert_eq!(schedule.take_due(NOW + Duration::minutes(2)), vec![1, 2]);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.next_deadline(), Some(NOW + Duration::minutes(3)));
    }

    #[test]
    fn deadline_is_inclusive() {
        let mut schedule = CooldownSchedule::new();
        schedule.schedule(1u64, NOW);

        assert!(schedule.take_due(NOW - Duration::milliseconds(1)).is_empty());
        assert_eq!(schedule.take_due(NOW), vec![1]);
    }

    #[test]
    fn rescheduling_replaces_pending_event() {
        let mut schedule = CooldownSchedule::new();
        schedule.schedule(1u64, NOW + Duration::minutes(1));
        schedule.schedule(1u64, NOW + Duration::minutes(5));

        assert_eq!(schedule.len(), 1);
        assert!(schedule.take_due(NOW + Duration::minutes(4)).is_empty());
        assert_eq!(schedule.take_due(NOW + Duration::minutes(5)), vec![1]);
    }

    #[test]
    fn cancel() {
        let mut schedule = CooldownSchedule::new();
        schedule.schedule(1u64, NOW);
        schedule.schedule(2u64, NOW);

        assert!(schedule.cancel(1));
        assert!(!schedule.cancel(1));
        assert_eq!(schedule.take_due(NOW), vec![2]);
    }
}
